//! # Quiz Stages
//!
//! The funnel moves through four stages, forward only:
//!
//! | Stage | Visible panel | Progress | Counter |
//! |-------|---------------|----------|---------|
//! | Step1 | `#step1` | 50% | 1 |
//! | Step2 | `#step2` | 100% | 2 |
//! | Preloader | `#preloader` | - | - |
//! | Redirected | (navigated away) | - | - |
//!
//! No backward transitions, no re-entry. Before redirect exactly one of
//! Step1, Step2, Preloader is the current panel.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// STAGE ENUM
// =============================================================================

/// Stage of a quiz session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum QuizStage {
    /// First question on screen.
    #[default]
    Step1,
    /// Second question on screen.
    Step2,
    /// Loading indicator on screen, redirect scheduled.
    Preloader,
    /// Browser sent to the destination. Terminal.
    Redirected,
}

impl QuizStage {
    /// Get the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            QuizStage::Step1 => "First Question",
            QuizStage::Step2 => "Second Question",
            QuizStage::Preloader => "Preparing Results",
            QuizStage::Redirected => "Redirected",
        }
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<QuizStage> {
        match self {
            QuizStage::Step1 => Some(QuizStage::Step2),
            QuizStage::Step2 => Some(QuizStage::Preloader),
            QuizStage::Preloader => Some(QuizStage::Redirected),
            QuizStage::Redirected => None,
        }
    }

    /// Whether `target` is a legal forward move from this stage.
    ///
    /// Step2 may jump straight to Redirected when the page has no preloader.
    #[must_use]
    pub fn can_advance_to(&self, target: QuizStage) -> bool {
        match (self, target) {
            (QuizStage::Step2, QuizStage::Redirected) => true,
            _ => self.next() == Some(target),
        }
    }

    /// Check if this stage is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuizStage::Redirected)
    }

    /// Question number shown in the step counter, for question stages.
    #[must_use]
    pub fn step_number(&self) -> Option<u8> {
        match self {
            QuizStage::Step1 => Some(1),
            QuizStage::Step2 => Some(2),
            QuizStage::Preloader | QuizStage::Redirected => None,
        }
    }

    /// Progress bar fill for question stages, in percent.
    #[must_use]
    pub fn progress_percent(&self) -> Option<u8> {
        match self {
            QuizStage::Step1 => Some(50),
            QuizStage::Step2 => Some(100),
            QuizStage::Preloader | QuizStage::Redirected => None,
        }
    }
}

impl fmt::Display for QuizStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self, self.name())
    }
}

// =============================================================================
// TESTS
// =============================================================================
