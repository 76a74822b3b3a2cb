//! # Core Type Definitions
//!
//! This module contains the vocabulary shared by every part of the funnel:
//! - Answer-handler tokens (`QuizStep`)
//! - Page element addresses (`ElementRef`)
//! - Error types (`FunnelError`)
//!
//! The stage enumeration lives in [`crate::system`]; scheduled actions live in
//! [`crate::engine`].

use crate::engine::Action;
use crate::system::QuizStage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// QUIZ STEP
// =============================================================================

/// The step token passed to the answer handler.
///
/// Host pages wire option buttons to `handleAnswer('step1', ...)` or
/// `handleAnswer('step2', ...)`; anything else is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStep {
    Step1,
    Step2,
}

impl QuizStep {
    /// The wire token for this step.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            QuizStep::Step1 => "step1",
            QuizStep::Step2 => "step2",
        }
    }

    /// The stage during which this step accepts answers.
    #[must_use]
    pub const fn stage(&self) -> QuizStage {
        match self {
            QuizStep::Step1 => QuizStage::Step1,
            QuizStep::Step2 => QuizStage::Step2,
        }
    }

    /// Analytics label for an answer given on this step: `{step}_{answer}`.
    #[must_use]
    pub fn answer_label(&self, answer: &str) -> String {
        format!("{}_{}", self.as_str(), answer)
    }
}

impl fmt::Display for QuizStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizStep {
    type Err = FunnelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "step1" => Ok(QuizStep::Step1),
            "step2" => Ok(QuizStep::Step2),
            other => Err(FunnelError::UnknownStep(other.to_string())),
        }
    }
}

// =============================================================================
// ELEMENT REFERENCES
// =============================================================================

/// Address of an element the funnel reads or mutates.
///
/// `#step1` and `#step2` are required for the first transition; every other
/// element is optional and has a documented fallback when absent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementRef {
    /// `#step1` container.
    Step1,
    /// `#step2` container.
    Step2,
    /// `#progressBar` fill.
    ProgressBar,
    /// `#currentStep` counter.
    CurrentStep,
    /// `#preloader` overlay.
    Preloader,
    /// `.progress-container` wrapper around the progress UI.
    ProgressContainer,
    /// An `.option-button` control, addressed by its id.
    OptionButton(String),
}

impl ElementRef {
    /// CSS selector for this element.
    #[must_use]
    pub fn selector(&self) -> String {
        match self {
            ElementRef::Step1 => "#step1".to_string(),
            ElementRef::Step2 => "#step2".to_string(),
            ElementRef::ProgressBar => "#progressBar".to_string(),
            ElementRef::CurrentStep => "#currentStep".to_string(),
            ElementRef::Preloader => "#preloader".to_string(),
            ElementRef::ProgressContainer => ".progress-container".to_string(),
            ElementRef::OptionButton(id) => format!(".option-button#{}", id),
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector())
    }
}

impl FromStr for ElementRef {
    type Err = FunnelError;

    /// Parse an element id or selector (`step2`, `#step2`, `.progress-container`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim_start_matches(['#', '.']);
        match name {
            "step1" => Ok(ElementRef::Step1),
            "step2" => Ok(ElementRef::Step2),
            "progressBar" => Ok(ElementRef::ProgressBar),
            "currentStep" => Ok(ElementRef::CurrentStep),
            "preloader" => Ok(ElementRef::Preloader),
            "progress-container" => Ok(ElementRef::ProgressContainer),
            _ => Err(FunnelError::UnknownElement(s.to_string())),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the funnel.
///
/// None of these ever reach the visitor. Each operation returns them to its
/// caller, which decides whether to skip, stall, or fall back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunnelError {
    /// An element the operation needs is not on the page.
    #[error("Element not found: {0}")]
    MissingElement(ElementRef),

    /// The element name does not address any funnel element.
    #[error("Unknown element: {0}")]
    UnknownElement(String),

    /// The answer handler received a step token other than `step1`/`step2`.
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// An answer arrived for a step that is not the current one.
    #[error("Answer for {step} ignored while at stage {stage}")]
    StageMismatch { step: QuizStep, stage: QuizStage },

    /// A transition has been scheduled and not yet run.
    #[error("Transition already pending: {0:?}")]
    TransitionPending(Action),

    /// An action was run that is not the one scheduled.
    #[error("Unexpected action {action:?} (pending: {pending:?})")]
    UnexpectedAction {
        action: Action,
        pending: Option<Action>,
    },

    /// The funnel has already navigated away.
    #[error("Funnel already redirected")]
    Finished,

    /// A URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The analytics sink rejected or failed the event.
    #[error("Tracking failed: {0}")]
    Tracking(String),

    /// The page failed an operation for a reason other than a missing element.
    #[error("Page error: {0}")]
    Page(String),

    /// The simulated clock was asked to move backwards.
    #[error("Clock error: {0}")]
    Clock(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_step_round_trips_tokens() {
        assert_eq!("step1".parse::<QuizStep>(), Ok(QuizStep::Step1));
        assert_eq!("step2".parse::<QuizStep>(), Ok(QuizStep::Step2));
        assert_eq!(QuizStep::Step2.to_string(), "step2");
    }

    #[test]
    fn quiz_step_rejects_unknown_token() {
        assert_eq!(
            "step3".parse::<QuizStep>(),
            Err(FunnelError::UnknownStep("step3".to_string()))
        );
    }

    #[test]
    fn answer_label_joins_step_and_answer() {
        assert_eq!(QuizStep::Step1.answer_label("nubank"), "step1_nubank");
    }

    #[test]
    fn element_selectors() {
        assert_eq!(ElementRef::ProgressBar.selector(), "#progressBar");
        assert_eq!(ElementRef::ProgressContainer.selector(), ".progress-container");
        assert_eq!(
            ElementRef::OptionButton("opt-a".into()).selector(),
            ".option-button#opt-a"
        );
    }

    #[test]
    fn element_parse_accepts_selectors_and_ids() {
        assert_eq!("#preloader".parse::<ElementRef>(), Ok(ElementRef::Preloader));
        assert_eq!("preloader".parse::<ElementRef>(), Ok(ElementRef::Preloader));
        assert_eq!(
            ".progress-container".parse::<ElementRef>(),
            Ok(ElementRef::ProgressContainer)
        );
        assert!(matches!(
            "sidebar".parse::<ElementRef>(),
            Err(FunnelError::UnknownElement(_))
        ));
    }
}
