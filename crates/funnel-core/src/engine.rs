//! # Quiz Engine
//!
//! The answer handler and the stage transition engine.
//!
//! The engine owns the current [`QuizStage`] and mutates the page only as a
//! side effect of moving between stages. It never waits: every operation
//! returns an [`Outcome`] naming the next [`Action`] and how long to wait
//! before running it. A driver (the virtual-clock [`crate::Timeline`], or an
//! async loop over real timers) does the waiting and calls [`QuizEngine::perform`].
//!
//! ## Sequence
//!
//! ```text
//! answer(step1) --anim--> EnterStep2 --anim--> RevealStep2            [Step2]
//! answer(step2) --anim--> ShowPreloader --anim--> ActivatePreloader   [Preloader]
//!                                         --preloader--> Redirect     [Redirected]
//! ```
//!
//! Without a `#preloader`, `ShowPreloader` redirects on the spot.
//!
//! ## Failures
//!
//! Operations return `Err` only when the transition is abandoned. Problems
//! that do not stop the transition (a missing progress bar, a failing
//! tracking sink) are collected in [`Outcome::degraded`].

use crate::page::{CLASS_ACTIVE, CLASS_FADE_OUT, CLASS_HIDDEN, Page};
use crate::params::resolve_redirect;
use crate::tracking::{
    ACTION_ANSWER, ACTION_COMPLETE, ACTION_PROGRESS, ACTION_REDIRECT, ACTION_START,
    LABEL_PAGE_LOADED, LABEL_SHOWING_RESULTS, LABEL_STEP2_REACHED, LABEL_TO_RESULTS_PAGE, Tracker,
};
use crate::{ElementRef, FunnelConfig, FunnelError, QuizStage, QuizStep};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Background applied to a chosen option.
pub const SELECTED_BACKGROUND: &str = "linear-gradient(135deg, #dbeafe, #bfdbfe)";

/// Border colour applied to a chosen option.
pub const SELECTED_BORDER_COLOR: &str = "#2563eb";

// =============================================================================
// ACTIONS & OUTCOMES
// =============================================================================

/// A deferred step of the transition sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Start step1's exit animation.
    EnterStep2,
    /// Swap step1 for step2 and update the progress UI.
    RevealStep2,
    /// Start step2's exit animation, or redirect if there is no preloader.
    ShowPreloader,
    /// Swap step2 for the preloader.
    ActivatePreloader,
    /// Navigate to the destination.
    Redirect,
}

/// An action and the delay before it should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub action: Action,
    pub delay_ms: u64,
}

impl Scheduled {
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Result of an engine operation that went ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Stage after the operation.
    pub stage: QuizStage,
    /// What to run next, if anything.
    pub next: Option<Scheduled>,
    /// Non-fatal failures met along the way.
    pub degraded: Vec<FunnelError>,
    /// URL navigated to, when this operation redirected.
    pub navigated_to: Option<String>,
}

impl Outcome {
    fn at(stage: QuizStage) -> Self {
        Self {
            stage,
            next: None,
            degraded: Vec::new(),
            navigated_to: None,
        }
    }

    /// Whether anything went wrong without stopping the transition.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Quiz state machine.
#[derive(Debug)]
pub struct QuizEngine {
    config: FunnelConfig,
    tracker: Tracker,
    stage: QuizStage,
    pending: Option<Action>,
}

impl QuizEngine {
    /// Create an engine at `Step1`.
    #[must_use]
    pub fn new(config: FunnelConfig, tracker: Tracker) -> Self {
        Self {
            config,
            tracker,
            stage: QuizStage::Step1,
            pending: None,
        }
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> QuizStage {
        self.stage
    }

    /// Action scheduled and not yet run.
    #[must_use]
    pub fn pending(&self) -> Option<Action> {
        self.pending
    }

    /// Configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &FunnelConfig {
        &self.config
    }

    /// Report that the quiz has loaded.
    pub fn start(&mut self) -> Outcome {
        let mut outcome = Outcome::at(self.stage);
        self.track(ACTION_START, LABEL_PAGE_LOADED, &mut outcome);
        outcome
    }

    /// Handle an answer on `step`.
    ///
    /// `control` is the option button that was clicked, if known. Styling it
    /// is best effort. The next action is always scheduled when the step
    /// matches the current stage and nothing is pending.
    pub fn handle_answer(
        &mut self,
        page: &mut dyn Page,
        step: QuizStep,
        answer: &str,
        control: Option<&ElementRef>,
    ) -> Result<Outcome, FunnelError> {
        if self.stage.is_terminal() {
            return Err(FunnelError::Finished);
        }
        if let Some(pending) = self.pending {
            return Err(FunnelError::TransitionPending(pending));
        }
        if step.stage() != self.stage {
            return Err(FunnelError::StageMismatch {
                step,
                stage: self.stage,
            });
        }

        let mut outcome = Outcome::at(self.stage);

        if let Some(control) = control {
            let styled = page
                .set_style(control, "background", SELECTED_BACKGROUND)
                .and_then(|()| page.set_style(control, "border-color", SELECTED_BORDER_COLOR));
            if let Err(e) = styled {
                outcome.degraded.push(e);
            }
        }

        self.track(ACTION_ANSWER, &step.answer_label(answer), &mut outcome);

        let action = match step {
            QuizStep::Step1 => Action::EnterStep2,
            QuizStep::Step2 => Action::ShowPreloader,
        };
        self.schedule(&mut outcome, action, self.config.animation_delay_ms);
        Ok(outcome)
    }

    /// Run the scheduled action.
    ///
    /// `action` must be the one named by the last outcome; anything else is
    /// rejected with `UnexpectedAction` and leaves the engine untouched.
    pub fn perform(&mut self, page: &mut dyn Page, action: Action) -> Result<Outcome, FunnelError> {
        if self.pending != Some(action) {
            return Err(FunnelError::UnexpectedAction {
                action,
                pending: self.pending,
            });
        }
        self.pending = None;

        match action {
            Action::EnterStep2 => self.enter_step2(page),
            Action::RevealStep2 => Ok(self.reveal_step2(page)),
            Action::ShowPreloader => Ok(self.show_preloader(page)),
            Action::ActivatePreloader => Ok(self.activate_preloader(page)),
            Action::Redirect => Ok(self.redirect(page)),
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    fn enter_step2(&mut self, page: &mut dyn Page) -> Result<Outcome, FunnelError> {
        for required in [ElementRef::Step1, ElementRef::Step2] {
            if !page.exists(&required) {
                return Err(FunnelError::MissingElement(required));
            }
        }

        page.add_class(&ElementRef::Step1, CLASS_FADE_OUT)?;

        let mut outcome = Outcome::at(self.stage);
        self.schedule(&mut outcome, Action::RevealStep2, self.config.animation_delay_ms);
        Ok(outcome)
    }

    fn reveal_step2(&mut self, page: &mut dyn Page) -> Outcome {
        let mut outcome = Outcome::at(self.stage);

        let swap = page
            .add_class(&ElementRef::Step1, CLASS_HIDDEN)
            .and_then(|()| page.remove_class(&ElementRef::Step2, CLASS_HIDDEN));
        if let Err(e) = swap {
            outcome.degraded.push(e);
        }

        self.advance(QuizStage::Step2, &mut outcome);

        if let Some(percent) = self.stage.progress_percent() {
            optional(
                page.set_style(&ElementRef::ProgressBar, "width", &format!("{}%", percent)),
                &mut outcome,
            );
        }
        if let Some(number) = self.stage.step_number() {
            optional(
                page.set_text(&ElementRef::CurrentStep, &number.to_string()),
                &mut outcome,
            );
        }

        self.track(ACTION_PROGRESS, LABEL_STEP2_REACHED, &mut outcome);
        outcome
    }

    fn show_preloader(&mut self, page: &mut dyn Page) -> Outcome {
        if !page.exists(&ElementRef::Preloader) {
            let mut outcome = self.redirect(page);
            outcome
                .degraded
                .insert(0, FunnelError::MissingElement(ElementRef::Preloader));
            return outcome;
        }

        let mut outcome = Outcome::at(self.stage);
        for element in [ElementRef::Step2, ElementRef::ProgressContainer] {
            match page.add_class(&element, CLASS_FADE_OUT) {
                Ok(()) | Err(FunnelError::MissingElement(_)) => {}
                Err(e) => {
                    outcome.degraded.push(e);
                    self.schedule(
                        &mut outcome,
                        Action::Redirect,
                        self.config.fallback_redirect_delay_ms,
                    );
                    return outcome;
                }
            }
        }

        self.schedule(
            &mut outcome,
            Action::ActivatePreloader,
            self.config.animation_delay_ms,
        );
        outcome
    }

    fn activate_preloader(&mut self, page: &mut dyn Page) -> Outcome {
        let mut outcome = Outcome::at(self.stage);

        for element in [ElementRef::Step2, ElementRef::ProgressContainer] {
            optional(page.add_class(&element, CLASS_HIDDEN), &mut outcome);
        }
        if let Err(e) = page.add_class(&ElementRef::Preloader, CLASS_ACTIVE) {
            outcome.degraded.push(e);
        }

        self.advance(QuizStage::Preloader, &mut outcome);
        self.track(ACTION_COMPLETE, LABEL_SHOWING_RESULTS, &mut outcome);
        self.schedule(
            &mut outcome,
            Action::Redirect,
            self.config.preloader_delay_ms,
        );
        outcome
    }

    fn redirect(&mut self, page: &mut dyn Page) -> Outcome {
        let mut outcome = Outcome::at(self.stage);

        let (url, error) = resolve_redirect(
            &self.config.destination_url,
            page.location(),
            &self.config.allowed_params,
        );
        if let Some(e) = error {
            outcome.degraded.push(e);
        }

        self.track(ACTION_REDIRECT, LABEL_TO_RESULTS_PAGE, &mut outcome);
        page.navigate(&url);

        self.advance(QuizStage::Redirected, &mut outcome);
        outcome.navigated_to = Some(url);
        outcome
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn advance(&mut self, to: QuizStage, outcome: &mut Outcome) {
        debug_assert!(self.stage.can_advance_to(to), "{:?} -> {:?}", self.stage, to);
        self.stage = to;
        outcome.stage = to;
    }

    fn schedule(&mut self, outcome: &mut Outcome, action: Action, delay_ms: u64) {
        self.pending = Some(action);
        outcome.next = Some(Scheduled { action, delay_ms });
    }

    fn track(&self, action: &str, label: &str, outcome: &mut Outcome) {
        if let Err(e) = self.tracker.track(action, label) {
            outcome.degraded.push(e);
        }
    }
}

/// Record a failed optional page update. Missing optional elements are expected.
fn optional(result: Result<(), FunnelError>, outcome: &mut Outcome) {
    match result {
        Ok(()) | Err(FunnelError::MissingElement(_)) => {}
        Err(e) => outcome.degraded.push(e),
    }
}

// =============================================================================
// TESTS
// =============================================================================
