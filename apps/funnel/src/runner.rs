//! # Async Driver
//!
//! Runs the engine against a page on real time. Each answer is followed by
//! its whole transition chain, one awaited delay per step:
//!
//! ```text
//! answer -> sleep(anim) -> EnterStep2 -> sleep(anim) -> RevealStep2
//! answer -> sleep(anim) -> ShowPreloader -> sleep(anim) -> ActivatePreloader
//!        -> sleep(preloader) -> Redirect
//! ```
//!
//! Degraded results are logged and the chain continues; an abandoned
//! transition is logged and leaves the visitor at the current stage.

use funnel_core::{ElementRef, FunnelError, Outcome, Page, QuizEngine, QuizStage, QuizStep};
use serde::Serialize;
use tokio::time::{Instant, sleep};

/// Summary of a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitReport {
    pub stage: QuizStage,
    pub navigated_to: Option<String>,
    pub elapsed_ms: u64,
    pub issues: Vec<String>,
}

/// Engine + page driven by tokio timers.
#[derive(Debug)]
pub struct Runner<P: Page> {
    engine: QuizEngine,
    page: P,
    started: Instant,
    navigated_to: Option<String>,
    issues: Vec<String>,
}

impl<P: Page> Runner<P> {
    pub fn new(engine: QuizEngine, page: P) -> Self {
        Self {
            engine,
            page,
            started: Instant::now(),
            navigated_to: None,
            issues: Vec::new(),
        }
    }

    #[must_use]
    pub fn stage(&self) -> QuizStage {
        self.engine.stage()
    }

    #[must_use]
    pub fn page(&self) -> &P {
        &self.page
    }

    /// Report page load.
    pub fn start(&mut self) {
        let outcome = self.engine.start();
        self.note_degraded(&outcome);
        tracing::info!(stage = %self.engine.stage(), "Quiz started");
    }

    /// Deliver an answer and run every transition it sets off.
    ///
    /// Returns the stage reached. A rejected answer or an abandoned
    /// transition is returned as the error after being logged.
    pub async fn answer(
        &mut self,
        step: QuizStep,
        answer: &str,
        control: Option<&ElementRef>,
    ) -> Result<QuizStage, FunnelError> {
        let outcome = match self
            .engine
            .handle_answer(&mut self.page, step, answer, control)
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Answer {}={} ignored: {}", step, answer, e);
                self.issues.push(e.to_string());
                return Err(e);
            }
        };
        tracing::info!("Answer {}={} accepted", step, answer);
        self.drive(outcome).await
    }

    async fn drive(&mut self, mut outcome: Outcome) -> Result<QuizStage, FunnelError> {
        loop {
            self.note_degraded(&outcome);
            if let Some(url) = outcome.navigated_to.take() {
                tracing::info!("Redirected to {}", url);
                self.navigated_to = Some(url);
            }

            let Some(next) = outcome.next else {
                return Ok(outcome.stage);
            };

            tracing::debug!("Waiting {}ms before {:?}", next.delay_ms, next.action);
            sleep(next.delay()).await;

            outcome = match self.engine.perform(&mut self.page, next.action) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        "Transition {:?} abandoned at {}: {}",
                        next.action,
                        self.engine.stage(),
                        e
                    );
                    self.issues.push(e.to_string());
                    return Err(e);
                }
            };
            tracing::debug!(stage = %outcome.stage, "Ran {:?}", next.action);
        }
    }

    fn note_degraded(&mut self, outcome: &Outcome) {
        for issue in &outcome.degraded {
            match issue {
                FunnelError::Tracking(_) => tracing::debug!("Tracking dropped: {}", issue),
                _ => tracing::warn!("Continuing without: {}", issue),
            }
            self.issues.push(issue.to_string());
        }
    }

    /// Summary so far.
    #[must_use]
    pub fn report(&self) -> VisitReport {
        VisitReport {
            stage: self.engine.stage(),
            navigated_to: self.navigated_to.clone(),
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            issues: self.issues.clone(),
        }
    }
}
