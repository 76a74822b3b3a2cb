//! # Virtual-Clock Driver
//!
//! Runs a [`QuizEngine`] against a page on a simulated clock. Nothing sleeps:
//! time moves only when [`Timeline::advance_time`], [`Timeline::advance_time_to`]
//! or [`Timeline::flush`] is called, so timing contracts can be checked to the
//! millisecond.
//!
//! At most one timer is ever queued, because the engine schedules one action
//! at a time.

use crate::engine::{Action, Outcome, QuizEngine};
use crate::page::Page;
use crate::{ElementRef, FunnelError, QuizStage, QuizStep};

/// A queued action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub due_at: u64,
    pub action: Action,
}

/// Record of one timer firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub at_ms: u64,
    pub action: Action,
    /// Stage after the action, or why it was abandoned.
    pub result: Result<QuizStage, FunnelError>,
    pub degraded: Vec<FunnelError>,
}

/// Engine + page + simulated clock.
#[derive(Debug)]
pub struct Timeline<P: Page> {
    engine: QuizEngine,
    page: P,
    now_ms: u64,
    queued: Option<Timer>,
    entries: Vec<TimelineEntry>,
}

impl<P: Page> Timeline<P> {
    /// Clock at zero, nothing queued.
    #[must_use]
    pub fn new(engine: QuizEngine, page: P) -> Self {
        Self {
            engine,
            page,
            now_ms: 0,
            queued: None,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    #[must_use]
    pub fn stage(&self) -> QuizStage {
        self.engine.stage()
    }

    #[must_use]
    pub fn engine(&self) -> &QuizEngine {
        &self.engine
    }

    #[must_use]
    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    /// The queued timer, if any.
    #[must_use]
    pub fn pending_timer(&self) -> Option<Timer> {
        self.queued
    }

    /// Every timer that has fired, in order.
    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Report page load.
    pub fn start(&mut self) -> Outcome {
        self.engine.start()
    }

    /// Deliver an answer at the current time and queue whatever it schedules.
    pub fn answer(
        &mut self,
        step: QuizStep,
        answer: &str,
        control: Option<&ElementRef>,
    ) -> Result<Outcome, FunnelError> {
        let outcome = self
            .engine
            .handle_answer(&mut self.page, step, answer, control)?;
        self.enqueue(&outcome);
        Ok(outcome)
    }

    /// Move the clock forward by `delta_ms`, firing every timer due by then.
    ///
    /// Returns the number of timers fired.
    pub fn advance_time(&mut self, delta_ms: u64) -> usize {
        let target = self.now_ms.saturating_add(delta_ms);
        self.run_until(Some(target))
    }

    /// Move the clock to `target_ms`, firing every timer due by then.
    pub fn advance_time_to(&mut self, target_ms: u64) -> Result<usize, FunnelError> {
        if target_ms < self.now_ms {
            return Err(FunnelError::Clock(format!(
                "advance_time_to requires target >= now_ms (target={}, now_ms={})",
                target_ms, self.now_ms
            )));
        }
        Ok(self.run_until(Some(target_ms)))
    }

    /// Fire timers until none are left, moving the clock as needed.
    pub fn flush(&mut self) -> usize {
        self.run_until(None)
    }

    fn run_until(&mut self, limit: Option<u64>) -> usize {
        let mut ran = 0usize;
        while let Some(timer) = self.queued {
            if limit.is_some_and(|limit| timer.due_at > limit) {
                break;
            }
            self.queued = None;
            self.now_ms = self.now_ms.max(timer.due_at);
            self.fire(timer);
            ran = ran.saturating_add(1);
        }
        if let Some(limit) = limit {
            self.now_ms = self.now_ms.max(limit);
        }
        ran
    }

    fn fire(&mut self, timer: Timer) {
        let entry = match self.engine.perform(&mut self.page, timer.action) {
            Ok(outcome) => {
                self.enqueue(&outcome);
                TimelineEntry {
                    at_ms: self.now_ms,
                    action: timer.action,
                    result: Ok(outcome.stage),
                    degraded: outcome.degraded,
                }
            }
            Err(e) => TimelineEntry {
                at_ms: self.now_ms,
                action: timer.action,
                result: Err(e),
                degraded: Vec::new(),
            },
        };
        self.entries.push(entry);
    }

    fn enqueue(&mut self, outcome: &Outcome) {
        if let Some(next) = outcome.next {
            self.queued = Some(Timer {
                due_at: self.now_ms.saturating_add(next.delay_ms),
                action: next.action,
            });
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
