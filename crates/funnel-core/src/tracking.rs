//! # Tracking
//!
//! Fire-and-forget analytics. Every event has the same shape as a
//! `gtag('event', action, {event_category, event_label, value})` call.
//!
//! The sink is optional. When it is missing or fails, the engine records the
//! failure as degraded and carries on; nothing waits for or depends on it.

use crate::FunnelError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Category attached to every funnel event.
pub const EVENT_CATEGORY: &str = "Quiz_Cartoes";

// Actions and labels emitted by the engine.
pub const ACTION_START: &str = "quiz_start";
pub const ACTION_ANSWER: &str = "quiz_answer";
pub const ACTION_PROGRESS: &str = "quiz_progress";
pub const ACTION_COMPLETE: &str = "quiz_complete";
pub const ACTION_REDIRECT: &str = "redirect";

pub const LABEL_PAGE_LOADED: &str = "page_loaded";
pub const LABEL_STEP2_REACHED: &str = "step2_reached";
pub const LABEL_SHOWING_RESULTS: &str = "showing_results";
pub const LABEL_TO_RESULTS_PAGE: &str = "to_results_page";

// =============================================================================
// EVENT
// =============================================================================

/// One analytics event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub action: String,
    pub event_category: String,
    pub event_label: String,
    pub value: u32,
}

impl TrackingEvent {
    /// Event in the funnel category with value 1.
    #[must_use]
    pub fn new(action: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            event_category: EVENT_CATEGORY.to_string(),
            event_label: label.into(),
            value: 1,
        }
    }
}

// =============================================================================
// SINKS
// =============================================================================

/// Destination for analytics events.
pub trait TrackingSink {
    /// Deliver one event. Errors are reported, never retried.
    fn send(&self, event: &TrackingEvent) -> Result<(), FunnelError>;
}

/// Optional sink wrapper held by the engine.
#[derive(Default)]
pub struct Tracker {
    sink: Option<Box<dyn TrackingSink>>,
}

impl Tracker {
    /// Tracker that delivers to `sink`.
    #[must_use]
    pub fn new(sink: Box<dyn TrackingSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Tracker with no sink; every event is dropped.
    #[must_use]
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Whether a sink is attached.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Send an event if a sink is attached.
    ///
    /// An absent sink is `Ok`; only a failing sink produces an error.
    pub fn track(&self, action: &str, label: &str) -> Result<(), FunnelError> {
        match &self.sink {
            Some(sink) => sink.send(&TrackingEvent::new(action, label)),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Sink that keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<TrackingEvent>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    #[must_use]
    pub fn events(&self) -> Vec<TrackingEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Actions received so far, in order.
    #[must_use]
    pub fn actions(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.action).collect()
    }
}

impl TrackingSink for RecordingSink {
    fn send(&self, event: &TrackingEvent) -> Result<(), FunnelError> {
        self.events
            .lock()
            .map_err(|_| FunnelError::Tracking("recording buffer poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
