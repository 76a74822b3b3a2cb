//! # Tracking Sinks
//!
//! Where analytics events go when the funnel runs outside a browser.

use clap::ValueEnum;
use funnel_core::{FunnelError, Tracker, TrackingEvent, TrackingSink};
use std::io::Write;
use std::sync::Mutex;

/// Which sink `simulate` reports events to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AnalyticsMode {
    /// Emit each event as a tracing log line.
    #[default]
    Log,
    /// Print each event as a JSON object on stdout, or on stderr when
    /// stdout carries JSON command output.
    Json,
    /// No analytics collaborator; events are dropped.
    #[value(name = "none")]
    Off,
}

/// Output stream for JSON tracking events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStream {
    Stdout,
    Stderr,
}

impl AnalyticsMode {
    /// Stream JSON events go to. With `json_mode` stdout is reserved for the
    /// command's own JSON document.
    #[must_use]
    pub fn json_stream(json_mode: bool) -> EventStream {
        if json_mode {
            EventStream::Stderr
        } else {
            EventStream::Stdout
        }
    }

    /// Build the tracker for this mode.
    #[must_use]
    pub fn tracker(self, json_mode: bool) -> Tracker {
        match self {
            AnalyticsMode::Log => Tracker::new(Box::new(LogSink)),
            AnalyticsMode::Json => match Self::json_stream(json_mode) {
                EventStream::Stdout => {
                    Tracker::new(Box::new(JsonLinesSink::new(std::io::stdout())))
                }
                EventStream::Stderr => {
                    Tracker::new(Box::new(JsonLinesSink::new(std::io::stderr())))
                }
            },
            AnalyticsMode::Off => Tracker::disabled(),
        }
    }
}

/// Sink that logs events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TrackingSink for LogSink {
    fn send(&self, event: &TrackingEvent) -> Result<(), FunnelError> {
        tracing::info!(
            target: "funnel::tracking",
            action = %event.action,
            category = %event.event_category,
            label = %event.event_label,
            value = event.value,
            "tracking event"
        );
        Ok(())
    }
}

/// Sink that writes one JSON object per event.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: Mutex<W>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write> TrackingSink for JsonLinesSink<W> {
    fn send(&self, event: &TrackingEvent) -> Result<(), FunnelError> {
        let line =
            serde_json::to_string(event).map_err(|e| FunnelError::Tracking(e.to_string()))?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| FunnelError::Tracking("writer poisoned".to_string()))?;
        writeln!(out, "{}", line).map_err(|e| FunnelError::Tracking(e.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
