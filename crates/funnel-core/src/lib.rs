//! # funnel-core
//!
//! The two-step quiz funnel - THE LOGIC.
//!
//! A visitor answers two questions, watches a short preloader, and is sent to
//! a destination URL that carries their campaign attribution (UTM tags and ad
//! click IDs) and nothing else from the landing page's query string.
//!
//! ## Pieces
//!
//! - `engine` - answer handler and stage transition engine
//! - `system` - the explicit `QuizStage` enumeration
//! - `params` - attribution parameter filter and redirect URL builder
//! - `tracking` - fire-and-forget analytics events and sinks
//! - `page` - the page contract and an in-memory page
//! - `timeline` - virtual-clock driver for deterministic runs
//! - `config` - immutable configuration
//!
//! ## Architectural Constraints
//!
//! - No async, no I/O, no logging: problems come back as values
//! - The engine owns the stage; the page only reflects it
//! - Delays are returned, never slept on

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod engine;
pub mod page;
pub mod params;
pub mod system;
pub mod timeline;
pub mod tracking;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{ElementRef, FunnelError, QuizStep};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use config::FunnelConfig;
pub use engine::{Action, Outcome, QuizEngine, Scheduled};
pub use page::{Element, MemoryPage, Page};
pub use params::{filter_params, redirect_url, redirect_url_from_query, resolve_redirect};
pub use timeline::{Timeline, TimelineEntry, Timer};
pub use tracking::{RecordingSink, Tracker, TrackingEvent, TrackingSink};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::QuizStage;
