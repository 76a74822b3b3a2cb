//! # funnel
//!
//! Command-line front end for `funnel-core`: the CLI, the async driver that
//! waits out each delay on tokio timers, config file loading, and the
//! tracking sinks used outside a browser.

pub mod cli;
pub mod config;
pub mod runner;
pub mod tracking;
