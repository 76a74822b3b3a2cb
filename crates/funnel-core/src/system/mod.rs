//! # System Module
//!
//! The explicit stage of a quiz session.
//!
//! The stage is owned by the engine and is the source of truth; what the page
//! shows follows from it, never the other way around.

mod stage;

pub use stage::*;
