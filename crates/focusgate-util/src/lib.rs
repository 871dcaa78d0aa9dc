//! Shared utilities for focusgate
//!
//! This crate provides:
//! - ID types (RuleId, RulesetId)
//! - Wall-clock helpers (mock-aware `now()`, `TimeOfDay`)
//! - Error types shared across crates
//! - Default paths for config, data, and the rules file
//! - The daemon's locked pid file

mod error;
mod ids;
mod paths;
mod pidfile;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use pidfile::*;
pub use time::*;
