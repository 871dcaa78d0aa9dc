//! File-backed rule engine for focusgate
//!
//! Provides:
//! - A JSON ruleset document holding the baseline ruleset, its enabled
//!   state and the dynamically installed redirect rules
//! - Atomic replacement of that document on every accepted operation
//!
//! Whatever consumes the document (a proxy, a browser policy loader) is
//! outside this crate.

mod document;
mod engine;

pub use document::*;
pub use engine::*;
