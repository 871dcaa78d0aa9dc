//! Core policy engine for focusgate
//!
//! This crate is the heart of focusgated, containing:
//! - Schedule evaluation (is blocking active right now)
//! - Domain rule compilation into the reserved id bands
//! - Reconciliation of desired rules against the installed snapshot
//! - The single-flight trigger coordinator that drives passes

mod clock;
mod compiler;
mod coordinator;
mod events;
mod notifier;
mod reconcile;
mod schedule;

pub use clock::*;
pub use compiler::*;
pub use coordinator::*;
pub use events::*;
pub use notifier::*;
pub use reconcile::*;
pub use schedule::*;
