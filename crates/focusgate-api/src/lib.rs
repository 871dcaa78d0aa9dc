//! Shared types for focusgate
//!
//! This crate defines the data exchanged between the policy core and its
//! collaborators:
//! - The stored (raw) weekly schedule shape
//! - The custom domain list
//! - Redirect rule descriptors and enforcement snapshots
//! - Reconcile plans
//! - Trigger reasons

mod domains;
mod rules;
mod schedule;
mod triggers;

pub use domains::*;
pub use rules::*;
pub use schedule::*;
pub use triggers::*;
