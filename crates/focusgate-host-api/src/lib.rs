//! Rule engine trait interfaces for focusgate
//!
//! This crate defines the interface between the policy core and whatever
//! actually enforces redirect rules. It contains no enforcement code itself,
//! only the shared operation semantics and an in-memory engine for tests.

mod mock;
mod ops;
mod traits;

pub use mock::*;
pub use ops::*;
pub use traits::*;
