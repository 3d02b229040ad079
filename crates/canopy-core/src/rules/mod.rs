//! Structural invariant rules
//!
//! `invariants` finds violations; `validation` turns the first one into an
//! error.

pub mod invariants;
pub mod validation;

pub use invariants::{has_cycle, Violation};
pub use validation::{validate_leaves, validate_store};
