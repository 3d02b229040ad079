//! Core types shared across Canopy facilities
//!
//! This crate provides foundational types used by the store, the error
//! facility and the logging facility:
//!
//! - **Identifiers**: LeafId, the only cross-leaf reference mechanism
//! - **Schema constants**: Canonical field keys and event names

pub mod ids;
pub mod schema;

pub use ids::LeafId;
