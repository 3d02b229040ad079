//! Store snapshots
//!
//! Deterministic digests of a store's full state. Two stores with the same
//! leaves (including children order, data and markers) share a digest, which
//! makes "nothing changed" checks cheap in tests and callers alike.

pub mod digest;

pub use digest::compute_store_digest;
