//! Store operations
//!
//! - `store` / `plant`: the store itself and seed planting
//! - `query`: pure reads
//! - `workspace`: journaled, all-or-nothing mutation scope
//! - `mutation`: field-set steps and the cascading reparent
//! - `activation`: current/parent/ancestor marking

pub mod activation;
pub mod mutation;
pub mod plant;
pub mod query;
pub mod store;
pub mod workspace;

pub use store::Store;
pub use workspace::Workspace;
