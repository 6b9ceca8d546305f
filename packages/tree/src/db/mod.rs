//! Store Layer
//!
//! This module defines how path maintenance reads tree state:
//!
//! - `NodeStore` - the read contract (committed state, tracked state, bulk descendants)
//! - `InMemoryNodeStore` - a unit-of-work implementation used by tests and embedders
//! - `StoreError` - errors raised by the in-memory store
//!
//! Persisting rewritten nodes is the caller's job; see `InMemoryNodeStore::stage_all`
//! for the in-memory equivalent.

mod error;
mod memory_store;
mod node_store;

pub use error::{StoreError, StoreOperation};
pub use memory_store::{InMemoryNodeStore, StoreCallCounts};
pub use node_store::NodeStore;
