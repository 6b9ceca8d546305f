//! Store Error Types
//!
//! Errors raised by the in-memory unit-of-work store. They surface through
//! the `NodeStore` trait as `anyhow::Error` and can be recovered with
//! `downcast_ref::<StoreError>()`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Read operations exposed by `NodeStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOperation {
    FindCommitted,
    FindTracked,
    FindAllDescendants,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FindCommitted => "find_committed",
            Self::FindTracked => "find_tracked",
            Self::FindAllDescendants => "find_all_descendants",
        };
        f.write_str(name)
    }
}

/// Store operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Node already committed under this id
    #[error("Node already exists: {id}")]
    DuplicateNode { id: String },

    /// Failure injected for an operation (testing hook)
    #[error("Store operation {operation} failed: injected failure")]
    InjectedFailure { operation: StoreOperation },
}

impl StoreError {
    /// Create a duplicate node error
    pub fn duplicate_node(id: impl fmt::Display) -> Self {
        Self::DuplicateNode { id: id.to_string() }
    }

    /// Create an injected failure error
    pub fn injected_failure(operation: StoreOperation) -> Self {
        Self::InjectedFailure { operation }
    }
}
