//! Path Update Error Types
//!
//! The "nothing to do" branches of a path update (node not yet committed,
//! parent unchanged) are successful outcomes, not errors. Everything here
//! is a condition the caller must act on.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while moving a node and its subtree
#[derive(Error, Debug)]
pub enum PathUpdateError {
    /// The new parent id does not resolve to a node
    ///
    /// Raised before any mutation, so the node keeps its old path and level.
    #[error("Parent node not found: {parent_id}")]
    ParentNotFound { parent_id: String },

    /// The move would make a node its own ancestor
    #[error("Circular reference: node {node_id} cannot be moved beneath {parent_id}")]
    CircularReference { node_id: String, parent_id: String },

    /// A store read failed; the backend error is passed through unchanged
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl PathUpdateError {
    /// Create a parent not found error
    pub fn parent_not_found(parent_id: impl fmt::Display) -> Self {
        Self::ParentNotFound {
            parent_id: parent_id.to_string(),
        }
    }

    /// Create a circular reference error
    pub fn circular_reference(node_id: impl fmt::Display, parent_id: impl fmt::Display) -> Self {
        Self::CircularReference {
            node_id: node_id.to_string(),
            parent_id: parent_id.to_string(),
        }
    }

    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
