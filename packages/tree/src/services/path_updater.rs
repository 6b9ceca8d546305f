//! PathUpdater - Subtree Path Maintenance
//!
//! Brings the materialized path and level of a node, and of every one of its
//! descendants, back in line after the caller changed the node's `parent_id`.
//!
//! # Read Budget
//!
//! | Situation              | Store reads                                           |
//! |------------------------|-------------------------------------------------------|
//! | Node never committed   | `find_committed`                                      |
//! | Parent unchanged       | `find_committed`                                      |
//! | Moved under a parent   | `find_committed`, `find_tracked` x2, `find_all_descendants` |
//! | Moved to the top level | `find_committed`, `find_tracked`, `find_all_descendants` |
//!
//! The descendant read is a single bulk call regardless of subtree depth.
//!
//! # Atomicity
//!
//! The node is only written once every read has succeeded, so a failing store
//! leaves it untouched. Persisting the node and the returned descendants in
//! one transaction is the caller's responsibility, as is serializing
//! concurrent moves within the same subtree.

use crate::config::TreeConfig;
use crate::db::NodeStore;
use crate::models::{MaterializedPath, TreeNode};
use crate::services::error::PathUpdateError;
use crate::services::subtree::{rebuild_subtree, verify_subtree};
use std::sync::Arc;

/// Result of a successful `update_path` call
#[derive(Debug, Clone, PartialEq)]
pub enum PathUpdateOutcome<N> {
    /// The node has no committed state yet, so nothing can hang beneath it
    Unpersisted,
    /// The committed parent equals the requested one
    Unchanged,
    /// The node moved; rewritten descendants must be persisted by the caller
    Moved(SubtreeMove<N>),
}

impl<N> PathUpdateOutcome<N> {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }

    /// Rewritten descendants, empty unless the node moved
    pub fn descendants(&self) -> &[N] {
        match self {
            Self::Moved(moved) => moved.descendants.as_slice(),
            _ => &[],
        }
    }

    pub fn into_descendants(self) -> Vec<N> {
        match self {
            Self::Moved(moved) => moved.descendants,
            _ => Vec::new(),
        }
    }
}

/// Details of a node move
#[derive(Debug, Clone, PartialEq)]
pub struct SubtreeMove<N> {
    /// Path of the node before the move (the prefix its descendants had)
    pub old_path: String,
    /// Path of the node after the move
    pub new_path: String,
    /// Change of the node's level relative to its in-session state
    pub level_delta: i32,
    /// Every transitive descendant, rewritten beneath the new path
    pub descendants: Vec<N>,
}

/// Recomputes paths and levels when a node changes parent
///
/// Holds no mutable state; one instance can serve concurrent callers.
pub struct PathUpdater<N: TreeNode> {
    store: Arc<dyn NodeStore<N>>,
    config: TreeConfig,
}

impl<N: TreeNode> Clone for PathUpdater<N> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<N: TreeNode> PathUpdater<N> {
    /// Create an updater with the default level conventions
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: NodeStore<N> + 'static,
    {
        Self::with_config(store, TreeConfig::default())
    }

    pub fn with_config<S>(store: Arc<S>, config: TreeConfig) -> Self
    where
        S: NodeStore<N> + 'static,
    {
        Self { store, config }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Re-derive the path and level of `node` and its descendants after a parent change
    ///
    /// `node` must carry its new `parent_id`; its path and level are
    /// overwritten on a move. Descendants are returned in the outcome in their
    /// rewritten state.
    ///
    /// # Errors
    ///
    /// - `ParentNotFound` if the new parent does not exist
    /// - `CircularReference` if the new parent is the node itself or lies beneath it
    /// - `Store` if any read fails
    ///
    /// In every error case `node` is left as it was.
    pub async fn update_path(
        &self,
        node: &mut N,
    ) -> Result<PathUpdateOutcome<N>, PathUpdateError> {
        let Some(persisted) = self.store.find_committed(node.id()).await? else {
            tracing::debug!("Node {} is not committed yet, no path to update", node.id());
            return Ok(PathUpdateOutcome::Unpersisted);
        };

        if persisted.parent_id() == node.parent_id() {
            return Ok(PathUpdateOutcome::Unchanged);
        }

        let (parent_path, parent_level) = self.resolve_parent(node).await?;
        let new_path = MaterializedPath::child_of(&parent_path, node.id()).into_string();
        let new_level = parent_level + 1;

        // Descendants are located from the in-session path, which is what
        // their own paths were derived from
        let tracked = match self.store.find_tracked(node.id()).await? {
            Some(tracked) => tracked,
            None => persisted.clone(),
        };
        let old_path = tracked.path().to_string();
        let mut descendants = self.store.find_all_descendants(&tracked).await?;

        // Relative to the tracked level, which staged descendants were derived from
        let level_delta = new_level - tracked.level();
        node.set_path(new_path.clone());
        node.set_level(new_level);

        let summary = rebuild_subtree(node, &old_path, level_delta, &mut descendants);

        if self.config.verify_after_update {
            for issue in verify_subtree(node, &descendants) {
                tracing::warn!(
                    "Inconsistent descendant after moving {}: {:?}",
                    node.id(),
                    issue
                );
            }
        }

        tracing::info!(
            "Moved node {} from '{}' to '{}' ({} descendants rebuilt, {} rebased, {} skipped)",
            node.id(),
            old_path,
            new_path,
            summary.rebuilt,
            summary.rebased,
            summary.skipped
        );

        Ok(PathUpdateOutcome::Moved(SubtreeMove {
            old_path,
            new_path,
            level_delta,
            descendants,
        }))
    }

    /// Path and level of the node's new parent
    ///
    /// A missing parent id is the virtual root above all top-level nodes and
    /// needs no store read.
    async fn resolve_parent(&self, node: &N) -> Result<(String, i32), PathUpdateError> {
        let Some(parent_id) = node.parent_id() else {
            return Ok((String::new(), self.config.virtual_root_level()));
        };

        if parent_id == node.id() {
            return Err(PathUpdateError::circular_reference(node.id(), parent_id));
        }

        let parent = self
            .store
            .find_tracked(parent_id)
            .await?
            .ok_or_else(|| PathUpdateError::parent_not_found(parent_id))?;

        if parent.materialized_path().contains_id(node.id()) {
            return Err(PathUpdateError::circular_reference(node.id(), parent_id));
        }

        Ok((parent.path().to_string(), parent.level()))
    }
}
