//! TreeNode Capability
//!
//! Path maintenance does not care what a record stores beyond its position
//! in the tree. Any entity exposing identity, parent reference, materialized
//! path and level can be moved by [`PathUpdater`](crate::services::PathUpdater).

use crate::models::MaterializedPath;
use std::fmt;
use std::hash::Hash;

/// A record that occupies a position in a materialized-path tree
///
/// # Invariants
///
/// - `path()` is the separator-terminated chain of ids from the root down to
///   and including `id()`
/// - `level()` is the parent's level plus one (roots use the configured base)
/// - `parent_id()` is authoritative; path and level are derived caches of it
///
/// Implementations must be cheap to clone: stores hand out owned snapshots.
pub trait TreeNode: Clone + Send + Sync + 'static {
    /// Identifier type, rendered into paths through `Display`
    type Id: Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    /// Direct parent, `None` for a root
    fn parent_id(&self) -> Option<&Self::Id>;

    fn path(&self) -> &str;

    fn set_path(&mut self, path: String);

    fn level(&self) -> i32;

    fn set_level(&mut self, level: i32);

    /// Path parsed into its id segments
    fn materialized_path(&self) -> MaterializedPath {
        MaterializedPath::new(self.path())
    }

    /// Whether the node has no parent
    fn is_root(&self) -> bool {
        self.parent_id().is_none()
    }
}
