//! NodeStore Trait - Read Abstraction for Path Maintenance
//!
//! This module defines the `NodeStore` trait through which `PathUpdater`
//! reads tree state. Persistence itself belongs to the surrounding
//! repository; the updater only needs three reads.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so both embedded and network
//!    backends can implement the trait
//! 2. **Two Read Modes**: `find_committed` returns the last durable state,
//!    `find_tracked` returns the in-session state of the active unit of work.
//!    A move compares against the former and rewrites from the latter.
//! 3. **One Bulk Descendant Read**: `find_all_descendants` returns every
//!    generation below a node in a single call, so a move never walks the
//!    tree through point queries
//! 4. **Error Handling**: Uses `anyhow::Result` for flexible backend context;
//!    the updater passes these errors through untouched
//!
//! # Examples
//!
//! ```rust,no_run
//! use nodespace_tree::db::NodeStore;
//! use nodespace_tree::models::Node;
//! use uuid::Uuid;
//!
//! async fn print_subtree(store: &dyn NodeStore<Node>, id: Uuid) -> anyhow::Result<()> {
//!     if let Some(node) = store.find_tracked(&id).await? {
//!         for descendant in store.find_all_descendants(&node).await? {
//!             println!("{} at level {}", descendant.path, descendant.level);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use crate::models::TreeNode;
use anyhow::Result;
use async_trait::async_trait;

/// Read access to tree-shaped records
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a store can be shared behind an
/// `Arc` by updaters running on different tasks.
#[async_trait]
pub trait NodeStore<N: TreeNode>: Send + Sync {
    /// Last committed state of a node
    ///
    /// # Returns
    ///
    /// - `Ok(Some(node))` if the node has been durably saved
    /// - `Ok(None)` if the node is new in the current unit of work (not an error)
    /// - `Err(_)` if the backend fails
    async fn find_committed(&self, id: &N::Id) -> Result<Option<N>>;

    /// Current state of a node within the active unit of work
    ///
    /// Equals the committed state when nothing is pending for this node.
    async fn find_tracked(&self, id: &N::Id) -> Result<Option<N>>;

    /// Every transitive descendant of `node`, all generations, in one call
    ///
    /// Descendants already modified in the active unit of work are returned
    /// in their tracked state. `node` itself is never part of the result.
    /// Ordering is unspecified.
    async fn find_all_descendants(&self, node: &N) -> Result<Vec<N>>;
}
