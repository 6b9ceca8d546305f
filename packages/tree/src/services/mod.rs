//! Path Maintenance Services
//!
//! - `PathUpdater` - Re-derives paths and levels when a node changes parent
//! - `subtree` - Pure rewrite and verification of a fetched descendant set
//!
//! Services read through the `NodeStore` trait and never write; the caller
//! persists the moved node and the rewritten descendants.

pub mod error;
pub mod path_updater;
pub mod subtree;

pub use error::PathUpdateError;
pub use path_updater::{PathUpdateOutcome, PathUpdater, SubtreeMove};
pub use subtree::{rebuild_subtree, verify_subtree, PathInconsistency, RebuildSummary};
