//! NodeSpace Tree Path Maintenance
//!
//! This crate keeps the denormalized hierarchy columns of tree-shaped records
//! (a materialized `path` and a `level`) consistent with their `parent_id`
//! chain when nodes are moved around the tree.
//!
//! # Architecture
//!
//! - **Capability-based**: Works with any record implementing [`TreeNode`]
//! - **Store-agnostic**: Reads go through the [`NodeStore`] trait (committed vs tracked state)
//! - **Bulk reads**: A move costs at most four store calls, independent of subtree depth
//!
//! # Modules
//!
//! - [`models`] - `TreeNode` trait, concrete `Node` record, `MaterializedPath`
//! - [`db`] - `NodeStore` trait and the in-memory unit-of-work store
//! - [`services`] - `PathUpdater` and subtree rewrite helpers
//! - [`config`] - `TreeConfig` level conventions
//!
//! # Examples
//!
//! ```rust
//! use nodespace_tree::db::InMemoryNodeStore;
//! use nodespace_tree::models::Node;
//! use nodespace_tree::services::PathUpdater;
//! use std::sync::Arc;
//!
//! tokio_test::block_on(async {
//!     let store = Arc::new(InMemoryNodeStore::new());
//!     let a = Node::new_root("A");
//!     let b = Node::new_root("B");
//!     let mut child = Node::new_child("child", &a);
//!     store.insert_committed(a.clone()).await.unwrap();
//!     store.insert_committed(b.clone()).await.unwrap();
//!     store.insert_committed(child.clone()).await.unwrap();
//!
//!     child.parent_id = Some(b.id);
//!     let updater = PathUpdater::new(store.clone());
//!     let outcome = updater.update_path(&mut child).await.unwrap();
//!
//!     assert!(outcome.is_moved());
//!     assert_eq!(child.path, format!("{},{},", b.id, child.id));
//!     assert_eq!(child.level, 2);
//! });
//! ```

pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::TreeConfig;
pub use db::NodeStore;
pub use models::*;
pub use services::*;
