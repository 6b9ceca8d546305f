//! Data Models
//!
//! This module contains the data structures used for path maintenance:
//!
//! - `TreeNode` - Capability trait for any record positioned in a tree
//! - `Node` - Concrete NodeSpace hierarchy record
//! - `MaterializedPath` - Encoding of the ancestor chain

mod node;
mod path;
mod tree_node;

pub use node::{Node, ValidationError};
pub use path::{MaterializedPath, PATH_SEPARATOR};
pub use tree_node::TreeNode;
