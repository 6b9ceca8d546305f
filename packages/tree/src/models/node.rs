//! Node Data Structure
//!
//! This module defines the concrete `Node` record used by NodeSpace for
//! hierarchical content. It carries the tree columns maintained by this crate
//! (`parent_id`, `path`, `level`) alongside display and ordering fields.
//!
//! # Examples
//!
//! ```rust
//! use nodespace_tree::models::Node;
//!
//! let root = Node::new_root("Projects");
//! let child = Node::new_child("Roadmap", &root);
//!
//! assert_eq!(root.level, 1);
//! assert_eq!(child.level, 2);
//! assert_eq!(child.path, format!("{},{},", root.id, child.id));
//! assert_eq!(child.parent_ids_from_path().unwrap(), vec![root.id]);
//! ```

use crate::config::DEFAULT_ROOT_LEVEL;
use crate::models::{MaterializedPath, TreeNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for tree columns
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid id in path '{path}': {segment}")]
    InvalidPathSegment { path: String, segment: String },

    #[error("Parent mismatch for node {id}: expected {expected:?}, found {actual:?}")]
    ParentMismatch {
        id: Uuid,
        expected: Option<Uuid>,
        actual: Option<Uuid>,
    },

    #[error("Level mismatch for node {id}: expected {expected}, found {actual}")]
    LevelMismatch { id: Uuid, expected: i32, actual: i32 },

    #[error("Path mismatch for node {id}: expected '{expected}', found '{actual}'")]
    PathMismatch {
        id: Uuid,
        expected: String,
        actual: String,
    },
}

/// Hierarchical node record
///
/// # Fields
///
/// - `id`: Unique identifier (UUID v4)
/// - `parent_id`: Direct parent, `None` for a root
/// - `path`: Materialized path from the root down to this node, inclusive
/// - `level`: Depth in the tree (roots at level 1)
/// - `name`: Display name
/// - `sort_id`: Optional ordering among siblings
/// - `created_at` / `modified_at`: Timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: Uuid,

    pub parent_id: Option<Uuid>,

    pub path: String,

    pub level: i32,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_id: Option<i32>,

    pub created_at: DateTime<Utc>,

    pub modified_at: DateTime<Utc>,
}

impl Node {
    /// Create a root node with a fresh UUID at the default root level
    pub fn new_root(name: impl Into<String>) -> Self {
        Self::new_root_at(name, DEFAULT_ROOT_LEVEL)
    }

    /// Create a root node with a fresh UUID at `root_level`
    ///
    /// Use this with `TreeConfig::root_level` when the deployment does not
    /// count levels from the default base.
    pub fn new_root_at(name: impl Into<String>, root_level: i32) -> Self {
        let id = Uuid::new_v4();
        Self::with_path(id, None, MaterializedPath::root(&id).into_string(), root_level)
            .named(name)
    }

    /// Create a node directly beneath `parent` with a fresh UUID
    pub fn new_child(name: impl Into<String>, parent: &Node) -> Self {
        let mut node = Self::new_root(name);
        node.init_path(Some(parent));
        node
    }

    /// Create a node with explicit tree columns
    ///
    /// No consistency check is made between `parent_id`, `path` and `level`;
    /// this is the constructor for rows loaded from storage.
    pub fn with_path(
        id: Uuid,
        parent_id: Option<Uuid>,
        path: impl Into<String>,
        level: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            parent_id,
            path: path.into(),
            level,
            name: String::new(),
            sort_id: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Builder-style name setter
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Derive `parent_id`, `path` and `level` from `parent`, or make the node a root
    pub fn init_path(&mut self, parent: Option<&Node>) {
        self.init_path_at(parent, DEFAULT_ROOT_LEVEL);
    }

    /// Like `init_path`, placing a parentless node at `root_level`
    pub fn init_path_at(&mut self, parent: Option<&Node>, root_level: i32) {
        match parent {
            Some(parent) => {
                self.parent_id = Some(parent.id);
                self.path = MaterializedPath::child_of(&parent.path, &self.id).into_string();
                self.level = parent.level + 1;
            }
            None => {
                self.parent_id = None;
                self.path = MaterializedPath::root(&self.id).into_string();
                self.level = root_level;
            }
        }
        self.modified_at = Utc::now();
    }

    /// Ancestor ids recorded in the path, root first, excluding this node
    pub fn parent_ids_from_path(&self) -> Result<Vec<Uuid>, ValidationError> {
        MaterializedPath::new(self.path.as_str())
            .ancestor_ids()
            .into_iter()
            .map(|segment| {
                Uuid::parse_str(segment).map_err(|_| ValidationError::InvalidPathSegment {
                    path: self.path.clone(),
                    segment: segment.to_string(),
                })
            })
            .collect()
    }

    /// Check that the tree columns agree with `parent` (or with being a root)
    pub fn validate_position(&self, parent: Option<&Node>) -> Result<(), ValidationError> {
        self.validate_position_at(parent, DEFAULT_ROOT_LEVEL)
    }

    /// Like `validate_position`, expecting a parentless node at `root_level`
    pub fn validate_position_at(
        &self,
        parent: Option<&Node>,
        root_level: i32,
    ) -> Result<(), ValidationError> {
        let expected_parent = parent.map(|p| p.id);
        if self.parent_id != expected_parent {
            return Err(ValidationError::ParentMismatch {
                id: self.id,
                expected: expected_parent,
                actual: self.parent_id,
            });
        }

        let (expected_path, expected_level) = match parent {
            Some(parent) => (
                MaterializedPath::child_of(&parent.path, &self.id),
                parent.level + 1,
            ),
            None => (MaterializedPath::root(&self.id), root_level),
        };

        if self.path != expected_path.as_str() {
            return Err(ValidationError::PathMismatch {
                id: self.id,
                expected: expected_path.into_string(),
                actual: self.path.clone(),
            });
        }

        if self.level != expected_level {
            return Err(ValidationError::LevelMismatch {
                id: self.id,
                expected: expected_level,
                actual: self.level,
            });
        }

        Ok(())
    }
}

impl TreeNode for Node {
    type Id = Uuid;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn parent_id(&self) -> Option<&Uuid> {
        self.parent_id.as_ref()
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn set_path(&mut self, path: String) {
        self.path = path;
        self.modified_at = Utc::now();
    }

    fn level(&self) -> i32 {
        self.level
    }

    fn set_level(&mut self, level: i32) {
        self.level = level;
        self.modified_at = Utc::now();
    }
}
