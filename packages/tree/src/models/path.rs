//! Materialized Path Encoding
//!
//! A materialized path caches the chain of ids from the root of the tree down
//! to a node, inclusive, as a separator-terminated string:
//!
//! ```text
//! root,               <- a root node
//! root,parent,        <- a child of root
//! root,parent,self,   <- a grandchild of root
//! ```
//!
//! The trailing separator is always written so that prefix tests on the raw
//! string never confuse `ab,` with `abc,`. Parsing is lenient: a missing
//! trailing separator and empty segments (`a,,b`) are tolerated and dropped,
//! which lets rows written by older code be normalized on their next rewrite.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between ids in a materialized path
pub const PATH_SEPARATOR: char = ',';

/// A separator-terminated chain of ancestor ids, ending with the node's own id
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterializedPath(String);

impl MaterializedPath {
    /// Wrap a raw path string without normalizing it
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Path of a node that has no parent
    pub fn root(id: &impl fmt::Display) -> Self {
        Self(format!("{}{}", id, PATH_SEPARATOR))
    }

    /// Path of `id` placed directly beneath a node whose path is `parent_path`
    ///
    /// `parent_path` is normalized first, so a parent row missing its trailing
    /// separator still produces a well-formed child path. An empty parent path
    /// is the virtual root and yields [`MaterializedPath::root`].
    pub fn child_of(parent_path: &str, id: &impl fmt::Display) -> Self {
        let mut path = Self::new(parent_path).normalized().0;
        path.push_str(&id.to_string());
        path.push(PATH_SEPARATOR);
        Self(path)
    }

    /// Build a path from an ordered list of ids (root first)
    pub fn from_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: fmt::Display,
    {
        let mut path = String::new();
        for id in ids {
            path.push_str(&id.to_string());
            path.push(PATH_SEPARATOR);
        }
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.segments().next().is_none()
    }

    /// Non-empty id segments, root first
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Id of the node this path belongs to (last segment)
    pub fn last_id(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Ids of every ancestor, root first, excluding the node itself
    pub fn ancestor_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.segments().collect();
        ids.pop();
        ids
    }

    /// Number of ids in the path
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Whether `id` appears anywhere in the chain
    pub fn contains_id(&self, id: &impl fmt::Display) -> bool {
        let id = id.to_string();
        self.segments().any(|s| s == id)
    }

    /// Whether this path lies strictly beneath `ancestor`
    ///
    /// Compared segment by segment so that malformed separators on either
    /// side do not produce false matches.
    pub fn is_descendant_of(&self, ancestor: &MaterializedPath) -> bool {
        let mut own = self.segments();
        for segment in ancestor.segments() {
            if own.next() != Some(segment) {
                return false;
            }
        }
        !ancestor.is_empty() && own.next().is_some()
    }

    /// Same chain of ids with exactly one trailing separator and no empty segments
    pub fn normalized(&self) -> Self {
        Self::from_ids(self.segments())
    }

    /// Replace the `old_prefix` chain at the head of this path with `new_prefix`
    ///
    /// Returns `None` when this path does not start with `old_prefix`. The
    /// remainder after the prefix is kept as-is apart from normalization.
    pub fn rebase(&self, old_prefix: &str, new_prefix: &str) -> Option<Self> {
        let old_prefix = Self::new(old_prefix);
        let new_prefix = Self::new(new_prefix);
        let mut own = self.segments();
        for segment in old_prefix.segments() {
            if own.next() != Some(segment) {
                return None;
            }
        }

        Some(Self::from_ids(new_prefix.segments().chain(own)))
    }
}

impl fmt::Display for MaterializedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MaterializedPath {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for MaterializedPath {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<MaterializedPath> for String {
    fn from(path: MaterializedPath) -> Self {
        path.0
    }
}

impl AsRef<str> for MaterializedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
