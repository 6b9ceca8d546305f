//! Subtree Rewriting
//!
//! Pure functions that bring a fetched set of descendants back in line with
//! their (already updated) subtree root. No store access happens here.
//!
//! # Strategy
//!
//! Descendants are linked back to the root through their `parent_id` and
//! rewritten top-down, so every node is derived from its parent's fresh
//! values:
//!
//! ```text
//! path  = parent.path + id + ","
//! level = parent.level + 1
//! ```
//!
//! For a consistent tree this is identical to replacing the old path prefix
//! and shifting levels by the root's delta, but it also repairs descendant
//! rows whose stored path was malformed. Descendants that cannot be linked
//! to the root (their parent is missing from the fetched set) fall back to
//! the prefix replacement.

use crate::models::{MaterializedPath, TreeNode};
use std::collections::{HashMap, VecDeque};

/// How each descendant was rewritten
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Derived from the parent chain
    pub rebuilt: usize,
    /// Old prefix replaced by the root's new path
    pub rebased: usize,
    /// Neither linked to the root nor under the old prefix, left untouched
    pub skipped: usize,
}

impl RebuildSummary {
    pub fn total(&self) -> usize {
        self.rebuilt + self.rebased + self.skipped
    }
}

/// A descendant whose tree columns disagree with the root's parent chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathInconsistency<Id> {
    Mismatch {
        id: Id,
        expected_path: String,
        actual_path: String,
        expected_level: i32,
        actual_level: i32,
    },
    /// No `parent_id` chain leads from this node to the root
    Orphaned { id: Id },
}

impl<Id> PathInconsistency<Id> {
    pub fn id(&self) -> &Id {
        match self {
            Self::Mismatch { id, .. } | Self::Orphaned { id } => id,
        }
    }
}

/// Descendant indices in top-down order, each paired with its parent's index
/// (`None` when the parent is `root`). Unreachable descendants are absent.
fn top_down_order<N: TreeNode>(root: &N, descendants: &[N]) -> Vec<(usize, Option<usize>)> {
    let mut children: HashMap<&N::Id, Vec<usize>> = HashMap::new();
    for (idx, node) in descendants.iter().enumerate() {
        if node.id() == root.id() {
            continue;
        }
        if let Some(parent_id) = node.parent_id() {
            children.entry(parent_id).or_default().push(idx);
        }
    }

    let mut order = Vec::with_capacity(descendants.len());
    let mut visited = vec![false; descendants.len()];
    let mut queue = VecDeque::from([(root.id(), None)]);

    while let Some((parent_id, parent_idx)) = queue.pop_front() {
        let Some(child_indices) = children.get(parent_id) else {
            continue;
        };
        for &idx in child_indices {
            // Reached again through a duplicated parent row
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            order.push((idx, parent_idx));
            queue.push_back((descendants[idx].id(), Some(idx)));
        }
    }

    order
}

/// Rewrite `descendants` beneath `root`, whose path and level are already final
///
/// `old_prefix` is the root's path before the move and `level_delta` the
/// change of its level; both are only used for descendants that cannot be
/// linked to the root through `parent_id`.
pub fn rebuild_subtree<N: TreeNode>(
    root: &N,
    old_prefix: &str,
    level_delta: i32,
    descendants: &mut [N],
) -> RebuildSummary {
    let mut summary = RebuildSummary::default();
    let order = top_down_order(root, descendants);
    let mut linked = vec![false; descendants.len()];

    for (idx, parent_idx) in order {
        let (parent_path, parent_level) = match parent_idx {
            Some(p) => (descendants[p].path().to_string(), descendants[p].level()),
            None => (root.path().to_string(), root.level()),
        };

        let node = &mut descendants[idx];
        let path = MaterializedPath::child_of(&parent_path, node.id());
        node.set_path(path.into_string());
        node.set_level(parent_level + 1);
        linked[idx] = true;
        summary.rebuilt += 1;
    }

    for (node, _) in descendants
        .iter_mut()
        .zip(linked)
        .filter(|(_, linked)| !linked)
    {
        match node.materialized_path().rebase(old_prefix, root.path()) {
            Some(path) => {
                node.set_path(path.into_string());
                node.set_level(node.level() + level_delta);
                summary.rebased += 1;
            }
            None => {
                tracing::warn!(
                    "Descendant {} with path '{}' is not under '{}', leaving it untouched",
                    node.id(),
                    node.path(),
                    old_prefix
                );
                summary.skipped += 1;
            }
        }
    }

    summary
}

/// Check every descendant against the path and level implied by the root's parent chain
pub fn verify_subtree<N: TreeNode>(root: &N, descendants: &[N]) -> Vec<PathInconsistency<N::Id>> {
    let mut expected: Vec<Option<(MaterializedPath, i32)>> = vec![None; descendants.len()];

    for (idx, parent_idx) in top_down_order(root, descendants) {
        let (parent_path, parent_level) = match parent_idx {
            Some(p) => match &expected[p] {
                Some((path, level)) => (path.as_str().to_string(), *level),
                None => continue,
            },
            None => (root.path().to_string(), root.level()),
        };
        let node = &descendants[idx];
        expected[idx] = Some((
            MaterializedPath::child_of(&parent_path, node.id()),
            parent_level + 1,
        ));
    }

    descendants
        .iter()
        .zip(expected)
        .filter(|(node, _)| node.id() != root.id())
        .filter_map(|(node, expected)| match expected {
            None => Some(PathInconsistency::Orphaned {
                id: node.id().clone(),
            }),
            Some((path, level)) if path.as_str() != node.path() || level != node.level() => {
                Some(PathInconsistency::Mismatch {
                    id: node.id().clone(),
                    expected_path: path.into_string(),
                    actual_path: node.path().to_string(),
                    expected_level: level,
                    actual_level: node.level(),
                })
            }
            Some(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;
    use uuid::Uuid;

    fn chain() -> (Node, Node, Node) {
        let root = Node::new_root("root");
        let child = Node::new_child("child", &root);
        let grandchild = Node::new_child("grandchild", &child);
        (root, child, grandchild)
    }

    #[test]
    fn test_rebuild_follows_parent_chain() {
        let (mut root, child, grandchild) = chain();
        let old_prefix = root.path.clone();
        let new_parent = Node::new_root("new parent");
        root.init_path(Some(&new_parent));

        // Grandchild first: input order must not matter
        let mut descendants = vec![grandchild.clone(), child.clone()];
        let summary = rebuild_subtree(&root, &old_prefix, 1, &mut descendants);

        assert_eq!(summary, RebuildSummary { rebuilt: 2, rebased: 0, skipped: 0 });
        assert_eq!(
            descendants[1].path,
            format!("{},{},{},", new_parent.id, root.id, child.id)
        );
        assert_eq!(descendants[1].level, 3);
        assert_eq!(
            descendants[0].path,
            format!("{},{},{},{},", new_parent.id, root.id, child.id, grandchild.id)
        );
        assert_eq!(descendants[0].level, 4);
        assert!(verify_subtree(&root, &descendants).is_empty());
    }

    #[test]
    fn test_rebuild_rebases_unlinked_descendants() {
        let (mut root, child, mut grandchild) = chain();
        let old_prefix = root.path.clone();
        root.init_path(Some(&Node::new_root("new parent")));

        // Parent row missing from the fetched set
        grandchild.parent_id = Some(Uuid::new_v4());
        let mut descendants = vec![grandchild.clone()];
        let summary = rebuild_subtree(&root, &old_prefix, 1, &mut descendants);

        assert_eq!(summary.rebased, 1);
        assert_eq!(
            descendants[0].path,
            format!("{}{},{},", root.path, child.id, grandchild.id)
        );
        assert_eq!(descendants[0].level, grandchild.level + 1);
    }

    #[test]
    fn test_rebuild_skips_foreign_rows() {
        let (root, _, _) = chain();
        let mut stranger = Node::new_root("stranger");
        stranger.parent_id = Some(Uuid::new_v4());
        let before = stranger.clone();

        let mut descendants = vec![stranger];
        let summary = rebuild_subtree(&root, &root.path.clone(), 0, &mut descendants);

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total(), 1);
        assert_eq!(descendants[0].path, before.path);
        assert_eq!(descendants[0].level, before.level);
    }

    #[test]
    fn test_rebuild_tolerates_duplicate_rows() {
        let (root, child, _) = chain();
        let mut descendants = vec![child.clone(), child.clone()];
        let summary = rebuild_subtree(&root, &root.path.clone(), 0, &mut descendants);

        assert_eq!(summary.rebuilt, 2);
        assert_eq!(descendants[0].path, child.path);
        assert_eq!(descendants[1].path, child.path);
    }

    #[test]
    fn test_verify_reports_mismatch_and_orphans() {
        let (root, mut child, grandchild) = chain();
        child.level = 7;
        let mut orphan = Node::new_child("orphan", &grandchild);
        orphan.parent_id = Some(Uuid::new_v4());

        let issues = verify_subtree(&root, &[child.clone(), grandchild.clone(), orphan.clone()]);

        assert_eq!(issues.len(), 2);
        assert!(matches!(
            &issues[0],
            PathInconsistency::Mismatch { id, expected_level: 2, actual_level: 7, .. } if *id == child.id
        ));
        assert_eq!(issues[1], PathInconsistency::Orphaned { id: orphan.id });
        assert_eq!(issues[1].id(), &orphan.id);
    }
}
