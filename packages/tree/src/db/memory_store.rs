//! In-Memory Unit-of-Work Store
//!
//! `InMemoryNodeStore` keeps two layers of state, mirroring how an ORM
//! session sits on top of a database:
//!
//! - **committed**: the last durable state of every node
//! - **tracked**: pending changes staged in the active unit of work
//!
//! Reads through `find_tracked` and `find_all_descendants` see the tracked
//! layer overlaid on the committed one; `find_committed` only ever sees the
//! committed layer. `commit()` folds the tracked layer down and `rollback()`
//! discards it.
//!
//! Every `NodeStore` read is counted and can be made to fail on demand,
//! which is what tests use to assert how many reads a move costs and how
//! store failures propagate.
//!
//! # Lock Ordering
//!
//! Both layers sit behind `tokio::sync::RwLock`. Methods touching both
//! always acquire `committed` before `tracked`.

use crate::db::{NodeStore, StoreError, StoreOperation};
use crate::models::{MaterializedPath, TreeNode};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Number of reads issued against each `NodeStore` method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCallCounts {
    pub find_committed: usize,
    pub find_tracked: usize,
    pub find_all_descendants: usize,
}

impl StoreCallCounts {
    pub fn total(&self) -> usize {
        self.find_committed + self.find_tracked + self.find_all_descendants
    }
}

#[derive(Debug, Default)]
struct CallCounters {
    find_committed: AtomicUsize,
    find_tracked: AtomicUsize,
    find_all_descendants: AtomicUsize,
}

impl CallCounters {
    fn record(&self, operation: StoreOperation) {
        let counter = match operation {
            StoreOperation::FindCommitted => &self.find_committed,
            StoreOperation::FindTracked => &self.find_tracked,
            StoreOperation::FindAllDescendants => &self.find_all_descendants,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> StoreCallCounts {
        StoreCallCounts {
            find_committed: self.find_committed.load(Ordering::Relaxed),
            find_tracked: self.find_tracked.load(Ordering::Relaxed),
            find_all_descendants: self.find_all_descendants.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.find_committed.store(0, Ordering::Relaxed);
        self.find_tracked.store(0, Ordering::Relaxed);
        self.find_all_descendants.store(0, Ordering::Relaxed);
    }
}

/// Committed/tracked node store held entirely in memory
pub struct InMemoryNodeStore<N: TreeNode> {
    committed: RwLock<HashMap<N::Id, N>>,
    tracked: RwLock<HashMap<N::Id, N>>,
    failures: RwLock<HashSet<StoreOperation>>,
    calls: CallCounters,
}

impl<N: TreeNode> Default for InMemoryNodeStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: TreeNode> InMemoryNodeStore<N> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            committed: RwLock::new(HashMap::new()),
            tracked: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashSet::new()),
            calls: CallCounters::default(),
        }
    }

    /// Seed a node directly into the committed layer
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateNode` if a node with this id is already committed.
    pub async fn insert_committed(&self, node: N) -> Result<(), StoreError> {
        let mut committed = self.committed.write().await;
        if committed.contains_key(node.id()) {
            return Err(StoreError::duplicate_node(node.id()));
        }
        committed.insert(node.id().clone(), node);
        Ok(())
    }

    /// Stage a node in the active unit of work
    pub async fn stage(&self, node: N) {
        self.tracked.write().await.insert(node.id().clone(), node);
    }

    /// Stage several nodes at once
    pub async fn stage_all(&self, nodes: impl IntoIterator<Item = N>) {
        let mut tracked = self.tracked.write().await;
        for node in nodes {
            tracked.insert(node.id().clone(), node);
        }
    }

    /// Fold every staged node into the committed layer
    ///
    /// Returns the number of nodes written.
    pub async fn commit(&self) -> usize {
        let mut committed = self.committed.write().await;
        let mut tracked = self.tracked.write().await;
        let count = tracked.len();
        committed.extend(tracked.drain());
        tracing::debug!("Committed {} staged nodes", count);
        count
    }

    /// Discard every staged node
    ///
    /// Returns the number of nodes discarded.
    pub async fn rollback(&self) -> usize {
        let mut tracked = self.tracked.write().await;
        let count = tracked.len();
        tracked.clear();
        tracing::debug!("Rolled back {} staged nodes", count);
        count
    }

    /// Number of distinct nodes visible in the tracked view
    pub async fn node_count(&self) -> usize {
        let committed = self.committed.read().await;
        let tracked = self.tracked.read().await;
        committed.len() + tracked.keys().filter(|id| !committed.contains_key(*id)).count()
    }

    /// Number of nodes staged but not yet committed
    pub async fn pending_count(&self) -> usize {
        self.tracked.read().await.len()
    }

    /// Every node in the tracked view, without counting as a `NodeStore` read
    pub async fn snapshot(&self) -> Vec<N> {
        let committed = self.committed.read().await;
        let tracked = self.tracked.read().await;
        merged_view(&committed, &tracked).cloned().collect()
    }

    /// Reads issued so far, per method
    pub fn call_counts(&self) -> StoreCallCounts {
        self.calls.snapshot()
    }

    pub fn reset_call_counts(&self) {
        self.calls.reset();
    }

    /// Make every subsequent call to `operation` fail
    pub async fn fail_on(&self, operation: StoreOperation) {
        self.failures.write().await.insert(operation);
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    async fn begin_read(&self, operation: StoreOperation) -> anyhow::Result<()> {
        self.calls.record(operation);
        if self.failures.read().await.contains(&operation) {
            tracing::debug!("Injecting failure for {}", operation);
            return Err(StoreError::injected_failure(operation).into());
        }
        Ok(())
    }
}

/// Tracked layer overlaid on the committed one
fn merged_view<'a, N: TreeNode>(
    committed: &'a HashMap<N::Id, N>,
    tracked: &'a HashMap<N::Id, N>,
) -> impl Iterator<Item = &'a N> {
    committed
        .iter()
        .filter(move |(id, _)| !tracked.contains_key(*id))
        .map(|(_, node)| node)
        .chain(tracked.values())
}

#[async_trait]
impl<N: TreeNode> NodeStore<N> for InMemoryNodeStore<N> {
    async fn find_committed(&self, id: &N::Id) -> anyhow::Result<Option<N>> {
        self.begin_read(StoreOperation::FindCommitted).await?;
        Ok(self.committed.read().await.get(id).cloned())
    }

    async fn find_tracked(&self, id: &N::Id) -> anyhow::Result<Option<N>> {
        self.begin_read(StoreOperation::FindTracked).await?;
        let committed = self.committed.read().await;
        let tracked = self.tracked.read().await;
        Ok(tracked.get(id).or_else(|| committed.get(id)).cloned())
    }

    async fn find_all_descendants(&self, node: &N) -> anyhow::Result<Vec<N>> {
        self.begin_read(StoreOperation::FindAllDescendants).await?;

        let ancestor = MaterializedPath::new(node.path());
        let committed = self.committed.read().await;
        let tracked = self.tracked.read().await;

        let mut descendants: Vec<N> = merged_view(&committed, &tracked)
            .filter(|candidate| candidate.id() != node.id())
            .filter(|candidate| candidate.materialized_path().is_descendant_of(&ancestor))
            .cloned()
            .collect();
        descendants.sort_by(|a, b| a.level().cmp(&b.level()).then_with(|| a.path().cmp(b.path())));

        Ok(descendants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;
    use uuid::Uuid;

    async fn seeded_store() -> (InMemoryNodeStore<Node>, Node, Node, Node) {
        let store = InMemoryNodeStore::new();
        let root = Node::new_root("root");
        let child = Node::new_child("child", &root);
        let grandchild = Node::new_child("grandchild", &child);
        store.insert_committed(root.clone()).await.unwrap();
        store.insert_committed(child.clone()).await.unwrap();
        store.insert_committed(grandchild.clone()).await.unwrap();
        (store, root, child, grandchild)
    }

    #[tokio::test]
    async fn test_unknown_id_is_absent_not_an_error() {
        let (store, _, _, _) = seeded_store().await;
        let unknown = Uuid::new_v4();

        assert!(store.find_committed(&unknown).await.unwrap().is_none());
        assert!(store.find_tracked(&unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_committed_rejects_duplicates() {
        let (store, root, _, _) = seeded_store().await;
        let err = store.insert_committed(root.clone()).await.unwrap_err();
        assert_eq!(err, StoreError::duplicate_node(root.id));
    }

    #[tokio::test]
    async fn test_committed_and_tracked_diverge() {
        let (store, _, mut child, _) = seeded_store().await;
        child.name = "renamed".to_string();
        store.stage(child.clone()).await;

        let committed = store.find_committed(&child.id).await.unwrap().unwrap();
        let tracked = store.find_tracked(&child.id).await.unwrap().unwrap();
        assert_eq!(committed.name, "child");
        assert_eq!(tracked.name, "renamed");
        assert_eq!(store.pending_count().await, 1);
        assert_eq!(store.node_count().await, 3);
    }

    #[tokio::test]
    async fn test_staged_only_node_has_no_committed_state() {
        let store = InMemoryNodeStore::new();
        let node = Node::new_root("draft");
        store.stage(node.clone()).await;

        assert!(store.find_committed(&node.id).await.unwrap().is_none());
        assert!(store.find_tracked(&node.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_all_descendants_returns_every_generation() {
        let (store, root, child, grandchild) = seeded_store().await;
        let unrelated = Node::new_root("other");
        store.insert_committed(unrelated).await.unwrap();

        let descendants = store.find_all_descendants(&root).await.unwrap();
        let ids: Vec<_> = descendants.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![child.id, grandchild.id]);
    }

    #[tokio::test]
    async fn test_commit_and_rollback() {
        let (store, _, mut child, _) = seeded_store().await;
        child.name = "renamed".to_string();
        store.stage(child.clone()).await;
        assert_eq!(store.rollback().await, 1);
        assert_eq!(store.find_tracked(&child.id).await.unwrap().unwrap().name, "child");

        store.stage(child.clone()).await;
        assert_eq!(store.commit().await, 1);
        assert_eq!(store.pending_count().await, 0);
        assert_eq!(
            store.find_committed(&child.id).await.unwrap().unwrap().name,
            "renamed"
        );
    }

    #[tokio::test]
    async fn test_call_counts_and_failure_injection() {
        let (store, root, _, _) = seeded_store().await;
        store.fail_on(StoreOperation::FindAllDescendants).await;

        store.find_committed(&root.id).await.unwrap();
        let err = store.find_all_descendants(&root).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::injected_failure(StoreOperation::FindAllDescendants))
        );

        let counts = store.call_counts();
        assert_eq!(counts.find_committed, 1);
        assert_eq!(counts.find_tracked, 0);
        assert_eq!(counts.find_all_descendants, 1);
        assert_eq!(counts.total(), 2);

        store.clear_failures().await;
        store.reset_call_counts();
        assert!(store.find_all_descendants(&root).await.is_ok());
        assert_eq!(store.call_counts().find_all_descendants, 1);
    }

    #[test]
    fn test_snapshot_does_not_count_reads() {
        let store = InMemoryNodeStore::new();
        let root = Node::new_root("root");
        tokio_test::block_on(async {
            store.insert_committed(root.clone()).await.unwrap();
            let snapshot = store.snapshot().await;
            assert_eq!(snapshot, vec![root]);
            assert_eq!(store.call_counts().total(), 0);
        });
    }
}
