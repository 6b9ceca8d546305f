//! Shared fixtures for integration tests
#![allow(dead_code)]

use nodespace_tree::db::InMemoryNodeStore;
use nodespace_tree::models::Node;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Route `tracing` output through the test harness (`RUST_LOG=debug` to see it)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Commit a complete tree of `depth` levels with `fanout` children per node
///
/// Returns every node created, root first, in breadth-first order.
pub async fn seed_tree(
    store: &InMemoryNodeStore<Node>,
    name: &str,
    depth: usize,
    fanout: usize,
) -> Vec<Node> {
    let root = Node::new_root(name);
    let mut nodes = vec![root];
    let mut frontier = vec![0];

    for _ in 1..depth {
        let mut next = Vec::new();
        for parent_idx in frontier {
            for i in 0..fanout {
                let child = Node::new_child(format!("{}-{}", name, i), &nodes[parent_idx]);
                nodes.push(child);
                next.push(nodes.len() - 1);
            }
        }
        frontier = next;
    }

    for node in &nodes {
        store.insert_committed(node.clone()).await.unwrap();
    }
    nodes
}

/// Assert every node in the tracked view agrees with its parent's columns
pub async fn assert_tree_consistent(store: &InMemoryNodeStore<Node>) {
    let nodes = store.snapshot().await;
    let by_id: HashMap<Uuid, &Node> = nodes.iter().map(|n| (n.id, n)).collect();

    for node in &nodes {
        let parent = node.parent_id.map(|id| {
            *by_id
                .get(&id)
                .unwrap_or_else(|| panic!("parent {} of {} missing", id, node.id))
        });
        if let Err(e) = node.validate_position(parent) {
            panic!("inconsistent node {}: {}", node.name, e);
        }
    }
}
