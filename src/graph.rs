//! Graph construction, identity deduplication, and build-time pruning
//! (§4.3).

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::node::{Node, TaskKind};
use crate::shape::Shape;

/// A built, deduplicated workflow graph, ready for the executor.
pub struct Graph {
    /// The root task's canonical Node.
    pub root: Arc<Node>,
    /// Every distinct task name observed while walking from the root, in
    /// first-observation (insertion) order — the identity/dedup surface
    /// of §4.3.
    pub canonical: IndexMap<String, Arc<Node>>,
}

impl Graph {
    /// Builds the graph from an eagerly constructed root Node: walks the
    /// tree, folding Nodes that share a `taskname` into the first one
    /// observed (§4.3), then computes build-time readiness and prunes
    /// already-ready subtrees (§4.2 step 1).
    pub fn build(root: Arc<Node>) -> Graph {
        let mut canonical = IndexMap::new();
        let root = register(root, &mut canonical);

        let mut settled = HashSet::new();
        for node in canonical.values() {
            finalize_if_ready(node, &mut settled);
        }

        Graph { root, canonical }
    }

    /// The Nodes reachable from the root *after* pruning, in
    /// first-observation order — the set the executor dispatches over and
    /// diagnostics report on (see DESIGN.md's reachability note).
    pub fn reachable(&self) -> IndexMap<String, Arc<Node>> {
        let mut out = IndexMap::new();
        walk_reachable(&self.root, &mut out);
        out
    }
}

/// Folds `node` into the canonical map by name, recursing into (and
/// rewriting) its requirements so every reference in the graph points at
/// the single canonical Node for that name.
fn register(node: Arc<Node>, canonical: &mut IndexMap<String, Arc<Node>>) -> Arc<Node> {
    if let Some(existing) = canonical.get(&node.name) {
        return existing.clone();
    }
    canonical.insert(node.name.clone(), node.clone());

    let original = node.requirements();
    let deduped = original.map(|child| register(child, canonical));
    *node.requirements.write() = deduped;

    node
}

/// Computes `node`'s readiness as of build time and, if ready, finalizes
/// it and clears its requirements (§4.2 step 1, §4.3 pruning). Recurses
/// into requirements first (post-order) so a `Collection`'s conjunction
/// sees its children's finalized verdicts. `settled` guards against
/// revisiting a Node reachable from multiple parents and against
/// looping forever on a cyclic (undefined, per §1) graph.
fn finalize_if_ready(node: &Arc<Node>, settled: &mut HashSet<String>) -> bool {
    if let Some(ready) = node.final_readiness() {
        return ready;
    }
    if !settled.insert(node.name.clone()) {
        // Already in progress higher up the call stack: a cycle. Treat as
        // not-ready without recursing further; the executor's stuck-graph
        // check will reject the workflow outright if this matters.
        return false;
    }

    let requirements = node.requirements();
    for child in requirements.iter() {
        finalize_if_ready(child, settled);
    }

    let ready = match node.kind {
        TaskKind::Basic | TaskKind::External => node.own_assets_ready(),
        TaskKind::Collection => requirements.iter().all(|child| child.final_readiness() == Some(true)),
    };

    if ready {
        node.finalize(true);
        *node.requirements.write() = Shape::None;
    }

    ready
}

fn walk_reachable(node: &Arc<Node>, out: &mut IndexMap<String, Arc<Node>>) {
    if out.contains_key(&node.name) {
        return;
    }
    out.insert(node.name.clone(), node.clone());
    for child in node.requirements().iter() {
        walk_reachable(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::task::TaskDeclaration;

    #[test]
    fn test_dedup_collapses_shared_name() {
        // z is never ready, so build-time pruning leaves requirements intact
        // and the dedup pointers stay observable.
        let z = TaskDeclaration::external("z", Shape::Scalar(Asset::new((), || false))).unwrap();
        let x = TaskDeclaration::collection("x", Shape::Scalar(z.clone())).unwrap();
        let z2 = TaskDeclaration::external("z", Shape::Scalar(Asset::new((), || false))).unwrap();
        let y = TaskDeclaration::collection("y", Shape::Scalar(z2)).unwrap();
        let root = TaskDeclaration::collection(
            "root",
            Shape::Seq(vec![x, y]),
        )
        .unwrap();

        let graph = Graph::build(root);
        assert_eq!(graph.canonical.len(), 4); // root, x, y, z (deduped)
        let x_req = graph.canonical["x"].requirements();
        let x_child = x_req.iter().next().unwrap();
        assert!(Arc::ptr_eq(x_child, &graph.canonical["z"]));
    }

    #[test]
    fn test_ready_node_is_pruned_at_build_time() {
        let leaf = TaskDeclaration::external("leaf", Shape::Scalar(Asset::new((), || true))).unwrap();
        let basic = TaskDeclaration::basic(
            "basic",
            Shape::Scalar(Asset::new((), || true)),
            Shape::Scalar(leaf),
            || async { Ok(()) },
        )
        .unwrap();

        let graph = Graph::build(basic);
        assert_eq!(graph.root.final_readiness(), Some(true));
        assert!(graph.root.requirements().is_empty());
    }

    #[test]
    fn test_not_ready_node_keeps_requirements() {
        let leaf = TaskDeclaration::external("leaf2", Shape::Scalar(Asset::new((), || false))).unwrap();
        let basic = TaskDeclaration::basic(
            "basic2",
            Shape::Scalar(Asset::new((), || false)),
            Shape::Scalar(leaf),
            || async { Ok(()) },
        )
        .unwrap();

        let graph = Graph::build(basic);
        assert_eq!(graph.root.final_readiness(), None);
        assert!(!graph.root.requirements().is_empty());
    }

    #[test]
    fn test_reachable_follows_pruned_requirements() {
        let leaf = TaskDeclaration::external("leaf3", Shape::Scalar(Asset::new((), || true))).unwrap();
        let basic = TaskDeclaration::basic(
            "basic3",
            Shape::Scalar(Asset::new((), || true)),
            Shape::Scalar(leaf),
            || async { Ok(()) },
        )
        .unwrap();

        let graph = Graph::build(basic);
        let reachable = graph.reachable();
        // basic3 is pre-ready, so its (already pruned) requirements no
        // longer include leaf3.
        assert_eq!(reachable.len(), 1);
        assert!(reachable.contains_key("basic3"));
    }
}
