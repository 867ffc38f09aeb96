//! Graphviz-DOT rendering of a finished graph (§4.5, §6).
//!
//! Nodes are labeled by taskname and filled by final readiness; edges run
//! from each Node to each of its requirements and carry no label. §6's
//! restatement of the rendering contract is treated as authoritative over
//! §4.5's passing mention of edge labels (see DESIGN.md).

use indexmap::IndexMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::node::Node;

const READY_FILL: &str = "#b7e1a1";
const NOT_READY_FILL: &str = "#f4a3a3";

/// Renders `nodes` (as produced by [`crate::graph::Graph::reachable`]) as a
/// `digraph` in DOT syntax.
pub fn render_dot(nodes: &IndexMap<String, Arc<Node>>) -> String {
    let mut out = String::new();
    out.push_str("digraph assetflow {\n");

    for node in nodes.values() {
        let fill = match node.final_readiness() {
            Some(true) => READY_FILL,
            _ => NOT_READY_FILL,
        };
        let _ = writeln!(
            out,
            "  {:?} [style=filled, fillcolor={:?}];",
            node.name, fill
        );
    }

    for node in nodes.values() {
        for req in node.requirements().iter() {
            let _ = writeln!(out, "  {:?} -> {:?};", node.name, req.name);
        }
    }

    out.push_str("}\n");
    out
}
