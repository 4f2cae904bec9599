// SPDX-License-Identifier: MIT OR Apache-2.0
//! Control-flow view of a show graph.
//!
//! Only flow sockets take part: the flow graph orders nodes and never
//! carries values.

use crate::graph::Graph;
use crate::node::{NodeId, NodeKind};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Flow successors per node, in graph order.
///
/// Nodes without outgoing flow edges have no entry.
pub type FlowEdges = IndexMap<NodeId, Vec<NodeId>>;

/// Collect the flow edges of `graph`.
///
/// Follows valid links leaving flow outputs and entering flow inputs of
/// existing nodes. A target reached through several sockets is listed once.
pub fn build_edges(graph: &Graph) -> FlowEdges {
    let mut edges = FlowEdges::new();

    for node in graph.nodes() {
        let mut targets: Vec<NodeId> = Vec::new();
        for socket in node.flow_outputs() {
            for link in graph.links_from(socket.id) {
                if !link.valid || link.from_node != node.id {
                    continue;
                }
                let enters_flow_input = graph
                    .node(link.to_node)
                    .and_then(|target| target.socket(&link.to_socket))
                    .is_some_and(|s| s.is_flow());
                if enters_flow_input && !targets.contains(&link.to_node) {
                    targets.push(link.to_node);
                }
            }
        }
        if !targets.is_empty() {
            edges.insert(node.id, targets);
        }
    }

    edges
}

/// Nodes reachable from `start`, in depth-first visiting order.
///
/// `start` itself is the first element. Each node appears once.
pub fn reachable(start: NodeId, edges: &FlowEdges) -> Vec<NodeId> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        order.push(node);

        if let Some(successors) = edges.get(&node) {
            // Reverse so the first successor is visited first
            for next in successors.iter().rev() {
                if !visited.contains(next) {
                    stack.push(*next);
                }
            }
        }
    }

    order
}

/// All start nodes, in graph order
pub fn start_nodes(graph: &Graph) -> Vec<NodeId> {
    graph
        .nodes()
        .filter(|n| n.kind == NodeKind::Start)
        .map(|n| n.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::show::create_show_registry;

    fn chain() -> (Graph, Vec<NodeId>) {
        let registry = create_show_registry();
        let mut graph = Graph::new("Show");
        let start = graph.add_node(registry.create_node("start").unwrap()).unwrap();
        let split = graph.add_node(registry.create_node("split_transition").unwrap()).unwrap();
        let left = graph.add_node(registry.create_node("show").unwrap().with_name("Left")).unwrap();
        let right = graph.add_node(registry.create_node("show").unwrap().with_name("Right")).unwrap();
        let merge = graph.add_node(registry.create_node("merge_transition").unwrap()).unwrap();
        let draft = graph.add_node(registry.create_node("show").unwrap().with_name("Draft")).unwrap();

        graph.connect_named(start, "Next", split, "In").unwrap();
        graph.connect_named(split, "Out A", left, "In").unwrap();
        graph.connect_named(split, "Out B", right, "In").unwrap();
        graph.connect_named(left, "Out", merge, "In A").unwrap();
        graph.connect_named(right, "Out", merge, "In B").unwrap();

        (graph, vec![start, split, left, right, merge, draft])
    }

    #[test]
    fn test_edges_skip_leaves() {
        let (graph, ids) = chain();
        let edges = build_edges(&graph);
        assert_eq!(edges.get(&ids[1]), Some(&vec![ids[2], ids[3]]));
        assert!(!edges.contains_key(&ids[4]));
        assert!(!edges.contains_key(&ids[5]));
    }

    #[test]
    fn test_reachable_excludes_drafts() {
        let (graph, ids) = chain();
        let edges = build_edges(&graph);
        let order = reachable(ids[0], &edges);
        assert_eq!(order, vec![ids[0], ids[1], ids[2], ids[4], ids[3]]);
        assert!(!order.contains(&ids[5]));
    }

    #[test]
    fn test_invalid_links_ignored() {
        let (mut graph, ids) = chain();
        let link = graph
            .links()
            .find(|l| l.from_node == ids[0])
            .map(|l| l.id)
            .unwrap();
        graph.invalidate_link(link);

        let edges = build_edges(&graph);
        assert_eq!(reachable(ids[0], &edges), vec![ids[0]]);
        assert_eq!(start_nodes(&graph), vec![ids[0]]);
    }
}
