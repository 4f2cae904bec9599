// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for the show scheduler.
//!
//! Random acyclic flow graphs must produce schedules that respect every
//! flow edge, honour durations and never include unreachable nodes.

use proptest::prelude::*;
use skyweave_graph::graphs::show::{DURATION, START_FRAME};
use skyweave_graph::{build_edges, create_show_registry, reachable, Graph, Link, NodeId, SocketValue};
use skyweave_sequencer::{compute_schedule, frame_count};

/// Start node plus `durations.len()` show nodes; edges only go from lower
/// to higher index so the flow graph stays acyclic.
fn random_show(
    offset: i32,
    durations: &[f32],
    edges: &[(usize, usize)],
    roots: &[usize],
) -> (Graph, NodeId, Vec<NodeId>) {
    let registry = create_show_registry();
    let mut graph = Graph::new("Random");
    let start = graph.add_node(registry.create_node("start").unwrap()).unwrap();
    graph.set_input_value(start, START_FRAME, SocketValue::Int(offset)).unwrap();

    let mut shows = Vec::with_capacity(durations.len());
    for (i, duration) in durations.iter().enumerate() {
        let node = registry.create_node("show").unwrap().with_name(format!("Show {i}"));
        let id = graph.add_node(node).unwrap();
        graph.set_input_value(id, DURATION, SocketValue::Float(*duration)).unwrap();
        shows.push(id);
    }

    let link = |graph: &mut Graph, from: NodeId, output: &str, to: NodeId| {
        let out = graph.node(from).unwrap().output_named(output).unwrap().id;
        let input = graph.node(to).unwrap().input_named("In").unwrap().id;
        graph.insert_link(Link::new(from, out, to, input));
    };

    for &root in roots {
        link(&mut graph, start, "Next", shows[root % shows.len()]);
    }
    for &(a, b) in edges {
        let (a, b) = (a % shows.len(), b % shows.len());
        if a < b {
            link(&mut graph, shows[a], "Out", shows[b]);
        }
    }

    (graph, start, shows)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn schedule_respects_flow_edges(
        offset in -500i32..500,
        durations in prop::collection::vec(-10.0f32..100.0, 1..12),
        edges in prop::collection::vec((0usize..12, 0usize..12), 0..30),
        roots in prop::collection::vec(0usize..12, 1..3),
    ) {
        let (mut graph, start, _) = random_show(offset, &durations, &edges, &roots);
        let flow = build_edges(&graph);
        let reached = reachable(start, &flow);
        let schedule = compute_schedule(&mut graph);

        // Every reachable node except start has exactly one entry
        prop_assert_eq!(schedule.len(), reached.len() - 1);
        for entry in schedule.entries() {
            prop_assert!(reached.contains(&entry.node_id));
            let node = graph.node(entry.node_id).unwrap();
            let duration = node.input_named(DURATION).unwrap().value.as_ref().unwrap().as_f32().unwrap();
            prop_assert!(entry.end_frame >= entry.start_frame);
            prop_assert_eq!(entry.end_frame, entry.start_frame + frame_count(duration));
            prop_assert!(entry.start_frame >= offset);
        }

        for (from, targets) in &flow {
            let Some(before) = schedule.entries().iter().find(|e| e.node_id == *from) else {
                continue;
            };
            for to in targets {
                let after = schedule.entries().iter().find(|e| e.node_id == *to).unwrap();
                prop_assert!(
                    after.start_frame >= before.end_frame,
                    "{} starts at {} before {} ends at {}",
                    after.node_name, after.start_frame, before.node_name, before.end_frame
                );
            }
        }
    }

    #[test]
    fn schedule_is_deterministic(
        durations in prop::collection::vec(0.0f32..50.0, 1..10),
        edges in prop::collection::vec((0usize..10, 0usize..10), 0..20),
    ) {
        let (mut graph, _, _) = random_show(0, &durations, &edges, &[0]);
        let first = compute_schedule(&mut graph);
        let second = compute_schedule(&mut graph);
        prop_assert_eq!(first, second);
    }
}
