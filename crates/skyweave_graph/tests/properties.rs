// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based tests for dataflow resolution.
//!
//! Random math-node networks, cyclic or not, must resolve in finite time
//! and give the same answer on every pass.

use proptest::prelude::*;
use skyweave_graph::{
    create_show_registry, Graph, Link, MathOperation, NodeId, NodeKind, ResolutionPass,
    SocketValue,
};

const OPERATIONS: [MathOperation; 6] = [
    MathOperation::Add,
    MathOperation::Subtract,
    MathOperation::Multiply,
    MathOperation::Divide,
    MathOperation::Max,
    MathOperation::Min,
];

/// Build `count` math nodes with literal inputs, then wire random outputs
/// into random inputs without validation.
fn math_network(
    count: usize,
    literals: &[(f32, f32)],
    operations: &[usize],
    wires: &[(usize, usize, bool)],
) -> (Graph, Vec<NodeId>) {
    let registry = create_show_registry();
    let mut graph = Graph::new("Network");
    let mut ids = Vec::with_capacity(count);

    for i in 0..count {
        let kind = NodeKind::Math {
            operation: OPERATIONS[operations[i] % OPERATIONS.len()],
            clamp: false,
        };
        let node = registry
            .create_node("math")
            .unwrap()
            .with_name(format!("Math {i}"))
            .with_kind(kind);
        let id = graph.add_node(node).unwrap();
        graph.set_input_value(id, "A", SocketValue::Float(literals[i].0)).unwrap();
        graph.set_input_value(id, "B", SocketValue::Float(literals[i].1)).unwrap();
        ids.push(id);
    }

    for &(from, to, second_input) in wires {
        let (from, to) = (ids[from % count], ids[to % count]);
        let out = graph.node(from).unwrap().output_named("Result").unwrap().id;
        let input = if second_input { "B" } else { "A" };
        let target = graph.node(to).unwrap().input_named(input).unwrap().id;
        graph.insert_link(Link::new(from, out, to, target));
    }

    (graph, ids)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Resolution of every input terminates and is identical across passes.
    #[test]
    fn resolution_terminates_and_is_deterministic(
        count in 1usize..8,
        literals in prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 8),
        operations in prop::collection::vec(0usize..6, 8),
        wires in prop::collection::vec((0usize..8, 0usize..8, any::<bool>()), 0..16),
    ) {
        let (graph, ids) = math_network(count, &literals, &operations, &wires);

        let mut first = ResolutionPass::new(&graph);
        let mut second = ResolutionPass::new(&graph);
        for &id in &ids {
            for input in ["A", "B"] {
                let a = first.resolve_f32(id, input, f32::NAN);
                let b = second.resolve_f32(id, input, f32::NAN);
                prop_assert!(!a.is_nan() || b.is_nan(), "passes disagree on {input}: {a} vs {b}");
                if !a.is_nan() {
                    prop_assert_eq!(a.to_bits(), b.to_bits());
                }
            }
        }
    }

    /// Without any links, every input resolves to its literal.
    #[test]
    fn unlinked_inputs_resolve_to_literals(
        count in 1usize..8,
        literals in prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 8),
        operations in prop::collection::vec(0usize..6, 8),
    ) {
        let (graph, ids) = math_network(count, &literals, &operations, &[]);
        let mut pass = ResolutionPass::new(&graph);
        for (i, &id) in ids.iter().enumerate() {
            prop_assert_eq!(pass.resolve_f32(id, "A", 0.0), literals[i].0);
            prop_assert_eq!(pass.resolve_f32(id, "B", 0.0), literals[i].1);
        }
    }
}
