// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drone show graph.
//!
//! Flow nodes (start, show, transitions) order the timeline; value, math
//! and collection nodes feed their configuration inputs.

use crate::node::{MathOperation, NodeKind, NodeRegistry, NodeType};
use crate::socket::{DataType, Socket, SocketKind, SocketValue};

/// Input carrying a node's length in frames
pub const DURATION: &str = "Duration";
/// Start node input offsetting the whole show
pub const START_FRAME: &str = "Start Frame";
/// Input referencing the formation collection
pub const COLLECTION: &str = "Collection";

fn float_in(name: &str, value: f32) -> Socket {
    Socket::input(name, SocketKind::Data(DataType::Float)).with_value(SocketValue::Float(value))
}

fn collection_in() -> Socket {
    Socket::input(COLLECTION, SocketKind::Data(DataType::Collection))
        .with_value(SocketValue::Collection(None))
}

/// Create the show graph node registry
pub fn create_show_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    registry.register(NodeType {
        id: "start".to_string(),
        name: "Start".to_string(),
        kind: NodeKind::Start,
        description: "Entry point of the show".to_string(),
        inputs: vec![
            Socket::input(START_FRAME, SocketKind::Data(DataType::Int))
                .with_value(SocketValue::Int(0)),
        ],
        outputs: vec![Socket::flow_out("Next")],
    });

    registry.register(NodeType {
        id: "show".to_string(),
        name: "Show".to_string(),
        kind: NodeKind::Show,
        description: "Hold a formation".to_string(),
        inputs: vec![Socket::flow_in("In"), float_in(DURATION, 0.0), collection_in()],
        outputs: vec![Socket::flow_out("Out")],
    });

    registry.register(NodeType {
        id: "transition".to_string(),
        name: "Transition".to_string(),
        kind: NodeKind::Transition,
        description: "Move between formations".to_string(),
        inputs: vec![Socket::flow_in("In"), float_in(DURATION, 0.0)],
        outputs: vec![Socket::flow_out("Out")],
    });

    registry.register(NodeType {
        id: "split_transition".to_string(),
        name: "Split Transition".to_string(),
        kind: NodeKind::SplitTransition,
        description: "Split the fleet into two branches".to_string(),
        inputs: vec![Socket::flow_in("In"), float_in(DURATION, 0.0)],
        outputs: vec![Socket::flow_out("Out A"), Socket::flow_out("Out B")],
    });

    registry.register(NodeType {
        id: "merge_transition".to_string(),
        name: "Merge Transition".to_string(),
        kind: NodeKind::MergeTransition,
        description: "Join two branches back into one fleet".to_string(),
        inputs: vec![
            Socket::flow_in("In A"),
            Socket::flow_in("In B"),
            float_in(DURATION, 0.0),
        ],
        outputs: vec![Socket::flow_out("Out")],
    });

    registry.register(NodeType {
        id: "value".to_string(),
        name: "Value".to_string(),
        kind: NodeKind::Value(0.0),
        description: "Constant number".to_string(),
        inputs: vec![],
        outputs: vec![Socket::output("Value", SocketKind::Data(DataType::Float))],
    });

    registry.register(NodeType {
        id: "math".to_string(),
        name: "Math".to_string(),
        kind: NodeKind::Math {
            operation: MathOperation::Add,
            clamp: false,
        },
        description: "Arithmetic on two numbers".to_string(),
        inputs: vec![float_in("A", 0.0), float_in("B", 0.0)],
        outputs: vec![Socket::output("Result", SocketKind::Data(DataType::Float))],
    });

    registry.register(NodeType {
        id: "collection".to_string(),
        name: "Collection".to_string(),
        kind: NodeKind::Collection(None),
        description: "Reference a scene collection".to_string(),
        inputs: vec![],
        outputs: vec![Socket::output(COLLECTION, SocketKind::Data(DataType::Collection))],
    });

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeCategory;

    #[test]
    fn test_registry_contents() {
        let registry = create_show_registry();
        assert_eq!(registry.types().count(), 8);
        assert_eq!(registry.types_in_category(NodeCategory::Flow).count(), 5);

        let merge = registry.create_node("merge_transition").unwrap();
        assert_eq!(merge.inputs.iter().filter(|s| s.is_flow()).count(), 2);
        let split = registry.create_node("split_transition").unwrap();
        assert_eq!(split.flow_outputs().count(), 2);
    }
}
