// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the show graph.

use crate::socket::{CollectionRef, Socket, SocketId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Control-flow nodes that occupy time on the show timeline
    Flow,
    /// Constant inputs
    Input,
    /// Math operations
    Math,
    /// Scene references
    Reference,
}

/// Arithmetic performed by a [`NodeKind::Math`] node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathOperation {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`, zero when `b` is exactly zero
    Divide,
    /// `max(a, b)`
    Max,
    /// `min(a, b)`
    Min,
}

impl MathOperation {
    /// Apply the operation
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => {
                if b == 0.0 {
                    0.0
                } else {
                    a / b
                }
            }
            Self::Max => a.max(b),
            Self::Min => a.min(b),
        }
    }
}

/// What a node is, with its kind-specific literal fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Entry point of the show
    Start,
    /// A formation held for a duration
    Show,
    /// Movement between two formations
    Transition,
    /// Transition that fans out into several branches
    SplitTransition,
    /// Transition that joins several branches
    MergeTransition,
    /// Constant float
    Value(f32),
    /// Binary arithmetic on inputs `A` and `B`
    Math {
        /// Operation applied to the inputs
        operation: MathOperation,
        /// Clamp the result to `[0, 1]`
        clamp: bool,
    },
    /// Reference to a host collection
    Collection(Option<CollectionRef>),
}

impl NodeKind {
    /// Category of this kind
    pub fn category(&self) -> NodeCategory {
        match self {
            Self::Start
            | Self::Show
            | Self::Transition
            | Self::SplitTransition
            | Self::MergeTransition => NodeCategory::Flow,
            Self::Value(_) => NodeCategory::Input,
            Self::Math { .. } => NodeCategory::Math,
            Self::Collection(_) => NodeCategory::Reference,
        }
    }

    /// Whether nodes of this kind carry a computed start frame
    pub fn has_start_frame_field(&self) -> bool {
        matches!(
            self,
            Self::Show | Self::Transition | Self::SplitTransition | Self::MergeTransition
        )
    }
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Kind and default literals
    pub kind: NodeKind,
    /// Description
    pub description: String,
    /// Default input sockets
    pub inputs: Vec<Socket>,
    /// Default output sockets
    pub outputs: Vec<Socket>,
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    pub node_type: String,
    /// Node name, unique within a graph
    pub name: String,
    /// Kind and literal fields
    pub kind: NodeKind,
    /// Position in the editor
    pub position: [f32; 2],
    /// Input sockets
    pub inputs: Vec<Socket>,
    /// Output sockets
    pub outputs: Vec<Socket>,
    /// Last scheduled absolute start frame, for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    computed_start_frame: Option<i32>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.id.clone(),
            name: node_type.name.clone(),
            kind: node_type.kind.clone(),
            position: [0.0, 0.0],
            inputs: node_type.inputs.iter().map(Socket::fresh).collect(),
            outputs: node_type.outputs.iter().map(Socket::fresh).collect(),
            computed_start_frame: None,
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the kind, keeping the sockets
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Get an input socket by index
    pub fn input(&self, index: usize) -> Option<&Socket> {
        self.inputs.get(index)
    }

    /// Get an output socket by index
    pub fn output(&self, index: usize) -> Option<&Socket> {
        self.outputs.get(index)
    }

    /// Get an input socket by name
    pub fn input_named(&self, name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// Get a mutable input socket by name
    pub fn input_named_mut(&mut self, name: &str) -> Option<&mut Socket> {
        self.inputs.iter_mut().find(|s| s.name == name)
    }

    /// Get an output socket by name
    pub fn output_named(&self, name: &str) -> Option<&Socket> {
        self.outputs.iter().find(|s| s.name == name)
    }

    /// Get a socket by ID
    pub fn socket(&self, socket_id: &SocketId) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.id == *socket_id)
            .or_else(|| self.outputs.iter().find(|s| s.id == *socket_id))
    }

    /// Get all sockets
    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Flow output sockets
    pub fn flow_outputs(&self) -> impl Iterator<Item = &Socket> {
        self.outputs.iter().filter(|s| s.is_flow())
    }

    /// Last computed start frame, if any
    pub fn computed_start_frame(&self) -> Option<i32> {
        self.computed_start_frame
    }

    /// Record the computed start frame for display
    pub fn set_computed_start_frame(&mut self, frame: i32) -> Result<(), NodeError> {
        if !self.kind.has_start_frame_field() {
            return Err(NodeError::NoStartFrameField(self.name.clone()));
        }
        self.computed_start_frame = Some(frame);
        Ok(())
    }
}

/// Error when annotating a node
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// The node kind has no computed start frame field
    #[error("Node '{0}' has no start frame field")]
    NoStartFrameField(String),
}

/// Registry of available node types
pub struct NodeRegistry {
    /// Registered node types by ID
    types: indexmap::IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: indexmap::IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.kind.category() == category)
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.get(type_id).map(Node::new)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
