// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lazy evaluation of node configuration inputs.
//!
//! A data input either holds a literal or is fed by a link from another
//! node's output. Outputs are computed on demand, per node kind:
//! - Value nodes return their constant
//! - Math nodes combine their `A` and `B` inputs
//! - Collection nodes return their reference
//! - anything else falls back to the output socket's stored value
//!
//! A [`ResolutionPass`] memoizes every output socket it evaluates and
//! detects cycles in the data links. Sockets on a cycle resolve to
//! [`Resolved::Unresolved`], so their consumers fall back to their own
//! literals. Nothing in here fails: every lookup degrades to a default.

use crate::graph::Graph;
use crate::link::Link;
use crate::node::{Node, NodeId, NodeKind};
use crate::socket::{CollectionRef, Socket, SocketDirection, SocketId, SocketKind, SocketValue};
use std::collections::{HashMap, HashSet};

/// Outcome of evaluating a socket
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// No value could be produced (cycle, missing socket, no literal)
    Unresolved,
    /// Evaluated value
    Value(SocketValue),
}

impl Resolved {
    /// Convert into an `Option`
    pub fn into_value(self) -> Option<SocketValue> {
        match self {
            Self::Unresolved => None,
            Self::Value(v) => Some(v),
        }
    }
}

/// One resolution pass over a graph.
///
/// The memo cache lives as long as the pass; create a new pass whenever
/// the graph may have changed.
pub struct ResolutionPass<'a> {
    graph: &'a Graph,
    /// Evaluated output sockets
    cache: HashMap<SocketId, Resolved>,
    /// Output sockets currently being evaluated, outermost first
    visiting: Vec<SocketId>,
    /// Output sockets found to lie on a data cycle
    cyclic: HashSet<SocketId>,
}

impl<'a> ResolutionPass<'a> {
    /// Start a pass over `graph`
    pub fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            cache: HashMap::new(),
            visiting: Vec::new(),
            cyclic: HashSet::new(),
        }
    }

    /// The graph being resolved
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Number of output sockets evaluated so far
    pub fn evaluated_count(&self) -> usize {
        self.cache.len()
    }

    /// Resolve the named input of a node.
    ///
    /// Returns the linked value if the input is fed by a link, else the
    /// stored literal, converted to the type of `default`. Any failure
    /// returns `default`.
    pub fn resolve(&mut self, node_id: NodeId, input: &str, default: SocketValue) -> SocketValue {
        let graph = self.graph;
        let Some(socket) = graph.node(node_id).and_then(|n| n.input_named(input)) else {
            return default;
        };

        match self.resolve_socket(socket) {
            Resolved::Value(value) => value.coerce(default.data_type()).unwrap_or(default),
            Resolved::Unresolved => default,
        }
    }

    /// Resolve a numeric input
    pub fn resolve_f32(&mut self, node_id: NodeId, input: &str, default: f32) -> f32 {
        self.resolve(node_id, input, SocketValue::Float(default))
            .as_f32()
            .unwrap_or(default)
    }

    /// Resolve an integer input
    pub fn resolve_i32(&mut self, node_id: NodeId, input: &str, default: i32) -> i32 {
        self.resolve(node_id, input, SocketValue::Int(default))
            .as_i32()
            .unwrap_or(default)
    }

    /// Resolve a collection input, `None` when unset
    pub fn resolve_collection(&mut self, node_id: NodeId, input: &str) -> Option<CollectionRef> {
        self.resolve(node_id, input, SocketValue::Collection(None))
            .as_collection()
            .cloned()
    }

    /// Linked value of an input socket, falling back to its literal
    fn resolve_socket(&mut self, socket: &'a Socket) -> Resolved {
        if let Some(link) = self.first_valid_link(socket) {
            if let Resolved::Value(value) = self.evaluate_output(link.from_node, link.from_socket) {
                if let SocketKind::Data(data_type) = socket.kind {
                    if let Some(value) = value.coerce(data_type) {
                        return Resolved::Value(value);
                    }
                }
            }
        }
        literal(socket)
    }

    /// First link into `socket` that is valid and comes from a compatible output
    fn first_valid_link(&self, socket: &Socket) -> Option<&'a Link> {
        let graph = self.graph;
        graph.links_to(socket.id).find(|link| {
            link.valid
                && graph
                    .node(link.from_node)
                    .and_then(|n| n.socket(&link.from_socket))
                    .is_some_and(|source| {
                        source.direction == SocketDirection::Output
                            && !source.is_flow()
                            && source.kind.can_connect_to(socket.kind)
                    })
        })
    }

    /// Evaluate an output socket, at most once per pass
    fn evaluate_output(&mut self, node_id: NodeId, socket_id: SocketId) -> Resolved {
        if let Some(cached) = self.cache.get(&socket_id) {
            return cached.clone();
        }

        if let Some(position) = self.visiting.iter().position(|s| *s == socket_id) {
            tracing::trace!("Data cycle through {} socket(s)", self.visiting.len() - position);
            self.cyclic.extend(self.visiting[position..].iter().copied());
            return Resolved::Unresolved;
        }

        let graph = self.graph;
        let Some(node) = graph.node(node_id) else {
            return Resolved::Unresolved;
        };
        let Some(socket) = node.socket(&socket_id) else {
            return Resolved::Unresolved;
        };

        self.visiting.push(socket_id);
        let result = self.evaluate_node(node, socket);
        self.visiting.pop();

        let result = if self.cyclic.contains(&socket_id) {
            Resolved::Unresolved
        } else {
            result
        };
        self.cache.insert(socket_id, result.clone());
        result
    }

    fn evaluate_node(&mut self, node: &'a Node, output: &'a Socket) -> Resolved {
        match &node.kind {
            NodeKind::Value(value) => Resolved::Value(SocketValue::Float(*value)),
            NodeKind::Math { operation, clamp } => {
                let a = self.numeric_input(node, 0);
                let b = self.numeric_input(node, 1);
                let mut result = operation.apply(a, b);
                if *clamp {
                    result = result.clamp(0.0, 1.0);
                }
                Resolved::Value(SocketValue::Float(result))
            }
            NodeKind::Collection(reference) => {
                Resolved::Value(SocketValue::Collection(reference.clone()))
            }
            _ => literal(output),
        }
    }

    fn numeric_input(&mut self, node: &'a Node, index: usize) -> f32 {
        node.input(index)
            .and_then(|socket| self.resolve_socket(socket).into_value())
            .and_then(|value| value.as_f32())
            .unwrap_or(0.0)
    }
}

fn literal(socket: &Socket) -> Resolved {
    match &socket.value {
        Some(value) => Resolved::Value(value.clone()),
        None => Resolved::Unresolved,
    }
}
