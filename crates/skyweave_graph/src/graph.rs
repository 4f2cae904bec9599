// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and links.

use crate::link::{Link, LinkId};
use crate::node::{Node, NodeId};
use crate::socket::{SocketDirection, SocketId, SocketValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A show node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Links between sockets
    links: IndexMap<LinkId, Link>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            links: IndexMap::new(),
        }
    }

    /// Add a node to the graph, names must be unique
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.node_by_name(&node.name).is_some() {
            return Err(GraphError::DuplicateName(node.name));
        }
        let id = node.id;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Remove a node and its links
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.links.retain(|_, l| !l.involves_node(node_id));
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Find a node by its unique name
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.name == name)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Set the stored literal of a named input socket
    pub fn set_input_value(
        &mut self,
        node_id: NodeId,
        input: &str,
        value: SocketValue,
    ) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let socket = node.input_named_mut(input)
            .ok_or_else(|| GraphError::SocketNameNotFound(input.to_string()))?;
        socket.value = Some(value);
        Ok(())
    }

    /// Link two sockets after validating the connection
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_socket: SocketId,
        to_node: NodeId,
        to_socket: SocketId,
    ) -> Result<LinkId, GraphError> {
        let source_node = self.nodes.get(&from_node)
            .ok_or(GraphError::NodeNotFound(from_node))?;
        let target_node = self.nodes.get(&to_node)
            .ok_or(GraphError::NodeNotFound(to_node))?;

        let source = source_node.socket(&from_socket)
            .ok_or(GraphError::SocketNotFound(from_socket))?;
        let target = target_node.socket(&to_socket)
            .ok_or(GraphError::SocketNotFound(to_socket))?;

        if !source.can_connect(target) {
            return Err(GraphError::IncompatibleSockets);
        }

        if !target.multi_connect && self.links.values().any(|l| l.to_socket == to_socket) {
            return Err(GraphError::SocketAlreadyConnected(to_socket));
        }

        if from_node == to_node {
            return Err(GraphError::SelfLoop);
        }

        Ok(self.insert_link(Link::new(from_node, from_socket, to_node, to_socket)))
    }

    /// Link two sockets by node and socket name
    pub fn connect_named(
        &mut self,
        from_node: NodeId,
        output: &str,
        to_node: NodeId,
        input: &str,
    ) -> Result<LinkId, GraphError> {
        let from_socket = self.socket_id(from_node, output, SocketDirection::Output)?;
        let to_socket = self.socket_id(to_node, input, SocketDirection::Input)?;
        self.connect(from_node, from_socket, to_node, to_socket)
    }

    fn socket_id(
        &self,
        node_id: NodeId,
        name: &str,
        direction: SocketDirection,
    ) -> Result<SocketId, GraphError> {
        let node = self.nodes.get(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let socket = match direction {
            SocketDirection::Input => node.input_named(name),
            SocketDirection::Output => node.output_named(name),
        };
        socket
            .map(|s| s.id)
            .ok_or_else(|| GraphError::SocketNameNotFound(name.to_string()))
    }

    /// Insert a link mirrored from the host without validation.
    ///
    /// Host graphs may carry several links into one input or links that
    /// no longer match their sockets; evaluation tolerates both.
    pub fn insert_link(&mut self, link: Link) -> LinkId {
        let id = link.id;
        self.links.insert(id, link);
        id
    }

    /// Remove a link
    pub fn disconnect(&mut self, link_id: LinkId) -> Option<Link> {
        self.links.shift_remove(&link_id)
    }

    /// Mark a link as stale, evaluation will skip it
    pub fn invalidate_link(&mut self, link_id: LinkId) -> bool {
        match self.links.get_mut(&link_id) {
            Some(link) => {
                link.valid = false;
                true
            }
            None => false,
        }
    }

    /// Get a link by ID
    pub fn link(&self, link_id: LinkId) -> Option<&Link> {
        self.links.get(&link_id)
    }

    /// Get all links
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Get links from a specific socket
    pub fn links_from(&self, socket_id: SocketId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.from_socket == socket_id)
    }

    /// Get links to a specific socket
    pub fn links_to(&self, socket_id: SocketId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.to_socket == socket_id)
    }

    /// Get links involving a node
    pub fn links_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.involves_node(node_id))
    }

    /// Get the number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled Show")
    }
}

/// Error when editing a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Socket not found
    #[error("Socket not found: {0:?}")]
    SocketNotFound(SocketId),

    /// No socket with that name on the node
    #[error("No socket named '{0}'")]
    SocketNameNotFound(String),

    /// Incompatible socket kinds or directions
    #[error("Incompatible sockets")]
    IncompatibleSockets,

    /// Input already has a link
    #[error("Socket already connected: {0:?}")]
    SocketAlreadyConnected(SocketId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,

    /// Another node already uses this name
    #[error("Duplicate node name: {0}")]
    DuplicateName(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::show::create_show_registry;

    #[test]
    fn test_duplicate_names_rejected() {
        let registry = create_show_registry();
        let mut graph = Graph::new("Show");
        graph.add_node(registry.create_node("show").unwrap().with_name("A")).unwrap();
        let err = graph.add_node(registry.create_node("show").unwrap().with_name("A"));
        assert!(matches!(err, Err(GraphError::DuplicateName(_))));
    }

    #[test]
    fn test_connect_validates_sockets() {
        let registry = create_show_registry();
        let mut graph = Graph::new("Show");
        let a = graph.add_node(registry.create_node("show").unwrap().with_name("A")).unwrap();
        let b = graph.add_node(registry.create_node("show").unwrap().with_name("B")).unwrap();
        let c = graph.add_node(registry.create_node("show").unwrap().with_name("C")).unwrap();

        graph.connect_named(a, "Out", b, "In").unwrap();
        assert!(matches!(
            graph.connect_named(c, "Out", b, "In"),
            Err(GraphError::SocketAlreadyConnected(_))
        ));
        assert!(matches!(
            graph.connect_named(a, "Out", b, "Duration"),
            Err(GraphError::IncompatibleSockets)
        ));
        assert!(matches!(graph.connect_named(a, "Out", a, "In"), Err(GraphError::SelfLoop)));
    }

    #[test]
    fn test_remove_node_drops_links() {
        let registry = create_show_registry();
        let mut graph = Graph::new("Show");
        let a = graph.add_node(registry.create_node("show").unwrap().with_name("A")).unwrap();
        let b = graph.add_node(registry.create_node("show").unwrap().with_name("B")).unwrap();
        let link = graph.connect_named(a, "Out", b, "In").unwrap();

        assert!(graph.invalidate_link(link));
        assert!(!graph.link(link).unwrap().valid);

        graph.remove_node(b);
        assert_eq!(graph.link_count(), 0);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_serialization() {
        let registry = create_show_registry();
        let mut graph = Graph::new("Round");
        let a = graph.add_node(registry.create_node("show").unwrap().with_name("A")).unwrap();
        graph.set_input_value(a, "Duration", SocketValue::Float(12.0)).unwrap();

        let ron_str = ron::ser::to_string_pretty(&graph, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: Graph = ron::from_str(&ron_str).unwrap();
        let node = loaded.node_by_name("A").unwrap();
        assert_eq!(node.input_named("Duration").unwrap().value, Some(SocketValue::Float(12.0)));
    }
}
