// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show node graph for Skyweave.
//!
//! A drone show is authored as a node graph:
//! - Flow nodes (start, show, transitions) linked through flow sockets
//!   define the order of the timeline
//! - Value, math and collection nodes feed the data inputs of flow
//!   nodes (durations, start frame, formation collection)
//!
//! ## Architecture
//!
//! - Typed sockets split into flow and data kinds
//! - Link validation, with a raw path for links mirrored from the host
//! - Lazy, memoized dataflow resolution with cycle detection
//! - Flow edge extraction and reachability from the start node
//! - Serialization support

pub mod node;
pub mod socket;
pub mod link;
pub mod graph;
pub mod evaluation;
pub mod flow;
pub mod graphs;

pub use node::{MathOperation, Node, NodeCategory, NodeError, NodeId, NodeKind, NodeRegistry, NodeType};
pub use socket::{CollectionRef, DataType, Socket, SocketDirection, SocketId, SocketKind, SocketValue};
pub use link::{Link, LinkId};
pub use graph::{Graph, GraphError};
pub use evaluation::{Resolved, ResolutionPass};
pub use flow::{build_edges, reachable, start_nodes, FlowEdges};
pub use graphs::show::create_show_registry;
