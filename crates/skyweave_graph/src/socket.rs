// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions for node inputs/outputs.
//!
//! Sockets come in two disjoint kinds: flow sockets carry no payload and
//! only order execution, data sockets carry a typed value that is either a
//! stored literal or computed through a link.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketId(pub Uuid);

impl SocketId {
    /// Create a new random socket ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SocketId {
    fn default() -> Self {
        Self::new()
    }
}

/// Socket direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketDirection {
    /// Input socket
    Input,
    /// Output socket
    Output,
}

/// Payload type of a data socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// Boolean value
    Bool,
    /// Reference to a host collection
    Collection,
}

impl DataType {
    /// Check if a value of this type can feed a socket of `other` type
    pub fn can_connect_to(self, other: DataType) -> bool {
        if self == other {
            return true;
        }

        matches!(
            (self, other),
            (Self::Int | Self::Float | Self::Bool, Self::Int | Self::Float | Self::Bool)
        )
    }
}

/// Socket kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketKind {
    /// Control-flow pin, no payload
    Flow,
    /// Typed data pin
    Data(DataType),
}

impl SocketKind {
    /// Whether this is a flow socket
    pub fn is_flow(self) -> bool {
        matches!(self, Self::Flow)
    }

    /// Check if this kind can connect to another kind
    pub fn can_connect_to(self, other: SocketKind) -> bool {
        match (self, other) {
            (Self::Flow, Self::Flow) => true,
            (Self::Data(a), Self::Data(b)) => a.can_connect_to(b),
            _ => false,
        }
    }
}

/// Name of a collection in the host scene
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionRef(pub String);

impl CollectionRef {
    /// Create a collection reference
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value that can be stored in a data socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SocketValue {
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// Boolean
    Bool(bool),
    /// Collection reference, empty when unset
    Collection(Option<CollectionRef>),
}

impl SocketValue {
    /// Get the data type for this value
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Float(_) => DataType::Float,
            Self::Bool(_) => DataType::Bool,
            Self::Collection(_) => DataType::Collection,
        }
    }

    /// Numeric view of the value
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Int(v) => Some(*v as f32),
            Self::Float(v) => Some(*v),
            Self::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Self::Collection(_) => None,
        }
    }

    /// Integer view of the value, floats are truncated toward zero
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.is_finite() => Some(*v as i32),
            Self::Bool(v) => Some(i32::from(*v)),
            Self::Float(_) | Self::Collection(_) => None,
        }
    }

    /// Collection view of the value
    pub fn as_collection(&self) -> Option<&CollectionRef> {
        match self {
            Self::Collection(c) => c.as_ref(),
            _ => None,
        }
    }

    /// Convert this value to `target`, if the types are compatible
    pub fn coerce(&self, target: DataType) -> Option<SocketValue> {
        match target {
            DataType::Int => self.as_i32().map(SocketValue::Int),
            DataType::Float => self.as_f32().map(SocketValue::Float),
            DataType::Bool => self.as_f32().map(|v| SocketValue::Bool(v != 0.0)),
            DataType::Collection => match self {
                Self::Collection(c) => Some(SocketValue::Collection(c.clone())),
                _ => None,
            },
        }
    }
}

/// A socket on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Socket {
    /// Unique socket ID
    pub id: SocketId,
    /// Socket name, unique per direction on a node
    pub name: String,
    /// Socket direction
    pub direction: SocketDirection,
    /// Flow or data
    pub kind: SocketKind,
    /// Stored literal (data inputs) or fallback value (data outputs)
    pub value: Option<SocketValue>,
    /// Whether multiple links are allowed
    pub multi_connect: bool,
}

impl Socket {
    /// Create a new input socket
    pub fn input(name: impl Into<String>, kind: SocketKind) -> Self {
        Self {
            id: SocketId::new(),
            name: name.into(),
            direction: SocketDirection::Input,
            kind,
            value: None,
            multi_connect: false,
        }
    }

    /// Create a new output socket
    pub fn output(name: impl Into<String>, kind: SocketKind) -> Self {
        Self {
            id: SocketId::new(),
            name: name.into(),
            direction: SocketDirection::Output,
            kind,
            value: None,
            multi_connect: true, // Outputs can fan out by default
        }
    }

    /// Flow input
    pub fn flow_in(name: impl Into<String>) -> Self {
        Self::input(name, SocketKind::Flow)
    }

    /// Flow output
    pub fn flow_out(name: impl Into<String>) -> Self {
        Self::output(name, SocketKind::Flow)
    }

    /// Set the stored literal
    pub fn with_value(mut self, value: SocketValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Allow several incoming links (merge points)
    pub fn multi(mut self) -> Self {
        self.multi_connect = true;
        self
    }

    /// Give this socket a fresh ID, used when instantiating templates
    pub(crate) fn fresh(&self) -> Self {
        Self {
            id: SocketId::new(),
            ..self.clone()
        }
    }

    /// Whether this is a flow socket
    pub fn is_flow(&self) -> bool {
        self.kind.is_flow()
    }

    /// Check if a link from this socket to `other` is valid
    pub fn can_connect(&self, other: &Socket) -> bool {
        if self.direction != SocketDirection::Output || other.direction != SocketDirection::Input {
            return false;
        }

        self.kind.can_connect_to(other.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_and_data_never_connect() {
        let flow = Socket::flow_out("Out");
        let data = Socket::input("Duration", SocketKind::Data(DataType::Float));
        assert!(!flow.can_connect(&data));
        assert!(flow.can_connect(&Socket::flow_in("In")));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(SocketValue::Float(2.9).as_i32(), Some(2));
        assert_eq!(SocketValue::Int(3).coerce(DataType::Float), Some(SocketValue::Float(3.0)));
        assert_eq!(SocketValue::Float(f32::NAN).as_i32(), None);
        assert_eq!(SocketValue::Collection(None).as_f32(), None);
    }

    #[test]
    fn test_collection_does_not_feed_numbers() {
        assert!(!DataType::Collection.can_connect_to(DataType::Float));
        assert!(DataType::Int.can_connect_to(DataType::Float));
    }
}
