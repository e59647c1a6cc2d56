//! Port types and functionality for node connections

use serde::{Deserialize, Serialize};

/// Positional index of a slot on a node
pub type PortId = usize;

/// Identifier of a link between two slots
pub type LinkId = usize;

/// Direction of a port (input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    Input,
    Output,
}

/// Data types that can flow through ports
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Float,
    Int,
    String,
    Boolean,
    Vector3,
    /// Aggregates produced by the ConvertAny2 family
    Tuple,
    List,
    Dict,
    Set,
    /// Wildcard, accepts a connection from any output type
    Any,
}

impl DataType {
    /// Check if this data type can connect to another
    pub fn can_connect_to(&self, other: &DataType) -> bool {
        self == other || *self == DataType::Any || *other == DataType::Any
    }

    /// Get a human-readable name for this data type
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Float => "Float",
            DataType::Int => "Int",
            DataType::String => "String",
            DataType::Boolean => "Boolean",
            DataType::Vector3 => "Vector3",
            DataType::Tuple => "Tuple",
            DataType::List => "List",
            DataType::Dict => "Dict",
            DataType::Set => "Set",
            DataType::Any => "*",
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, DataType::Any)
    }
}

/// Represents a connection point on a node
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub name: String,
    pub port_type: PortType,
    pub data_type: DataType,
    /// Link feeding this input. Outputs never hold one, their links are
    /// looked up by origin on the graph.
    pub link: Option<LinkId>,
}

impl Port {
    /// Creates a new unconnected port
    pub fn new(name: impl Into<String>, port_type: PortType, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            port_type,
            data_type,
            link: None,
        }
    }

    pub fn input(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, PortType::Input, data_type)
    }

    pub fn output(name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(name, PortType::Output, data_type)
    }

    /// Checks if this port is an input
    pub fn is_input(&self) -> bool {
        matches!(self.port_type, PortType::Input)
    }

    /// Checks if this port is an output
    pub fn is_output(&self) -> bool {
        matches!(self.port_type, PortType::Output)
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_connects_to_everything() {
        assert!(DataType::Float.can_connect_to(&DataType::Any));
        assert!(DataType::Any.can_connect_to(&DataType::Dict));
        assert!(DataType::List.can_connect_to(&DataType::List));
        assert!(!DataType::Float.can_connect_to(&DataType::String));
    }

    #[test]
    fn test_new_port_is_unconnected() {
        let port = Port::input("input_1", DataType::Any);
        assert!(port.is_input());
        assert!(!port.is_connected());
        assert!(port.data_type.is_wildcard());
    }
}
