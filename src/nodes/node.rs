//! Node types and core node functionality

use super::graph::NodeGraph;
use super::port::{DataType, Port, PortId, PortType};
use egui::Pos2;

/// Unique identifier for a node
pub type NodeId = usize;

/// Port mapping for context nodes - maps external ports to internal node ports
#[derive(Debug, Clone, PartialEq)]
pub struct PortMapping {
    /// External port name
    pub external_port: String,
    /// Internal node ID
    pub internal_node_id: NodeId,
    /// Internal port name
    pub internal_port: String,
    /// Whether this is an input (true) or output (false) mapping
    pub is_input: bool,
}

/// Type of node - regular processing node or context/group node
#[derive(Debug, Clone)]
pub enum NodeType {
    /// Regular processing node
    Regular,
    /// Context node that contains its own graph
    Context {
        /// The internal graph contained within this context node
        graph: Box<NodeGraph>,
        /// Port mappings between external and internal ports
        port_mappings: Vec<PortMapping>,
    },
}

/// Core node structure representing a node in the graph
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Registered class this node was created from
    pub class_type: String,
    pub title: String,
    pub position: Pos2,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub node_type: NodeType,
    dirty: bool,
}

impl Node {
    /// Creates a new node with the specified properties
    pub fn new(id: NodeId, class_type: impl Into<String>, position: Pos2) -> Self {
        let class_type = class_type.into();
        Self {
            id,
            title: class_type.clone(),
            class_type,
            position,
            inputs: vec![],
            outputs: vec![],
            node_type: NodeType::Regular,
            dirty: false,
        }
    }

    /// Creates a new context node wrapping `graph`
    pub fn new_context(
        id: NodeId,
        title: impl Into<String>,
        position: Pos2,
        graph: NodeGraph,
        port_mappings: Vec<PortMapping>,
    ) -> Self {
        let mut node = Self::new(id, crate::constants::node::SUBGRAPH_CLASS, position);
        node.title = title.into();
        node.node_type = NodeType::Context {
            graph: Box::new(graph),
            port_mappings,
        };
        node
    }

    /// Adds an input port to the node
    pub fn add_input(&mut self, name: impl Into<String>, data_type: DataType) -> &mut Self {
        self.inputs.push(Port::new(name, PortType::Input, data_type));
        self
    }

    /// Adds an output port to the node
    pub fn add_output(&mut self, name: impl Into<String>, data_type: DataType) -> &mut Self {
        self.outputs.push(Port::new(name, PortType::Output, data_type));
        self
    }

    pub fn input(&self, slot: PortId) -> Option<&Port> {
        self.inputs.get(slot)
    }

    pub fn output(&self, slot: PortId) -> Option<&Port> {
        self.outputs.get(slot)
    }

    /// Mark the node's visual representation as needing a redraw
    pub fn set_dirty_canvas(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns and clears the pending redraw request
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Check if this is a context node
    pub fn is_context(&self) -> bool {
        matches!(self.node_type, NodeType::Context { .. })
    }

    /// Get the internal graph if this is a context node
    pub fn get_internal_graph(&self) -> Option<&NodeGraph> {
        match &self.node_type {
            NodeType::Context { graph, .. } => Some(graph),
            NodeType::Regular => None,
        }
    }

    /// Get the mutable internal graph if this is a context node
    pub fn get_internal_graph_mut(&mut self) -> Option<&mut NodeGraph> {
        match &mut self.node_type {
            NodeType::Context { graph, .. } => Some(graph),
            NodeType::Regular => None,
        }
    }

    /// Get port mappings if this is a context node
    pub fn get_port_mappings(&self) -> Option<&Vec<PortMapping>> {
        match &self.node_type {
            NodeType::Context { port_mappings, .. } => Some(port_mappings),
            NodeType::Regular => None,
        }
    }

    /// Add a port mapping to this context node
    pub fn add_port_mapping(&mut self, mapping: PortMapping) -> Result<(), &'static str> {
        match &mut self.node_type {
            NodeType::Context { port_mappings, .. } => {
                port_mappings.push(mapping);
                Ok(())
            }
            NodeType::Regular => Err("Cannot add port mapping to regular node"),
        }
    }

    /// Get the internal node and port for an external port
    pub fn resolve_external_port(&self, external_port: &str, is_input: bool) -> Option<(NodeId, &str)> {
        self.get_port_mappings()?
            .iter()
            .find(|mapping| mapping.external_port == external_port && mapping.is_input == is_input)
            .map(|mapping| (mapping.internal_node_id, mapping.internal_port.as_str()))
    }
}
