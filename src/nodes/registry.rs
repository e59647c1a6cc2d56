//! Node class registry with extension hooks
//!
//! The registry is an explicit object built at startup. Extensions are
//! offered every class as it is registered (and every class already
//! registered when the extension itself is added), so they can chain
//! behaviour onto the class's lifecycle hooks.

use crate::error::GraphError;
use crate::nodes::events::NodeCreated;
use crate::nodes::hooks::ClassHooks;
use crate::nodes::port::DataType;
use crate::nodes::{Node, NodeGraph, NodeId};
use egui::Pos2;
use log::{debug, info};
use std::collections::BTreeMap;

/// Hierarchical category system for organizing nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeCategory {
    path: Vec<String>,
}

impl NodeCategory {
    /// Create a new category from path components
    pub fn new(path: &[&str]) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Get display string for UI
    pub fn display_string(&self) -> String {
        self.path.join(" > ")
    }

    pub fn data() -> Self {
        Self::new(&["Data"])
    }

    pub fn conversion() -> Self {
        Self::new(&["Data", "Conversion"])
    }
}

/// Port definition for node creation
#[derive(Debug, Clone)]
pub struct PortDefinition {
    pub name: String,
    pub data_type: DataType,
}

impl PortDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
        }
    }
}

/// Metadata describing a node class
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    pub node_type: String,
    pub display_name: String,
    pub category: NodeCategory,
    pub description: String,
    pub inputs: Vec<PortDefinition>,
    pub outputs: Vec<PortDefinition>,
}

impl NodeMetadata {
    pub fn new(node_type: &str, display_name: &str, category: NodeCategory, description: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            display_name: display_name.to_string(),
            category,
            description: description.to_string(),
            inputs: vec![],
            outputs: vec![],
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<PortDefinition>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<PortDefinition>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Build an unattached node instance from this metadata
    pub fn instantiate(&self, position: Pos2) -> Node {
        let mut node = Node::new(0, self.node_type.clone(), position);
        node.title = self.display_name.clone();
        for input in &self.inputs {
            node.add_input(&input.name, input.data_type.clone());
        }
        for output in &self.outputs {
            node.add_output(&output.name, output.data_type.clone());
        }
        node
    }
}

/// A registered node class
#[derive(Debug, Clone)]
pub struct NodeClass {
    pub metadata: NodeMetadata,
    pub hooks: ClassHooks,
}

/// Behaviour that customises node classes as they are registered
pub trait Extension: Send + Sync {
    fn name(&self) -> &str;

    /// Called once per node class before any node of it is created
    fn before_register_node_def(&self, _class: &mut NodeClass) {}
}

/// Registry for managing node classes
#[derive(Default)]
pub struct NodeRegistry {
    classes: BTreeMap<String, NodeClass>,
    extensions: Vec<Box<dyn Extension>>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in classes
    pub fn with_builtin_classes() -> Self {
        let mut registry = Self::new();
        for metadata in builtin_classes() {
            registry.register_class(metadata);
        }
        registry
    }

    /// Add an extension; it is offered every class already registered
    pub fn register_extension(&mut self, extension: Box<dyn Extension>) {
        info!("Registering extension {}", extension.name());
        for class in self.classes.values_mut() {
            extension.before_register_node_def(class);
        }
        self.extensions.push(extension);
    }

    /// Register a node class, letting every extension customise it first
    pub fn register_class(&mut self, metadata: NodeMetadata) {
        let node_type = metadata.node_type.clone();
        let mut class = NodeClass {
            metadata,
            hooks: ClassHooks::default(),
        };
        for extension in &self.extensions {
            extension.before_register_node_def(&mut class);
        }

        if self.classes.insert(node_type.clone(), class).is_some() {
            debug!("Replaced node class {}", node_type);
        }
    }

    pub fn class(&self, node_type: &str) -> Option<&NodeClass> {
        self.classes.get(node_type)
    }

    pub fn metadata(&self, node_type: &str) -> Option<&NodeMetadata> {
        self.class(node_type).map(|class| &class.metadata)
    }

    /// Registered classes in name order
    pub fn classes(&self) -> impl Iterator<Item = &NodeClass> {
        self.classes.values()
    }

    pub fn extension_names(&self) -> Vec<&str> {
        self.extensions.iter().map(|extension| extension.name()).collect()
    }

    /// Create a node of `node_type` in `graph` and run its class's
    /// node-created hooks
    pub fn create_node(&self, node_type: &str, position: Pos2, graph: &mut NodeGraph) -> Result<NodeId, GraphError> {
        let class = self.class(node_type).ok_or_else(|| GraphError::UnknownClass(node_type.to_string()))?;
        let node_id = graph.add_node(class.metadata.instantiate(position));
        Self::fire_node_created(class, graph, node_id);
        Ok(node_id)
    }

    /// Like [`Self::create_node`] but under a fixed id, for restoring saved graphs
    pub fn create_node_with_id(
        &self,
        node_type: &str,
        node_id: NodeId,
        position: Pos2,
        graph: &mut NodeGraph,
    ) -> Result<NodeId, GraphError> {
        let class = self.class(node_type).ok_or_else(|| GraphError::UnknownClass(node_type.to_string()))?;
        let node_id = graph.add_node_with_id(node_id, class.metadata.instantiate(position));
        Self::fire_node_created(class, graph, node_id);
        Ok(node_id)
    }

    fn fire_node_created(class: &NodeClass, graph: &mut NodeGraph, node_id: NodeId) {
        debug!("Created {} node {}", class.metadata.node_type, node_id);
        class.hooks.node_created.invoke(graph, &NodeCreated { node_id });
    }
}

/// Classes shipped with the crate: the ConvertAny2 family and a few sources
pub fn builtin_classes() -> Vec<NodeMetadata> {
    let aggregator = |node_type: &str, display_name: &str, output: DataType| {
        NodeMetadata::new(
            node_type,
            display_name,
            NodeCategory::conversion(),
            "Collects any number of inputs into a single value",
        )
        .with_inputs(vec![PortDefinition::new("input_1", DataType::Any)])
        .with_outputs(vec![PortDefinition::new(output.name(), output)])
    };

    vec![
        aggregator("ConvertAny2Tuple", "Convert Any to Tuple", DataType::Tuple),
        aggregator("ConvertAny2List", "Convert Any to List", DataType::List),
        aggregator("ConvertAny2Dict", "Convert Any to Dict", DataType::Dict),
        aggregator("ConvertAny2Set", "Convert Any to Set", DataType::Set),
        NodeMetadata::new("ConvertAny2", "Convert Any", NodeCategory::conversion(), "Passes a value through unchanged")
            .with_inputs(vec![PortDefinition::new("value", DataType::Any)])
            .with_outputs(vec![PortDefinition::new("value", DataType::Any)]),
        NodeMetadata::new("Float", "Float", NodeCategory::data(), "Constant floating point value")
            .with_outputs(vec![PortDefinition::new("value", DataType::Float)]),
        NodeMetadata::new("Int", "Int", NodeCategory::data(), "Constant integer value")
            .with_outputs(vec![PortDefinition::new("value", DataType::Int)]),
        NodeMetadata::new("String", "String", NodeCategory::data(), "Constant text value")
            .with_outputs(vec![PortDefinition::new("value", DataType::String)]),
        NodeMetadata::new("Preview", "Preview", NodeCategory::data(), "Shows any value")
            .with_inputs(vec![PortDefinition::new("value", DataType::Any)]),
    ]
}
