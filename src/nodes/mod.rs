//! Node system - graph, nodes, ports, lifecycle hooks and the class registry

// Core node system modules
pub mod events;
pub mod graph;
pub mod hooks;
pub mod node;
pub mod port;
pub mod registry;

// Structural operations built on top of the graph
pub mod clipboard;
pub mod snapshot;
pub mod subgraph;

// Re-export core types
pub use graph::{Link, NodeGraph};
pub use node::{Node, NodeId, NodeType, PortMapping};
pub use port::{DataType, LinkId, Port, PortId, PortType};

// Re-export notification and hook types
pub use events::{ConnectionEvent, InputRemoved, NodeCreated, OperationContext, SlotInfo};
pub use hooks::{chain_callback, ClassHooks, HookChain, NodeHooks};

// Re-export registry types
pub use registry::{Extension, NodeCategory, NodeClass, NodeMetadata, NodeRegistry, PortDefinition};

pub use clipboard::Clipboard;
pub use snapshot::{SavedGraph, SavedNode, SavedSlot};
