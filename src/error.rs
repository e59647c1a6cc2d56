//! Error types for graph operations and configuration loading

use crate::nodes::port::{DataType, LinkId, PortId, PortType};
use crate::nodes::NodeId;
use thiserror::Error;

/// Errors raised by host graph operations
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("node {node} has no {direction:?} slot {slot}")]
    SlotOutOfRange {
        node: NodeId,
        direction: PortType,
        slot: PortId,
    },

    #[error("cannot connect node {0} to itself")]
    SelfConnection(NodeId),

    #[error("cannot connect a {} output to a {} input", .from.name(), .to.name())]
    TypeMismatch { from: DataType, to: DataType },

    #[error("input {slot} of node {node} changed while its previous link was being removed")]
    TargetChanged { node: NodeId, slot: PortId },

    #[error("unknown node class `{0}`")]
    UnknownClass(String),

    #[error("link {0} refers to a node outside the saved data")]
    DanglingLink(LinkId),

    #[error("link {0} does not fit the slots of the saved nodes")]
    InvalidLink(LinkId),

    #[error("selection is empty")]
    EmptySelection,

    #[error("failed to access graph file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse graph file: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors raised while loading a [`crate::config::ListishConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid class pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
