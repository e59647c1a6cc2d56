//! Notifications the graph delivers to node hooks

use super::graph::Link;
use super::node::NodeId;
use super::port::{DataType, Port, PortId, PortType};
use serde::{Deserialize, Serialize};

/// The operation a connection change originates from.
///
/// Every notification carries one so that subscribers can tell a user editing
/// links apart from the graph shuffling links around on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationContext {
    /// The user connected or removed a link by hand
    DirectEdit,
    /// Graph data is being loaded
    Deserialize,
    /// A selection is being moved into a subgraph
    SubgraphConvert,
    /// Nodes are being pasted from the clipboard
    ClipboardPaste,
    /// An occupied input is being disconnected so a new link can take its place
    ProgrammaticReconnect,
    /// A slot is being removed and its link severed with it
    SlotRemoval,
    /// A previous graph state is being restored
    UndoRedo,
    /// Anything the host cannot name more precisely
    Other(String),
}

impl OperationContext {
    pub fn name(&self) -> &str {
        match self {
            OperationContext::DirectEdit => "direct_edit",
            OperationContext::Deserialize => "deserialize",
            OperationContext::SubgraphConvert => "subgraph_convert",
            OperationContext::ClipboardPaste => "clipboard_paste",
            OperationContext::ProgrammaticReconnect => "programmatic_reconnect",
            OperationContext::SlotRemoval => "slot_removal",
            OperationContext::UndoRedo => "undo_redo",
            OperationContext::Other(name) => name,
        }
    }
}

/// Snapshot of the slot a notification is about
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub name: String,
    pub data_type: DataType,
}

impl From<&Port> for SlotInfo {
    fn from(port: &Port) -> Self {
        Self {
            name: port.name.clone(),
            data_type: port.data_type.clone(),
        }
    }
}

/// A link on one of the node's slots was created or removed
#[derive(Debug, Clone)]
pub struct ConnectionEvent {
    /// Node receiving the notification
    pub node_id: NodeId,
    pub direction: PortType,
    pub slot: PortId,
    /// `true` when the link was just made, `false` when it was just removed
    pub connected: bool,
    pub link: Option<Link>,
    pub slot_info: Option<SlotInfo>,
    pub context: OperationContext,
}

impl ConnectionEvent {
    pub fn is_input(&self) -> bool {
        matches!(self.direction, PortType::Input)
    }

    pub fn is_disconnect(&self) -> bool {
        !self.connected
    }
}

/// A node was constructed and inserted into a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeCreated {
    pub node_id: NodeId,
}

/// An input slot was spliced out of a node
#[derive(Debug, Clone)]
pub struct InputRemoved {
    pub node_id: NodeId,
    pub slot: PortId,
    pub removed: SlotInfo,
}
