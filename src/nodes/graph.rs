//! Node graph data structures and operations
//!
//! The graph owns nodes, links and the hook chains of every node. Each link
//! created or removed is reported to the hooks of both endpoints, tagged with
//! the [`OperationContext`] of the operation that caused it. Notifications are
//! delivered synchronously: a subscriber that mutates the graph from inside a
//! notification sees its own nested notifications complete before control
//! returns to it.

use super::events::{ConnectionEvent, InputRemoved, OperationContext, SlotInfo};
use super::hooks::NodeHooks;
use super::node::{Node, NodeId};
use super::port::{DataType, LinkId, Port, PortId, PortType};
use crate::error::GraphError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A connection from an output slot of one node to an input slot of another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub origin_node: NodeId,
    pub origin_slot: PortId,
    pub target_node: NodeId,
    pub target_slot: PortId,
}

impl Link {
    /// Whether either end of the link sits on `node_id`
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.origin_node == node_id || self.target_node == node_id
    }
}

/// A graph containing nodes and their links
#[derive(Debug, Clone)]
pub struct NodeGraph {
    pub nodes: HashMap<NodeId, Node>,
    pub links: BTreeMap<LinkId, Link>,
    hooks: HashMap<NodeId, NodeHooks>,
    next_node_id: NodeId,
    next_link_id: LinkId,
}

impl NodeGraph {
    /// Creates a new empty node graph
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            links: BTreeMap::new(),
            hooks: HashMap::new(),
            next_node_id: 0,
            next_link_id: 0,
        }
    }

    /// Adds a node to the graph and returns its ID
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = self.next_node_id;
        self.add_node_with_id(id, node)
    }

    /// Adds a node to the graph with a specific ID
    pub fn add_node_with_id(&mut self, id: NodeId, mut node: Node) -> NodeId {
        node.id = id;
        self.nodes.insert(id, node);
        self.hooks.entry(id).or_default();
        if id >= self.next_node_id {
            self.next_node_id = id + 1;
        }
        id
    }

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    pub fn hooks(&self, node_id: NodeId) -> Option<&NodeHooks> {
        self.hooks.get(&node_id)
    }

    /// Hook chains of a node, `None` if the node is not in this graph
    pub fn hooks_mut(&mut self, node_id: NodeId) -> Option<&mut NodeHooks> {
        self.hooks.get_mut(&node_id)
    }

    /// Removes a node after severing every link touching it
    pub fn remove_node(&mut self, node_id: NodeId, context: OperationContext) -> Option<Node> {
        if !self.nodes.contains_key(&node_id) {
            return None;
        }
        self.hooks.remove(&node_id);

        let touching: Vec<LinkId> = self
            .links
            .values()
            .filter(|link| link.touches(node_id))
            .map(|link| link.id)
            .collect();
        for link_id in touching {
            self.disconnect_link(link_id, context.clone());
        }

        self.nodes.remove(&node_id)
    }

    /// Appends an input slot and returns its index
    pub fn add_input(
        &mut self,
        node_id: NodeId,
        name: impl Into<String>,
        data_type: DataType,
    ) -> Result<PortId, GraphError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.add_input(name, data_type);
        node.set_dirty_canvas();
        Ok(node.inputs.len() - 1)
    }

    /// Removes an input slot. A link on the slot is severed first, reported
    /// with [`OperationContext::SlotRemoval`]; links on later slots shift down.
    pub fn remove_input(&mut self, node_id: NodeId, slot: PortId) -> Result<(), GraphError> {
        let before = self.input_port(node_id, slot)?;
        let connected = before.is_connected();
        let slot_count = self.input_count(node_id);

        if connected {
            self.disconnect_input(node_id, slot, OperationContext::SlotRemoval);
        }

        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        if node.inputs.len() < slot_count {
            debug!("Input {} of node {} was removed while it was being disconnected", slot, node_id);
            return Ok(());
        }
        let removed = node.inputs.remove(slot);
        node.set_dirty_canvas();

        for link in self.links.values_mut() {
            if link.target_node == node_id && link.target_slot > slot {
                link.target_slot -= 1;
            }
        }

        let event = InputRemoved {
            node_id,
            slot,
            removed: SlotInfo::from(&removed),
        };
        if let Some(chain) = self.hooks.get(&node_id).map(|hooks| hooks.input_removed.clone()) {
            chain.invoke(self, &event);
        }
        Ok(())
    }

    /// Links an output slot to an input slot.
    ///
    /// An input holds a single link, so an occupied target is disconnected
    /// first with [`OperationContext::ProgrammaticReconnect`]. If handlers of
    /// that disconnect reshape the target node, nothing is linked and
    /// [`GraphError::TargetChanged`] is returned. Both endpoints are notified
    /// afterwards, the origin first.
    pub fn connect(
        &mut self,
        origin_node: NodeId,
        origin_slot: PortId,
        target_node: NodeId,
        target_slot: PortId,
        context: OperationContext,
    ) -> Result<LinkId, GraphError> {
        if origin_node == target_node {
            return Err(GraphError::SelfConnection(origin_node));
        }

        self.check_link(origin_node, origin_slot, target_node, target_slot)?;

        if self.input_link(target_node, target_slot).is_some() {
            let slot_count = self.input_count(target_node);
            self.disconnect_input(target_node, target_slot, OperationContext::ProgrammaticReconnect);

            // Handlers of the disconnect may have reshaped the target
            self.check_link(origin_node, origin_slot, target_node, target_slot)?;
            if self.input_count(target_node) != slot_count || self.input_link(target_node, target_slot).is_some() {
                warn!(
                    "Input {} of node {} changed while its previous link was removed",
                    target_slot, target_node
                );
                return Err(GraphError::TargetChanged {
                    node: target_node,
                    slot: target_slot,
                });
            }
        }

        let link = Link {
            id: self.next_link_id,
            origin_node,
            origin_slot,
            target_node,
            target_slot,
        };
        let target_info = {
            let input = self.input_port_mut(target_node, target_slot)?;
            input.link = Some(link.id);
            SlotInfo::from(&*input)
        };
        self.next_link_id += 1;
        self.links.insert(link.id, link);
        debug!(
            "Linked node {} output {} -> node {} input {} ({})",
            origin_node,
            origin_slot,
            target_node,
            target_slot,
            context.name()
        );

        let origin_info = self.output_port(origin_node, origin_slot).ok().map(SlotInfo::from);
        self.notify(ConnectionEvent {
            node_id: origin_node,
            direction: PortType::Output,
            slot: origin_slot,
            connected: true,
            link: Some(link),
            slot_info: origin_info,
            context: context.clone(),
        });
        self.notify(ConnectionEvent {
            node_id: target_node,
            direction: PortType::Input,
            slot: target_slot,
            connected: true,
            link: Some(link),
            slot_info: Some(target_info),
            context,
        });

        Ok(link.id)
    }

    /// Removes the link feeding an input slot and notifies both endpoints,
    /// the input side first. Returns the removed link.
    pub fn disconnect_input(
        &mut self,
        node_id: NodeId,
        slot: PortId,
        context: OperationContext,
    ) -> Option<Link> {
        let link_id = self.nodes.get(&node_id)?.inputs.get(slot)?.link?;
        let Some(link) = self.links.remove(&link_id) else {
            warn!("Input {} of node {} referenced missing link {}", slot, node_id, link_id);
            return None;
        };
        let input = self.input_port_mut(node_id, slot).ok()?;
        input.link = None;
        let target_info = SlotInfo::from(&*input);
        debug!(
            "Unlinked node {} output {} -> node {} input {} ({})",
            link.origin_node,
            link.origin_slot,
            node_id,
            slot,
            context.name()
        );

        self.notify(ConnectionEvent {
            node_id,
            direction: PortType::Input,
            slot,
            connected: false,
            link: Some(link),
            slot_info: Some(target_info),
            context: context.clone(),
        });

        let origin_info = self
            .output_port(link.origin_node, link.origin_slot)
            .ok()
            .map(SlotInfo::from);
        self.notify(ConnectionEvent {
            node_id: link.origin_node,
            direction: PortType::Output,
            slot: link.origin_slot,
            connected: false,
            link: Some(link),
            slot_info: origin_info,
            context,
        });

        Some(link)
    }

    /// Removes a link by id, wherever it currently points
    pub fn disconnect_link(&mut self, link_id: LinkId, context: OperationContext) -> Option<Link> {
        let link = *self.links.get(&link_id)?;
        self.disconnect_input(link.target_node, link.target_slot, context)
    }

    /// The link currently feeding an input slot
    pub fn input_link(&self, node_id: NodeId, slot: PortId) -> Option<&Link> {
        let link_id = self.nodes.get(&node_id)?.inputs.get(slot)?.link?;
        self.links.get(&link_id)
    }

    /// Links leaving any output of `node_id`
    pub fn links_from(&self, node_id: NodeId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |link| link.origin_node == node_id)
    }

    /// Requests a redraw of the node. Returns `false` if it does not exist.
    pub fn set_dirty_canvas(&mut self, node_id: NodeId) -> bool {
        match self.nodes.get_mut(&node_id) {
            Some(node) => {
                node.set_dirty_canvas();
                true
            }
            None => false,
        }
    }

    /// Returns and clears the node's pending redraw request
    pub fn take_dirty(&mut self, node_id: NodeId) -> bool {
        self.nodes.get_mut(&node_id).is_some_and(Node::take_dirty)
    }

    /// Drops every node, link and hook
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Detaches a node together with its hooks, leaving links untouched
    pub(crate) fn take_node(&mut self, node_id: NodeId) -> Option<(Node, NodeHooks)> {
        let node = self.nodes.remove(&node_id)?;
        let hooks = self.hooks.remove(&node_id).unwrap_or_default();
        Some((node, hooks))
    }

    /// Inserts a detached node under its existing id
    pub(crate) fn insert_node(&mut self, node: Node, hooks: NodeHooks) {
        let id = node.id;
        self.add_node_with_id(id, node);
        self.hooks.insert(id, hooks);
    }

    pub(crate) fn take_link(&mut self, link_id: LinkId) -> Option<Link> {
        self.links.remove(&link_id)
    }

    /// Inserts a link under its existing id without notifying anyone
    pub(crate) fn insert_link(&mut self, link: Link) {
        if link.id >= self.next_link_id {
            self.next_link_id = link.id + 1;
        }
        self.links.insert(link.id, link);
    }

    /// Number of input slots on a node, zero if it does not exist
    pub(crate) fn input_count(&self, node_id: NodeId) -> usize {
        self.nodes.get(&node_id).map_or(0, |node| node.inputs.len())
    }

    /// Both endpoints exist and their types are compatible
    fn check_link(
        &self,
        origin_node: NodeId,
        origin_slot: PortId,
        target_node: NodeId,
        target_slot: PortId,
    ) -> Result<(), GraphError> {
        let origin_type = &self.output_port(origin_node, origin_slot)?.data_type;
        let target_type = &self.input_port(target_node, target_slot)?.data_type;
        if !origin_type.can_connect_to(target_type) {
            return Err(GraphError::TypeMismatch {
                from: origin_type.clone(),
                to: target_type.clone(),
            });
        }
        Ok(())
    }

    fn notify(&mut self, event: ConnectionEvent) {
        let Some(chain) = self
            .hooks
            .get(&event.node_id)
            .map(|hooks| hooks.connections_change.clone())
        else {
            return;
        };
        chain.invoke(self, &event);
    }

    fn input_port(&self, node_id: NodeId, slot: PortId) -> Result<&Port, GraphError> {
        let node = self.nodes.get(&node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        node.inputs.get(slot).ok_or(GraphError::SlotOutOfRange {
            node: node_id,
            direction: PortType::Input,
            slot,
        })
    }

    fn input_port_mut(&mut self, node_id: NodeId, slot: PortId) -> Result<&mut Port, GraphError> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.inputs.get_mut(slot).ok_or(GraphError::SlotOutOfRange {
            node: node_id,
            direction: PortType::Input,
            slot,
        })
    }

    fn output_port(&self, node_id: NodeId, slot: PortId) -> Result<&Port, GraphError> {
        let node = self.nodes.get(&node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        node.outputs.get(slot).ok_or(GraphError::SlotOutOfRange {
            node: node_id,
            direction: PortType::Output,
            slot,
        })
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;
    use std::sync::{Arc, Mutex};

    fn source(graph: &mut NodeGraph, data_type: DataType) -> NodeId {
        let mut node = Node::new(0, "Source", Pos2::ZERO);
        node.add_output("value", data_type);
        graph.add_node(node)
    }

    fn sink(graph: &mut NodeGraph, inputs: usize) -> NodeId {
        let mut node = Node::new(0, "Sink", Pos2::new(200.0, 0.0));
        for i in 0..inputs {
            node.add_input(format!("in_{}", i), DataType::Any);
        }
        graph.add_node(node)
    }

    type Recorded = Arc<Mutex<Vec<(PortType, bool, OperationContext)>>>;

    fn record(graph: &mut NodeGraph, node_id: NodeId) -> Recorded {
        let seen: Recorded = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::clone(&seen);
        graph
            .hooks_mut(node_id)
            .unwrap()
            .connections_change
            .chain(move |_, event| {
                store
                    .lock()
                    .unwrap()
                    .push((event.direction, event.connected, event.context.clone()));
            });
        seen
    }

    #[test]
    fn test_connect_sets_input_link() {
        let mut graph = NodeGraph::new();
        let a = source(&mut graph, DataType::Float);
        let b = sink(&mut graph, 1);

        let link_id = graph.connect(a, 0, b, 0, OperationContext::DirectEdit).unwrap();
        assert_eq!(graph.nodes[&b].inputs[0].link, Some(link_id));
        assert_eq!(graph.input_link(b, 0).map(|l| l.origin_node), Some(a));
        assert_eq!(graph.links_from(a).count(), 1);
    }

    #[test]
    fn test_connect_validation() {
        let mut graph = NodeGraph::new();
        let a = source(&mut graph, DataType::Float);
        let mut typed = Node::new(0, "Typed", Pos2::ZERO);
        typed.add_input("text", DataType::String);
        let t = graph.add_node(typed);

        assert!(matches!(
            graph.connect(a, 0, a, 0, OperationContext::DirectEdit),
            Err(GraphError::SelfConnection(_))
        ));
        assert!(matches!(
            graph.connect(a, 0, 42, 0, OperationContext::DirectEdit),
            Err(GraphError::NodeNotFound(42))
        ));
        assert!(matches!(
            graph.connect(a, 3, t, 0, OperationContext::DirectEdit),
            Err(GraphError::SlotOutOfRange { direction: PortType::Output, .. })
        ));
        assert!(matches!(
            graph.connect(a, 0, t, 0, OperationContext::DirectEdit),
            Err(GraphError::TypeMismatch { .. })
        ));
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_both_endpoints_are_notified() {
        let mut graph = NodeGraph::new();
        let a = source(&mut graph, DataType::Float);
        let b = sink(&mut graph, 1);
        let origin_events = record(&mut graph, a);
        let target_events = record(&mut graph, b);

        graph.connect(a, 0, b, 0, OperationContext::DirectEdit).unwrap();
        graph.disconnect_input(b, 0, OperationContext::Deserialize).unwrap();

        assert_eq!(
            *origin_events.lock().unwrap(),
            vec![
                (PortType::Output, true, OperationContext::DirectEdit),
                (PortType::Output, false, OperationContext::Deserialize),
            ]
        );
        assert_eq!(
            *target_events.lock().unwrap(),
            vec![
                (PortType::Input, true, OperationContext::DirectEdit),
                (PortType::Input, false, OperationContext::Deserialize),
            ]
        );
    }

    #[test]
    fn test_connecting_occupied_input_reconnects() {
        let mut graph = NodeGraph::new();
        let a = source(&mut graph, DataType::Float);
        let c = source(&mut graph, DataType::Int);
        let b = sink(&mut graph, 1);
        graph.connect(a, 0, b, 0, OperationContext::DirectEdit).unwrap();
        let events = record(&mut graph, b);

        let new_link = graph.connect(c, 0, b, 0, OperationContext::DirectEdit).unwrap();

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.nodes[&b].inputs[0].link, Some(new_link));
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                (PortType::Input, false, OperationContext::ProgrammaticReconnect),
                (PortType::Input, true, OperationContext::DirectEdit),
            ]
        );
    }

    #[test]
    fn test_reconnect_rejects_target_refilled_by_handler() {
        let mut graph = NodeGraph::new();
        let a = source(&mut graph, DataType::Float);
        let c = source(&mut graph, DataType::Float);
        let d = source(&mut graph, DataType::Float);
        let b = sink(&mut graph, 1);
        graph.connect(a, 0, b, 0, OperationContext::DirectEdit).unwrap();
        graph
            .hooks_mut(b)
            .unwrap()
            .connections_change
            .chain(move |graph, event| {
                if !event.connected && event.context == OperationContext::ProgrammaticReconnect {
                    graph.connect(d, 0, event.node_id, event.slot, OperationContext::DirectEdit).unwrap();
                }
            });

        assert!(matches!(
            graph.connect(c, 0, b, 0, OperationContext::DirectEdit),
            Err(GraphError::TargetChanged { slot: 0, .. })
        ));
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.input_link(b, 0).map(|l| l.origin_node), Some(d));
        assert_eq!(graph.links_from(c).count(), 0);
    }

    #[test]
    fn test_dangling_input_reference() {
        let mut graph = NodeGraph::new();
        let a = source(&mut graph, DataType::Float);
        let b = sink(&mut graph, 1);
        graph.nodes.get_mut(&b).unwrap().inputs[0].link = Some(99);
        let events = record(&mut graph, b);

        assert!(graph.disconnect_input(b, 0, OperationContext::DirectEdit).is_none());
        assert_eq!(graph.nodes[&b].inputs[0].link, Some(99));
        assert!(events.lock().unwrap().is_empty());

        let link_id = graph.connect(a, 0, b, 0, OperationContext::DirectEdit).unwrap();
        assert_eq!(graph.nodes[&b].inputs[0].link, Some(link_id));
        assert_eq!(
            *events.lock().unwrap(),
            vec![(PortType::Input, true, OperationContext::DirectEdit)]
        );
    }

    #[test]
    fn test_remove_input_shifts_later_links() {
        let mut graph = NodeGraph::new();
        let a = source(&mut graph, DataType::Float);
        let b = sink(&mut graph, 3);
        graph.connect(a, 0, b, 0, OperationContext::DirectEdit).unwrap();
        let last = graph.connect(a, 0, b, 2, OperationContext::DirectEdit).unwrap();
        let events = record(&mut graph, b);

        graph.remove_input(b, 0).unwrap();

        let node = &graph.nodes[&b];
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.inputs[1].link, Some(last));
        assert_eq!(graph.links[&last].target_slot, 1);
        assert_eq!(
            *events.lock().unwrap(),
            vec![(PortType::Input, false, OperationContext::SlotRemoval)]
        );
        assert!(matches!(graph.remove_input(b, 5), Err(GraphError::SlotOutOfRange { .. })));
    }

    #[test]
    fn test_input_removed_hook_runs_after_splice() {
        let mut graph = NodeGraph::new();
        let b = sink(&mut graph, 2);
        let lengths = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&lengths);
        graph
            .hooks_mut(b)
            .unwrap()
            .input_removed
            .chain(move |graph, removed| {
                let len = graph.nodes[&removed.node_id].inputs.len();
                seen.lock().unwrap().push((removed.removed.name.clone(), len));
            });

        graph.remove_input(b, 1).unwrap();
        assert_eq!(*lengths.lock().unwrap(), vec![("in_1".to_string(), 1)]);
    }

    #[test]
    fn test_remove_node_severs_links() {
        let mut graph = NodeGraph::new();
        let a = source(&mut graph, DataType::Float);
        let b = sink(&mut graph, 1);
        graph.connect(a, 0, b, 0, OperationContext::DirectEdit).unwrap();

        assert!(graph.remove_node(a, OperationContext::DirectEdit).is_some());
        assert!(graph.links.is_empty());
        assert!(!graph.nodes[&b].inputs[0].is_connected());
        assert!(graph.hooks(a).is_none());
        assert!(graph.remove_node(a, OperationContext::DirectEdit).is_none());
    }

    #[test]
    fn test_dirty_requests() {
        let mut graph = NodeGraph::new();
        let b = sink(&mut graph, 0);
        assert!(!graph.take_dirty(b));
        graph.add_input(b, "extra", DataType::Any).unwrap();
        assert!(graph.take_dirty(b));
        assert!(!graph.set_dirty_canvas(99));
    }
}
