//! Keeps an aggregator node's variadic inputs consistent as links come and go.
//!
//! For every input notification the coordinator deletes the slot if the
//! disconnect was user-initiated, renumbers the remaining slots and makes sure
//! a single open slot trails the list. Slot state is always re-read from the
//! graph after a deletion, because deleting can trigger nested notifications
//! that reshape the node before control comes back here.

use super::classifier::ProvenanceClassifier;
use super::slots::{grow_inputs, renumber_inputs};
use crate::config::ListishConfig;
use crate::nodes::{ConnectionEvent, InputRemoved, NodeGraph, NodeId};
use log::debug;

#[derive(Debug, Clone)]
pub struct ConnectionCoordinator {
    classifier: ProvenanceClassifier,
    slot_prefix: String,
}

impl ConnectionCoordinator {
    pub fn new(classifier: ProvenanceClassifier, slot_prefix: impl Into<String>) -> Self {
        Self {
            classifier,
            slot_prefix: slot_prefix.into(),
        }
    }

    pub fn from_config(config: &ListishConfig) -> Self {
        Self::new(config.classifier(), config.slot_prefix.clone())
    }

    pub fn classifier(&self) -> &ProvenanceClassifier {
        &self.classifier
    }

    pub fn slot_prefix(&self) -> &str {
        &self.slot_prefix
    }

    /// Handler for the node's connections-change hook
    pub fn on_connections_change(&self, graph: &mut NodeGraph, event: &ConnectionEvent) {
        if !event.is_input() || event.link.is_none() {
            return;
        }

        if event.is_disconnect() && self.classifier.is_user_initiated_removal(event) {
            debug!("Removing input {} of node {}", event.slot, event.node_id);
            if let Err(err) = graph.remove_input(event.node_id, event.slot) {
                debug!("Input {} of node {} already gone: {}", event.slot, event.node_id, err);
            }
        }

        self.settle(graph, event.node_id);
    }

    /// Handler for the node's input-removed hook
    pub fn on_input_removed(&self, graph: &mut NodeGraph, removed: &InputRemoved) {
        self.settle(graph, removed.node_id);
    }

    fn settle(&self, graph: &mut NodeGraph, node_id: NodeId) {
        let Some(node) = graph.node_mut(node_id) else {
            debug!("Node {} left the graph before its inputs could be settled", node_id);
            return;
        };
        renumber_inputs(&mut node.inputs, &self.slot_prefix);
        if grow_inputs(node, &self.slot_prefix) {
            debug!("Node {} grew to {} inputs", node_id, node.inputs.len());
        }
        node.set_dirty_canvas();
    }
}

impl Default for ConnectionCoordinator {
    fn default() -> Self {
        Self::from_config(&ListishConfig::default())
    }
}
