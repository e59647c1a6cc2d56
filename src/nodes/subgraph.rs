//! Conversion of a node selection into a subgraph context node
//!
//! Links crossing the selection boundary are cut and rebuilt through the new
//! context node: on the outside they attach to the context node's external
//! ports, on the inside to proxy nodes standing in for those ports. Every cut
//! and relink is reported with [`OperationContext::SubgraphConvert`].

use super::events::OperationContext;
use super::graph::{Link, NodeGraph};
use super::node::{Node, NodeId, PortMapping};
use super::port::{DataType, LinkId, PortId};
use crate::constants::node::{SUBGRAPH_CLASS, SUBGRAPH_INPUT_CLASS, SUBGRAPH_OUTPUT_CLASS};
use crate::error::GraphError;
use egui::{Pos2, Vec2};
use log::{info, warn};
use std::collections::{BTreeSet, HashMap};

impl NodeGraph {
    /// Move the selected nodes into a new context node and return its id.
    ///
    /// If cutting the boundary links reshapes the inputs of a node on the
    /// boundary, the selection stays where it is, with those links cut, and
    /// [`GraphError::TargetChanged`] is returned.
    pub fn convert_to_subgraph(&mut self, node_ids: &[NodeId]) -> Result<NodeId, GraphError> {
        if node_ids.is_empty() {
            return Err(GraphError::EmptySelection);
        }
        let selection: BTreeSet<NodeId> = node_ids.iter().copied().collect();
        if let Some(missing) = selection.iter().find(|id| !self.nodes.contains_key(*id)) {
            return Err(GraphError::NodeNotFound(*missing));
        }
        let context = OperationContext::SubgraphConvert;

        let mut internal = Vec::new();
        let mut inbound = Vec::new();
        let mut outbound = Vec::new();
        for link in self.links.values() {
            match (selection.contains(&link.origin_node), selection.contains(&link.target_node)) {
                (true, true) => internal.push(link.id),
                (false, true) => inbound.push(*link),
                (true, false) => outbound.push(*link),
                (false, false) => {}
            }
        }

        let graph: &NodeGraph = self;
        let inbound_types: Vec<DataType> = inbound
            .iter()
            .map(|link| output_type(graph, link.origin_node, link.origin_slot))
            .collect();
        let outbound_types: Vec<DataType> = outbound
            .iter()
            .map(|link| output_type(graph, link.origin_node, link.origin_slot))
            .collect();
        let position = centroid(graph, &selection);

        let boundary: Vec<Link> = inbound.iter().chain(&outbound).copied().collect();
        let slot_counts: HashMap<NodeId, usize> = boundary
            .iter()
            .map(|link| (link.target_node, self.input_count(link.target_node)))
            .collect();
        for link in &boundary {
            self.disconnect_link(link.id, context.clone());
        }

        // Relinking reuses the saved slot indices, which only hold if the cuts
        // left every target's inputs in place
        for link in &boundary {
            let unchanged = slot_counts.get(&link.target_node) == Some(&self.input_count(link.target_node));
            if !unchanged || self.input_link(link.target_node, link.target_slot).is_some() {
                warn!(
                    "Node {} changed its inputs while being cut from the selection, not converting",
                    link.target_node
                );
                return Err(GraphError::TargetChanged {
                    node: link.target_node,
                    slot: link.target_slot,
                });
            }
        }

        let mut inner = NodeGraph::new();
        for id in &selection {
            if let Some((node, hooks)) = self.take_node(*id) {
                inner.insert_node(node, hooks);
            }
        }
        for link_id in &internal {
            if let Some(link) = self.take_link(*link_id) {
                inner.insert_link(link);
            }
        }

        let (port_mappings, external_inputs, external_outputs) =
            match wire_proxies(&mut inner, &inbound, &inbound_types, &outbound, &outbound_types, position) {
                Ok(wiring) => wiring,
                Err(err) => {
                    self.reabsorb(inner, &selection, &internal);
                    return Err(err);
                }
            };

        let mut subgraph = Node::new_context(0, SUBGRAPH_CLASS, position, inner, port_mappings);
        for (name, data_type) in external_inputs {
            subgraph.add_input(name, data_type);
        }
        for (name, data_type) in external_outputs {
            subgraph.add_output(name, data_type);
        }
        let subgraph_id = self.add_node(subgraph);

        for (k, link) in inbound.iter().enumerate() {
            self.connect(link.origin_node, link.origin_slot, subgraph_id, k, context.clone())?;
        }
        for (k, link) in outbound.iter().enumerate() {
            self.connect(subgraph_id, k, link.target_node, link.target_slot, context.clone())?;
        }

        info!(
            "Converted {} nodes into subgraph {} ({} inputs, {} outputs)",
            selection.len(),
            subgraph_id,
            inbound.len(),
            outbound.len()
        );
        Ok(subgraph_id)
    }

    /// Moves the selection back out of a half-built inner graph. Links to the
    /// proxy nodes are dropped with them.
    fn reabsorb(&mut self, mut inner: NodeGraph, selection: &BTreeSet<NodeId>, internal: &[LinkId]) {
        for link_id in internal {
            if let Some(link) = inner.take_link(*link_id) {
                self.insert_link(link);
            }
        }
        for id in selection {
            if let Some((mut node, hooks)) = inner.take_node(*id) {
                for input in &mut node.inputs {
                    if input.link.is_some_and(|link_id| !internal.contains(&link_id)) {
                        input.link = None;
                    }
                }
                self.insert_node(node, hooks);
            }
        }
    }
}

type Wiring = (Vec<PortMapping>, Vec<(String, DataType)>, Vec<(String, DataType)>);

/// Adds the proxy nodes to `inner` and links them to the moved nodes
fn wire_proxies(
    inner: &mut NodeGraph,
    inbound: &[Link],
    inbound_types: &[DataType],
    outbound: &[Link],
    outbound_types: &[DataType],
    position: Pos2,
) -> Result<Wiring, GraphError> {
    let context = OperationContext::SubgraphConvert;
    let mut port_mappings = Vec::new();
    let mut external_inputs = Vec::new();
    if !inbound.is_empty() {
        let mut proxy = Node::new(0, SUBGRAPH_INPUT_CLASS, position - Vec2::new(0.0, 100.0));
        for (k, data_type) in inbound_types.iter().enumerate() {
            proxy.add_output(external_name("in", k), data_type.clone());
        }
        let proxy_id = inner.add_node(proxy);
        for (k, link) in inbound.iter().enumerate() {
            inner.connect(proxy_id, k, link.target_node, link.target_slot, context.clone())?;
            port_mappings.push(PortMapping {
                external_port: external_name("in", k),
                internal_node_id: link.target_node,
                internal_port: input_name(inner, link.target_node, link.target_slot),
                is_input: true,
            });
            external_inputs.push((external_name("in", k), inbound_types[k].clone()));
        }
    }

    let mut external_outputs = Vec::new();
    if !outbound.is_empty() {
        let mut proxy = Node::new(0, SUBGRAPH_OUTPUT_CLASS, position + Vec2::new(0.0, 100.0));
        for (k, data_type) in outbound_types.iter().enumerate() {
            proxy.add_input(external_name("out", k), data_type.clone());
        }
        let proxy_id = inner.add_node(proxy);
        for (k, link) in outbound.iter().enumerate() {
            inner.connect(link.origin_node, link.origin_slot, proxy_id, k, context.clone())?;
            port_mappings.push(PortMapping {
                external_port: external_name("out", k),
                internal_node_id: link.origin_node,
                internal_port: output_name(inner, link.origin_node, link.origin_slot),
                is_input: false,
            });
            external_outputs.push((external_name("out", k), outbound_types[k].clone()));
        }
    }

    Ok((port_mappings, external_inputs, external_outputs))
}

fn external_name(prefix: &str, index: usize) -> String {
    format!("{}_{}", prefix, index + 1)
}

fn output_type(graph: &NodeGraph, node_id: NodeId, slot: PortId) -> DataType {
    graph
        .node(node_id)
        .and_then(|node| node.output(slot))
        .map_or(DataType::Any, |port| port.data_type.clone())
}

fn input_name(graph: &NodeGraph, node_id: NodeId, slot: PortId) -> String {
    graph
        .node(node_id)
        .and_then(|node| node.input(slot))
        .map_or_else(String::new, |port| port.name.clone())
}

fn output_name(graph: &NodeGraph, node_id: NodeId, slot: PortId) -> String {
    graph
        .node(node_id)
        .and_then(|node| node.output(slot))
        .map_or_else(String::new, |port| port.name.clone())
}

fn centroid(graph: &NodeGraph, selection: &BTreeSet<NodeId>) -> Pos2 {
    let positions: Vec<Pos2> = selection
        .iter()
        .filter_map(|id| graph.node(*id))
        .map(|node| node.position)
        .collect();
    if positions.is_empty() {
        return Pos2::ZERO;
    }
    let sum = positions.iter().fold(Vec2::ZERO, |acc, pos| acc + pos.to_vec2());
    (sum / positions.len() as f32).to_pos2()
}
