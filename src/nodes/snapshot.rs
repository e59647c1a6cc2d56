//! Serializable view of a graph, shared by save files and the clipboard

use super::events::OperationContext;
use super::graph::{Link, NodeGraph};
use super::node::{Node, NodeId};
use super::port::{DataType, Port};
use super::registry::{NodeMetadata, NodeRegistry};
use crate::error::GraphError;
use egui::{Pos2, Vec2};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Nodes and the links between them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedGraph {
    pub nodes: Vec<SavedNode>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedNode {
    pub id: NodeId,
    pub class_type: String,
    #[serde(with = "pos2_serde")]
    pub position: Pos2,
    /// Input layout at save time; variadic nodes may have grown past their
    /// class defaults
    pub inputs: Vec<SavedSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSlot {
    pub name: String,
    pub data_type: DataType,
}

impl From<&Node> for SavedNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            class_type: node.class_type.clone(),
            position: node.position,
            inputs: node
                .inputs
                .iter()
                .map(|input| SavedSlot {
                    name: input.name.clone(),
                    data_type: input.data_type.clone(),
                })
                .collect(),
        }
    }
}

/// Where restored nodes end up
#[derive(Debug, Clone, Copy)]
pub(crate) enum Placement {
    /// Same ids and positions as saved
    Preserve,
    /// Fresh ids, positions shifted
    Offset(Vec2),
}

impl NodeGraph {
    /// Snapshot of every regular node and the links between them
    pub fn snapshot(&self) -> SavedGraph {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        self.snapshot_of(&ids)
    }

    /// Snapshot of the given nodes and the links running between them.
    /// Subgraph nodes are not serializable and are skipped.
    pub fn snapshot_of(&self, node_ids: &[NodeId]) -> SavedGraph {
        let mut ids = node_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let nodes: Vec<SavedNode> = ids
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|node| {
                if node.is_context() {
                    warn!("Skipping subgraph node {} in snapshot", node.id);
                }
                !node.is_context()
            })
            .map(SavedNode::from)
            .collect();

        let kept: HashSet<NodeId> = nodes.iter().map(|node| node.id).collect();
        let links = self
            .links
            .values()
            .filter(|link| kept.contains(&link.origin_node) && kept.contains(&link.target_node))
            .copied()
            .collect();

        SavedGraph { nodes, links }
    }

    /// Replace the graph's contents with saved graph data. Restored links are
    /// reported to their nodes with [`OperationContext::Deserialize`].
    /// On error the graph is left as it was.
    pub fn configure_from(&mut self, saved: &SavedGraph, registry: &NodeRegistry) -> Result<(), GraphError> {
        let mut loaded = NodeGraph::new();
        loaded.restore(saved, registry, Placement::Preserve, OperationContext::Deserialize)?;
        *self = loaded;
        debug!("Loaded {} nodes and {} links", saved.nodes.len(), saved.links.len());
        Ok(())
    }

    /// Recreate `saved` through the registry so class hooks run, then restore
    /// each node's input layout and relink. Returns saved id -> new id.
    pub(crate) fn restore(
        &mut self,
        saved: &SavedGraph,
        registry: &NodeRegistry,
        placement: Placement,
        context: OperationContext,
    ) -> Result<HashMap<NodeId, NodeId>, GraphError> {
        validate(saved, registry)?;

        let mut id_map = HashMap::new();
        for saved_node in &saved.nodes {
            let node_id = match placement {
                Placement::Preserve => registry.create_node_with_id(
                    &saved_node.class_type,
                    saved_node.id,
                    saved_node.position,
                    self,
                )?,
                Placement::Offset(offset) => {
                    registry.create_node(&saved_node.class_type, saved_node.position + offset, self)?
                }
            };
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.inputs = saved_node
                    .inputs
                    .iter()
                    .map(|slot| Port::input(slot.name.clone(), slot.data_type.clone()))
                    .collect();
            }
            id_map.insert(saved_node.id, node_id);
        }

        let mut links = saved.links.clone();
        links.sort_by_key(|link| link.id);
        for link in links {
            let (Some(&origin), Some(&target)) = (id_map.get(&link.origin_node), id_map.get(&link.target_node)) else {
                return Err(GraphError::DanglingLink(link.id));
            };
            self.connect(origin, link.origin_slot, target, link.target_slot, context.clone())?;
        }

        Ok(id_map)
    }
}

/// Checks everything `restore` relies on before any node is created: known
/// classes, links between saved nodes, slot indices within range, compatible
/// types and at most one link per input.
fn validate(saved: &SavedGraph, registry: &NodeRegistry) -> Result<(), GraphError> {
    let mut nodes: HashMap<NodeId, (&SavedNode, &NodeMetadata)> = HashMap::new();
    for node in &saved.nodes {
        let metadata = registry
            .metadata(&node.class_type)
            .ok_or_else(|| GraphError::UnknownClass(node.class_type.clone()))?;
        nodes.insert(node.id, (node, metadata));
    }

    let mut occupied = HashSet::new();
    for link in &saved.links {
        let (Some((_, origin)), Some((target, _))) = (nodes.get(&link.origin_node), nodes.get(&link.target_node)) else {
            return Err(GraphError::DanglingLink(link.id));
        };
        let (Some(output), Some(input)) = (origin.outputs.get(link.origin_slot), target.inputs.get(link.target_slot))
        else {
            return Err(GraphError::InvalidLink(link.id));
        };
        if link.origin_node == link.target_node
            || !output.data_type.can_connect_to(&input.data_type)
            || !occupied.insert((link.target_node, link.target_slot))
        {
            return Err(GraphError::InvalidLink(link.id));
        }
    }
    Ok(())
}

// Serde helper module for Pos2
mod pos2_serde {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(pos: &Pos2, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [pos.x, pos.y].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pos2, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Pos2::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_graph(registry: &NodeRegistry) -> (NodeGraph, NodeId, NodeId) {
        let mut graph = NodeGraph::new();
        let source = registry.create_node("Float", Pos2::new(0.0, 0.0), &mut graph).unwrap();
        let preview = registry.create_node("Preview", Pos2::new(100.0, 0.0), &mut graph).unwrap();
        graph.connect(source, 0, preview, 0, OperationContext::DirectEdit).unwrap();
        (graph, source, preview)
    }

    #[test]
    fn test_snapshot_json_shape() {
        let registry = NodeRegistry::with_builtin_classes();
        let (graph, _, _) = two_node_graph(&registry);
        let saved = graph.snapshot();
        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(json["nodes"][1]["position"], serde_json::json!([100.0, 0.0]));
        assert_eq!(json["links"][0]["target_slot"], 0);
        let back: SavedGraph = serde_json::from_value(json).unwrap();
        assert_eq!(back, saved);
    }

    #[test]
    fn test_snapshot_of_drops_outside_links() {
        let registry = NodeRegistry::with_builtin_classes();
        let (graph, _, preview) = two_node_graph(&registry);
        let saved = graph.snapshot_of(&[preview, preview]);
        assert_eq!(saved.nodes.len(), 1);
        assert!(saved.links.is_empty());
    }

    #[test]
    fn test_configure_from_replaces_contents() {
        let registry = NodeRegistry::with_builtin_classes();
        let (original, source, preview) = two_node_graph(&registry);
        let saved = original.snapshot();

        let mut graph = NodeGraph::new();
        registry.create_node("String", Pos2::ZERO, &mut graph).unwrap();
        graph.configure_from(&saved, &registry).unwrap();

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[&source].class_type, "Float");
        assert_eq!(graph.input_link(preview, 0).map(|l| l.origin_node), Some(source));
    }

    #[test]
    fn test_dangling_link_is_rejected() {
        let registry = NodeRegistry::with_builtin_classes();
        let (graph, source, _) = two_node_graph(&registry);
        let mut saved = graph.snapshot_of(&[source]);
        saved.links = graph.links.values().copied().collect();

        let mut target = NodeGraph::new();
        assert!(matches!(
            target.configure_from(&saved, &registry),
            Err(GraphError::DanglingLink(_))
        ));
    }

    #[test]
    fn test_bad_link_slots_leave_graph_untouched() {
        let registry = NodeRegistry::with_builtin_classes();
        let (mut graph, source, preview) = two_node_graph(&registry);
        let good = graph.snapshot();

        let mut past_inputs = good.clone();
        past_inputs.links[0].target_slot = 4;
        let mut past_outputs = good.clone();
        past_outputs.links[0].origin_slot = 1;
        let mut doubled = good.clone();
        let mut second = doubled.links[0];
        second.id = 7;
        doubled.links.push(second);

        for bad in [past_inputs, past_outputs, doubled] {
            assert!(matches!(
                graph.configure_from(&bad, &registry),
                Err(GraphError::InvalidLink(_))
            ));
            assert_eq!(graph.nodes.len(), 2);
            assert_eq!(graph.input_link(preview, 0).map(|l| l.origin_node), Some(source));
        }
    }

    #[test]
    fn test_unknown_class_is_rejected_before_mutation() {
        let registry = NodeRegistry::with_builtin_classes();
        let saved = SavedGraph {
            nodes: vec![SavedNode {
                id: 0,
                class_type: "Missing".into(),
                position: Pos2::ZERO,
                inputs: vec![],
            }],
            links: vec![],
        };
        let mut graph = NodeGraph::new();
        assert!(matches!(
            graph.restore(&saved, &registry, Placement::Offset(Vec2::ZERO), OperationContext::ClipboardPaste),
            Err(GraphError::UnknownClass(_))
        ));
        assert!(graph.nodes.is_empty());
    }
}
