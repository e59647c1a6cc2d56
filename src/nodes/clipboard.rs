//! Copy and paste of node selections

use super::events::OperationContext;
use super::graph::NodeGraph;
use super::node::NodeId;
use super::registry::NodeRegistry;
use super::snapshot::{Placement, SavedGraph};
use crate::error::GraphError;
use egui::Vec2;
use log::info;
use serde::{Deserialize, Serialize};

/// Copied nodes together with the links running between them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    pub contents: SavedGraph,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.contents.nodes.is_empty()
    }
}

impl NodeGraph {
    /// Copy the selected nodes. Links to nodes outside the selection are dropped.
    pub fn copy_to_clipboard(&self, node_ids: &[NodeId]) -> Clipboard {
        Clipboard {
            contents: self.snapshot_of(node_ids),
        }
    }

    /// Paste clipboard contents as new nodes shifted by `offset`. Links are
    /// restored with [`OperationContext::ClipboardPaste`]. Returns the new
    /// node ids in clipboard order.
    pub fn paste_from_clipboard(
        &mut self,
        clipboard: &Clipboard,
        registry: &NodeRegistry,
        offset: Vec2,
    ) -> Result<Vec<NodeId>, GraphError> {
        if clipboard.is_empty() {
            return Err(GraphError::EmptySelection);
        }
        let id_map = self.restore(
            &clipboard.contents,
            registry,
            Placement::Offset(offset),
            OperationContext::ClipboardPaste,
        )?;
        info!("Pasted {} nodes", id_map.len());
        Ok(clipboard
            .contents
            .nodes
            .iter()
            .filter_map(|node| id_map.get(&node.id).copied())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Pos2;

    #[test]
    fn test_paste_remaps_ids_and_links() {
        let registry = NodeRegistry::with_builtin_classes();
        let mut graph = NodeGraph::new();
        let source = registry.create_node("Int", Pos2::ZERO, &mut graph).unwrap();
        let preview = registry.create_node("Preview", Pos2::new(50.0, 0.0), &mut graph).unwrap();
        graph.connect(source, 0, preview, 0, OperationContext::DirectEdit).unwrap();

        let clipboard = graph.copy_to_clipboard(&[source, preview]);
        let pasted = graph
            .paste_from_clipboard(&clipboard, &registry, Vec2::new(0.0, 100.0))
            .unwrap();

        assert_eq!(pasted.len(), 2);
        assert!(pasted.iter().all(|id| *id != source && *id != preview));
        assert_eq!(graph.nodes[&pasted[1]].position, Pos2::new(50.0, 100.0));
        assert_eq!(graph.input_link(pasted[1], 0).map(|l| l.origin_node), Some(pasted[0]));
        assert_eq!(graph.links.len(), 2);
    }

    #[test]
    fn test_empty_clipboard() {
        let registry = NodeRegistry::with_builtin_classes();
        let mut graph = NodeGraph::new();
        let clipboard = graph.copy_to_clipboard(&[12]);
        assert!(clipboard.is_empty());
        assert!(matches!(
            graph.paste_from_clipboard(&clipboard, &registry, Vec2::ZERO),
            Err(GraphError::EmptySelection)
        ));
    }
}
