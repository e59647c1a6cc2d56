//! File management for node graphs
//!
//! Handles saving, loading, and file state management. Loading goes through
//! [`NodeGraph::configure_from`], so extensions see every restored link as a
//! [`crate::nodes::OperationContext::Deserialize`] notification.

use crate::constants::file::{CREATOR, SAVE_FORMAT_VERSION};
use crate::error::GraphError;
use crate::nodes::{NodeGraph, NodeRegistry, SavedGraph};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Save file data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: String,
    pub metadata: SaveMetadata,
    pub root_graph: SavedGraph,
}

/// Metadata for save files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub created: String,  // RFC 3339
    pub modified: String, // RFC 3339
    pub creator: String,
    pub description: String,
}

/// Tracks the file a graph was loaded from or saved to
#[derive(Debug, Default)]
pub struct FileManager {
    /// Current file path (None if unsaved/new file)
    current_file_path: Option<PathBuf>,
    /// Creation timestamp of the loaded file, kept across saves
    created: Option<String>,
}

impl FileManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// File name for display
    pub fn get_file_display_name(&self) -> String {
        match &self.current_file_path {
            Some(path) => path.file_name().and_then(|n| n.to_str()).unwrap_or("Unknown").to_string(),
            None => "Untitled".to_string(),
        }
    }

    /// Save the graph to `file_path` as pretty-printed JSON
    pub fn save_to_file(&mut self, file_path: &Path, graph: &NodeGraph) -> Result<(), GraphError> {
        let now = chrono::Utc::now().to_rfc3339();
        let created = self.created.clone().unwrap_or_else(|| now.clone());
        let save_data = SaveData {
            version: SAVE_FORMAT_VERSION.to_string(),
            metadata: SaveMetadata {
                created: created.clone(),
                modified: now,
                creator: CREATOR.to_string(),
                description: "Node graph created with listish".to_string(),
            },
            root_graph: graph.snapshot(),
        };

        let json_content = serde_json::to_string_pretty(&save_data)?;
        std::fs::write(file_path, json_content)?;

        self.current_file_path = Some(file_path.to_path_buf());
        self.created = Some(created);
        info!(
            "Saved {} nodes to {}",
            save_data.root_graph.nodes.len(),
            file_path.display()
        );
        Ok(())
    }

    /// Load a graph from `file_path`, recreating its nodes through `registry`
    pub fn load_from_file(&mut self, file_path: &Path, registry: &NodeRegistry) -> Result<NodeGraph, GraphError> {
        let save_data = Self::read_save_data(file_path)?;
        if save_data.version != SAVE_FORMAT_VERSION {
            warn!(
                "{} was written by format version {}, expected {}",
                file_path.display(),
                save_data.version,
                SAVE_FORMAT_VERSION
            );
        }

        let mut graph = NodeGraph::new();
        graph.configure_from(&save_data.root_graph, registry)?;

        self.current_file_path = Some(file_path.to_path_buf());
        self.created = Some(save_data.metadata.created);
        info!("Loaded {} nodes from {}", graph.nodes.len(), file_path.display());
        Ok(graph)
    }

    /// Parse a save file without building a graph from it
    pub fn read_save_data(file_path: &Path) -> Result<SaveData, GraphError> {
        let file_content = std::fs::read_to_string(file_path)?;
        Ok(serde_json::from_str(&file_content)?)
    }
}
