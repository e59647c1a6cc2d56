//! Listish core library
//!
//! Self-growing input lists for the ConvertAny2 family of aggregator nodes,
//! together with the host node graph they live in.

pub mod config;
pub mod constants;
pub mod error;
pub mod file_manager;
pub mod listish;
pub mod nodes;

// Re-export commonly used types
pub use config::ListishConfig;
pub use error::{ConfigError, GraphError};
pub use file_manager::FileManager;
pub use listish::{ConnectionCoordinator, ListishExtension, ProvenanceClassifier};
pub use nodes::{NodeGraph, NodeRegistry, OperationContext};
