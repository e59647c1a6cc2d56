//! Registration glue: attaches the coordinator to aggregator node classes

use super::coordinator::ConnectionCoordinator;
use super::slots::renumber_inputs;
use crate::config::ListishConfig;
use crate::error::ConfigError;
use crate::nodes::hooks::chain_callback;
use crate::nodes::registry::{Extension, NodeClass};
use crate::nodes::{NodeCreated, NodeGraph};
use log::{debug, info};
use regex::Regex;
use std::sync::Arc;

/// Gives every matching node class a self-growing list of wildcard inputs
pub struct ListishExtension {
    name: String,
    class_pattern: Regex,
    coordinator: Arc<ConnectionCoordinator>,
}

impl ListishExtension {
    pub fn new(config: &ListishConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            name: config.extension_name.clone(),
            class_pattern: config.class_regex()?,
            coordinator: Arc::new(ConnectionCoordinator::from_config(config)),
        })
    }

    /// Whether nodes of `class_type` get variadic inputs
    pub fn matches(&self, class_type: &str) -> bool {
        self.class_pattern.is_match(class_type)
    }

    pub fn coordinator(&self) -> &ConnectionCoordinator {
        &self.coordinator
    }

    /// Chains the coordinator onto a freshly created node's hooks
    fn install_on_node(coordinator: &Arc<ConnectionCoordinator>, graph: &mut NodeGraph, created: &NodeCreated) {
        if let Some(node) = graph.node_mut(created.node_id) {
            renumber_inputs(&mut node.inputs, coordinator.slot_prefix());
        }
        let hooks = graph.hooks_mut(created.node_id);
        let (connections_change, input_removed) = match hooks {
            Some(hooks) => (Some(&mut hooks.connections_change), Some(&mut hooks.input_removed)),
            None => (None, None),
        };

        let on_change = Arc::clone(coordinator);
        chain_callback(connections_change, move |graph, event| {
            on_change.on_connections_change(graph, event)
        });
        let on_removed = Arc::clone(coordinator);
        chain_callback(input_removed, move |graph, removed| {
            on_removed.on_input_removed(graph, removed)
        });
        debug!("Variadic inputs enabled on node {}", created.node_id);
    }
}

impl Extension for ListishExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn before_register_node_def(&self, class: &mut NodeClass) {
        if !self.matches(&class.metadata.node_type) {
            return;
        }
        info!("{}: managing inputs of {}", self.name, class.metadata.node_type);

        let coordinator = Arc::clone(&self.coordinator);
        class.hooks.node_created.chain(move |graph, created| {
            Self::install_on_node(&coordinator, graph, created)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern_matches_aggregators_only() {
        let extension = ListishExtension::new(&ListishConfig::default()).unwrap();
        for class in [
            "ConvertAny2Tuple",
            "ConvertAny2List",
            "ConvertAny2Dict",
            "ConvertAny2Set",
            "ConvertAny2FrozenSet",
        ] {
            assert!(extension.matches(class), "{} should match", class);
        }
        for class in ["ConvertAny2", "ConvertAny2ListOfStrings", "ConvertAnyList", "MyConvertAny2List"] {
            assert!(!extension.matches(class), "{} should not match", class);
        }
    }

    #[test]
    fn test_uses_configured_name() {
        let config = ListishConfig {
            extension_name: "custom.listish".into(),
            ..ListishConfig::default()
        };
        let extension = ListishExtension::new(&config).unwrap();
        assert_eq!(extension.name(), "custom.listish");
        assert_eq!(extension.coordinator().slot_prefix(), "input_");
    }
}
