//! Configuration for the variadic input extension

use crate::constants::{extension, slots};
use crate::error::ConfigError;
use crate::listish::classifier::{default_structural_contexts, ProvenanceClassifier};
use crate::nodes::OperationContext;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for [`crate::listish::ListishExtension`]. Missing fields fall back
/// to their defaults, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListishConfig {
    pub extension_name: String,
    /// Regex matched against node class names
    pub class_pattern: String,
    pub slot_prefix: String,
    /// Operation contexts whose disconnects never delete a slot
    pub structural_contexts: Vec<OperationContext>,
}

impl Default for ListishConfig {
    fn default() -> Self {
        Self {
            extension_name: extension::DEFAULT_EXTENSION_NAME.to_string(),
            class_pattern: extension::DEFAULT_CLASS_PATTERN.to_string(),
            slot_prefix: slots::DEFAULT_SLOT_PREFIX.to_string(),
            structural_contexts: default_structural_contexts(),
        }
    }
}

impl ListishConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.class_regex()?;
        Ok(config)
    }

    /// Load a config from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn class_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.class_pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: self.class_pattern.clone(),
            source,
        })
    }

    pub fn classifier(&self) -> ProvenanceClassifier {
        ProvenanceClassifier::new(self.structural_contexts.iter().cloned())
    }
}
