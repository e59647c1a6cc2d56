//! Decides whether a disconnect came from the user or from a structural
//! operation the graph performs on its own.
//!
//! Lookups go against an allow-list of structural contexts. Anything outside
//! the list, [`OperationContext::Other`] included, counts as user-initiated
//! and makes the disconnected slot eligible for deletion.

use crate::nodes::{ConnectionEvent, OperationContext};
use log::debug;

/// Contexts whose disconnects are side effects of restructuring the graph
pub fn default_structural_contexts() -> Vec<OperationContext> {
    vec![
        OperationContext::ProgrammaticReconnect,
        OperationContext::SubgraphConvert,
        OperationContext::ClipboardPaste,
        OperationContext::Deserialize,
        OperationContext::SlotRemoval,
        OperationContext::UndoRedo,
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceClassifier {
    structural: Vec<OperationContext>,
}

impl ProvenanceClassifier {
    pub fn new(structural: impl IntoIterator<Item = OperationContext>) -> Self {
        let mut contexts: Vec<OperationContext> = Vec::new();
        for context in structural {
            if !contexts.contains(&context) {
                contexts.push(context);
            }
        }
        Self { structural: contexts }
    }

    pub fn structural_contexts(&self) -> &[OperationContext] {
        &self.structural
    }

    pub fn is_structural(&self, context: &OperationContext) -> bool {
        self.structural.contains(context)
    }

    /// `true` if the disconnect described by `event` should delete its slot
    pub fn is_user_initiated_removal(&self, event: &ConnectionEvent) -> bool {
        if self.is_structural(&event.context) {
            debug!(
                "Keeping input {} of node {}: disconnect during {}",
                event.slot,
                event.node_id,
                event.context.name()
            );
            return false;
        }
        if let OperationContext::Other(name) = &event.context {
            debug!("Unrecognised operation context `{}`, treating disconnect as user-initiated", name);
        }
        true
    }
}

impl Default for ProvenanceClassifier {
    fn default() -> Self {
        Self::new(default_structural_contexts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::PortType;

    fn disconnect(context: OperationContext) -> ConnectionEvent {
        ConnectionEvent {
            node_id: 1,
            direction: PortType::Input,
            slot: 0,
            connected: false,
            link: None,
            slot_info: None,
            context,
        }
    }

    #[test]
    fn test_direct_edit_is_user_initiated() {
        let classifier = ProvenanceClassifier::default();
        assert!(classifier.is_user_initiated_removal(&disconnect(OperationContext::DirectEdit)));
    }

    #[test]
    fn test_structural_contexts_are_preserved() {
        let classifier = ProvenanceClassifier::default();
        for context in default_structural_contexts() {
            assert!(
                !classifier.is_user_initiated_removal(&disconnect(context.clone())),
                "{} should not delete slots",
                context.name()
            );
        }
    }

    #[test]
    fn test_unknown_context_fails_open() {
        let classifier = ProvenanceClassifier::default();
        let event = disconnect(OperationContext::Other("batch_relink".into()));
        assert!(classifier.is_user_initiated_removal(&event));
    }

    #[test]
    fn test_custom_allow_list() {
        let classifier = ProvenanceClassifier::new([
            OperationContext::Other("batch_relink".into()),
            OperationContext::Other("batch_relink".into()),
        ]);
        assert_eq!(classifier.structural_contexts().len(), 1);
        assert!(!classifier.is_user_initiated_removal(&disconnect(OperationContext::Other(
            "batch_relink".into()
        ))));
        assert!(classifier.is_user_initiated_removal(&disconnect(OperationContext::Deserialize)));
    }
}
