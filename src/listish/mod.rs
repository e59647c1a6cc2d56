//! Variadic input slots for aggregator nodes
//!
//! Nodes whose class matches the configured pattern keep a list of wildcard
//! inputs named `input_1..input_n` that grows by one open slot whenever the
//! last slot gets connected and shrinks when the user removes a link.

pub mod classifier;
pub mod coordinator;
pub mod extension;
pub mod slots;

pub use classifier::{default_structural_contexts, ProvenanceClassifier};
pub use coordinator::ConnectionCoordinator;
pub use extension::ListishExtension;
pub use slots::{grow_inputs, is_settled, renumber_inputs, slot_name};
