//! Crate-wide constants and default values

/// Variadic input defaults
pub mod slots {
    /// Prefix of canonical slot names, `input_1`, `input_2`, ...
    pub const DEFAULT_SLOT_PREFIX: &str = "input_";
}

/// Extension registration defaults
pub mod extension {
    pub const DEFAULT_EXTENSION_NAME: &str = "ovum.convertany2.listish";

    /// Classes of the ConvertAny2 family that aggregate into a collection
    pub const DEFAULT_CLASS_PATTERN: &str = r"^ConvertAny2.*(Tuple|Dict|List|Set)$";
}

/// Node system constants
pub mod node {
    /// Class of context nodes produced by subgraph conversion
    pub const SUBGRAPH_CLASS: &str = "Subgraph";

    /// Proxy node exposing a subgraph's external inputs on the inside
    pub const SUBGRAPH_INPUT_CLASS: &str = "SubgraphInput";

    /// Proxy node collecting a subgraph's external outputs on the inside
    pub const SUBGRAPH_OUTPUT_CLASS: &str = "SubgraphOutput";
}

/// Save file constants
pub mod file {
    pub const SAVE_FORMAT_VERSION: &str = "1.0";
    pub const CREATOR: &str = "listish 0.1";
}
