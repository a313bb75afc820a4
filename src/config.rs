//! Engine configuration

use serde::{Deserialize, Serialize};

/// Default bound on container nesting followed by the tokenizer.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Tunables for a document handle.
///
/// All fields have serde defaults, so a handle can be configured from a
/// partial JSON/TOML fragment embedded in host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Serve `<path>[?(<filter>)]` queries from the materialized array
    /// cache when the array path has been cached.
    pub enable_array_cache: bool,

    /// Maximum container nesting the tokenizer will follow before
    /// reporting the document as malformed.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_array_cache: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
