//! Engine configuration

use serde::{Deserialize, Serialize};

/// Switches for the optimizer and the aggregate cache.
///
/// Both are on by default. Report definitions may carry an `options` block
/// and the command line can override either flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Run the constant-folding pass once per root after construction
    pub constant_folding: bool,
    /// Memoize aggregate results on the execution instance
    pub cache_aggregates: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            constant_folding: true,
            cache_aggregates: true,
        }
    }
}

impl EngineOptions {
    pub fn with_constant_folding(mut self, enabled: bool) -> Self {
        self.constant_folding = enabled;
        self
    }

    pub fn with_cache_aggregates(mut self, enabled: bool) -> Self {
        self.cache_aggregates = enabled;
        self
    }
}
