//! Engine configuration
//!
//! All fields are optional in the JSON file and fall back to the defaults below.

use crate::classifier::ForestParams;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of archived sessions returned by the sessions view
pub const DEFAULT_ARCHIVE_VIEW_LIMIT: usize = 5;

/// Default listen address for the HTTP service
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Seed for the behavior simulator (fresh entropy when absent)
    pub rng_seed: Option<u64>,
    /// Stress classifier training parameters
    pub forest: ForestParams,
    /// Archived sessions exposed through the sessions view
    pub archive_view_limit: usize,
    /// Listen address for the HTTP service
    pub bind: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            forest: ForestParams::default(),
            archive_view_limit: DEFAULT_ARCHIVE_VIEW_LIMIT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(EngineError::JsonError)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.forest.estimators == 0 {
            return Err(EngineError::Config(
                "forest.estimators must be at least 1".to_string(),
            ));
        }
        if self.archive_view_limit == 0 {
            return Err(EngineError::Config(
                "archive_view_limit must be at least 1".to_string(),
            ));
        }
        if self.bind.trim().is_empty() {
            return Err(EngineError::Config("bind address is empty".to_string()));
        }
        Ok(())
    }
}
