//! Tree Configuration
//!
//! Conventions shared by every path computation in the crate. The level base
//! is fixed once per deployment and applied uniformly to roots and to the
//! virtual parent used when a node is moved to the top of the tree.

use serde::{Deserialize, Serialize};

/// Level assigned to root nodes unless configured otherwise
pub const DEFAULT_ROOT_LEVEL: i32 = 1;

/// Configuration for path maintenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeConfig {
    /// Level of a node without a parent
    pub root_level: i32,

    /// Re-check the rewritten subtree after every move and log any inconsistency
    pub verify_after_update: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            root_level: DEFAULT_ROOT_LEVEL,
            verify_after_update: false,
        }
    }
}

impl TreeConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| format!("invalid tree config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Level of the virtual parent that roots hang off
    pub fn virtual_root_level(&self) -> i32 {
        self.root_level - 1
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.root_level < 0 {
            return Err(format!(
                "root_level must not be negative (got {})",
                self.root_level
            ));
        }

        Ok(())
    }
}
