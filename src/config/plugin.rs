//! Plugin descriptors.
//!
//! Plugins are registered by identifier. Whether an identifier names something
//! that can actually be loaded is decided by whoever builds the descriptor;
//! configuration only checks the flags the descriptor reports and stores the
//! normalized identifier.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Characters stripped from the front of a plugin identifier.
const LEADING_SEPARATORS: [char; 2] = ['\\', '/'];

/// A plugin as reported by an external registration step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub id: String,
    /// The plugin can be created without constructor arguments
    pub constructible: bool,
    /// The plugin implements the plugin capability
    pub implements_plugin: bool,
}

impl PluginDescriptor {
    /// Descriptor for a plugin that passed external validation.
    pub fn validated(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            constructible: true,
            implements_plugin: true,
        }
    }

    /// Check the descriptor and return its normalized identifier.
    pub fn checked_id(&self) -> Result<String, ConfigError> {
        let id = normalize_plugin_id(&self.id);
        if id.is_empty() {
            return Err(ConfigError::InvalidPlugin {
                id: self.id.clone(),
                reason: "identifier is empty".into(),
            });
        }
        if !self.implements_plugin {
            return Err(ConfigError::InvalidPlugin {
                id,
                reason: "does not implement the plugin capability".into(),
            });
        }
        if !self.constructible {
            return Err(ConfigError::InvalidPlugin {
                id,
                reason: "cannot be constructed without arguments".into(),
            });
        }
        Ok(id)
    }
}

/// Strip leading path separators from a plugin identifier.
pub fn normalize_plugin_id(id: &str) -> String {
    id.trim().trim_start_matches(LEADING_SEPARATORS).to_string()
}
