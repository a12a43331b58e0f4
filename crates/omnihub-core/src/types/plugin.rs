//! Plugin scope and configuration types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a plugin runs. Fixed at construction, never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Inside an adapter instance.
    Adapter,
    /// Inside the shared controller process.
    Controller,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adapter => write!(f, "adapter"),
            Self::Controller => write!(f, "controller"),
        }
    }
}

/// Per-plugin configuration.
///
/// The only key the runtime recognizes is `enabled`; every other key is
/// implementer-defined and passed through verbatim to the plugin's `init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig(pub serde_json::Map<String, Value>);

impl PluginConfig {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// The `enabled` value as configured, if any.
    pub fn enabled(&self) -> Option<&Value> {
        self.0.get("enabled")
    }

    /// Overwrite the `enabled` value.
    pub fn set_enabled(&mut self, val: Value) {
        self.0.insert("enabled".to_string(), val);
    }

    /// Look up an implementer-defined key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert an implementer-defined key.
    pub fn insert(&mut self, key: impl Into<String>, val: Value) -> Option<Value> {
        self.0.insert(key.into(), val)
    }
}

impl From<serde_json::Map<String, Value>> for PluginConfig {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map)
    }
}
