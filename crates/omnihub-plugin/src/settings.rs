//! Registry-wide and per-plugin settings bundles.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use omnihub_core::types::{Scope, plugin_namespace};

/// Settings the host supplies when constructing a [`PluginHandler`].
///
/// [`PluginHandler`]: crate::handler::PluginHandler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginHandlerSettings {
    /// Where the handler runs.
    pub scope: Scope,
    /// Namespace of the owning process, e.g. `system.adapter.web.0` or
    /// `system.host.node-7`.
    pub parent_namespace: String,
    /// Identity used for plugin logger prefixes.
    pub log_namespace: String,
    /// Opaque host configuration, passed through to plugins.
    #[serde(default)]
    pub host_config: Value,
    /// Host package metadata (name, version, dependencies).
    #[serde(default)]
    pub parent_package: Value,
    /// Version string of the controlling runtime.
    pub controller_version: String,
    /// Ordered plugin search locations: adapter-local directory first,
    /// then the host-runtime directory (controller scope has only the
    /// latter).
    #[serde(default)]
    pub search_locations: Vec<PathBuf>,
}

impl PluginHandlerSettings {
    /// Derive the construction-settings bundle for one plugin.
    pub fn for_plugin(&self, name: &str) -> PluginSettings {
        PluginSettings {
            name: name.to_string(),
            scope: self.scope,
            namespace: plugin_namespace(&self.parent_namespace, name),
            parent_namespace: self.parent_namespace.clone(),
            log_namespace: self.log_namespace.clone(),
            host_config: self.host_config.clone(),
            parent_package: self.parent_package.clone(),
            controller_version: self.controller_version.clone(),
        }
    }
}

/// Construction settings for a single plugin instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Plugin name, unique within the registry.
    pub name: String,
    /// Scope inherited from the handler.
    pub scope: Scope,
    /// The namespace this plugin owns in the persistent store.
    pub namespace: String,
    /// Namespace of the owning process.
    pub parent_namespace: String,
    /// Identity used for the logger prefix.
    pub log_namespace: String,
    /// Opaque host configuration.
    pub host_config: Value,
    /// Host package metadata.
    pub parent_package: Value,
    /// Version string of the controlling runtime.
    pub controller_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn handler_settings() -> PluginHandlerSettings {
        PluginHandlerSettings {
            scope: Scope::Adapter,
            parent_namespace: "system.adapter.web.0".to_string(),
            log_namespace: "web.0".to_string(),
            host_config: json!({ "host": "node-7" }),
            parent_package: json!({ "name": "omnihub.web", "version": "2.1.0" }),
            controller_version: "5.0.0".to_string(),
            search_locations: vec![PathBuf::from("/opt/web/plugins")],
        }
    }

    #[test]
    fn test_for_plugin_derives_namespace() {
        let settings = handler_settings().for_plugin("sentinel");
        assert_eq!(settings.namespace, "system.adapter.web.0.plugins.sentinel");
        assert_eq!(settings.scope, Scope::Adapter);
        assert_eq!(settings.controller_version, "5.0.0");
    }

    #[test]
    fn test_for_plugin_passes_host_config_through() {
        let settings = handler_settings().for_plugin("sentinel");
        assert_eq!(settings.host_config["host"], "node-7");
        assert_eq!(settings.parent_package["version"], "2.1.0");
    }
}
