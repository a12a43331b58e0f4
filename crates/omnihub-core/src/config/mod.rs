//! Host configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. The plugin runtime itself only consumes the `plugins`
//! and `directories` sections; the rest of the host configuration is
//! passed to plugins as an opaque JSON value.

pub mod logging;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use self::logging::LoggingConfig;
use crate::error::AppError;
use crate::types::PluginConfig;

/// Root host configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Configured plugins, keyed by plugin name.
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginConfig>,
    /// Plugin search directories.
    #[serde(default)]
    pub directories: DirectoriesConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Plugin search directories.
///
/// Adapter-scoped hosts search the adapter-local directory before the
/// runtime directory; controller-scoped hosts only search the latter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoriesConfig {
    /// Adapter-local plugin directory (adapter scope only).
    #[serde(default)]
    pub adapter_dir: Option<PathBuf>,
    /// Host-runtime plugin directory.
    #[serde(default = "default_runtime_dir")]
    pub runtime_dir: PathBuf,
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            adapter_dir: None,
            runtime_dir: default_runtime_dir(),
        }
    }
}

impl DirectoriesConfig {
    /// Ordered search locations: adapter directory first, then runtime.
    pub fn search_locations(&self) -> Vec<PathBuf> {
        let mut locations = Vec::new();
        if let Some(dir) = &self.adapter_dir {
            locations.push(dir.clone());
        }
        locations.push(self.runtime_dir.clone());
        locations
    }
}

impl HostConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `OMNIHUB_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("OMNIHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

fn default_runtime_dir() -> PathBuf {
    PathBuf::from("./plugins")
}
