//! Logging setup and the namespaced plugin logger.
//!
//! Every line a plugin emits is prefixed with a stable identity string
//! composed of the host's log namespace and the plugin name. The prefix is
//! fixed once at construction, never per call. Output goes through
//! `tracing`, so hosts keep their usual subscriber configuration.

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber from host configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Call once at
/// host startup, before any plugin is instantiated.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Logger handed to each plugin at construction.
#[derive(Debug, Clone)]
pub struct PluginLogger {
    /// Identity prefix, e.g. `host.node-7.plugins.sentinel`.
    prefix: String,
}

impl PluginLogger {
    /// Create a logger for a plugin under the given log namespace.
    pub fn new(log_namespace: &str, plugin_name: &str) -> Self {
        Self {
            prefix: format!("{log_namespace}.plugins.{plugin_name}"),
        }
    }

    /// The identity prefix applied to every line.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Lowest severity, mapped to `trace`.
    pub fn silly(&self, msg: &str) {
        tracing::trace!("{}: {}", self.prefix, msg);
    }

    pub fn debug(&self, msg: &str) {
        tracing::debug!("{}: {}", self.prefix, msg);
    }

    pub fn info(&self, msg: &str) {
        tracing::info!("{}: {}", self.prefix, msg);
    }

    pub fn warn(&self, msg: &str) {
        tracing::warn!("{}: {}", self.prefix, msg);
    }

    pub fn error(&self, msg: &str) {
        tracing::error!("{}: {}", self.prefix, msg);
    }
}
