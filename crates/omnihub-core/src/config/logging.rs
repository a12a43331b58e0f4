//! Host logging settings.

use serde::{Deserialize, Serialize};

/// Controls the tracing subscriber installed at host startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum severity: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    /// Overridden by `RUST_LOG` when set.
    pub level: String,
    /// Output format, `"pretty"` or `"json"`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}
