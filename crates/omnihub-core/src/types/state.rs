//! Persisted state values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A state as read back from the persistent store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// The stored value.
    pub val: Value,
    /// Whether the value has been acknowledged by its owner.
    pub ack: bool,
    /// Namespace of the writer that produced this value.
    pub from: String,
    /// Write timestamp, milliseconds since the Unix epoch.
    pub ts: i64,
}

/// The payload for a state write. The store stamps the timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateInfo {
    /// The value to store.
    pub val: Value,
    /// Whether the value is acknowledged.
    #[serde(default)]
    pub ack: bool,
    /// Namespace of the writer.
    pub from: String,
}

impl StateInfo {
    /// Create an acknowledged write attributed to `from`.
    pub fn acked(val: impl Into<Value>, from: impl Into<String>) -> Self {
        Self {
            val: val.into(),
            ack: true,
            from: from.into(),
        }
    }
}

/// Whether a persisted value is a concrete scalar decision.
///
/// Absent values, objects, and arrays are placeholders and must not
/// short-circuit the enable-resolution cascade.
pub fn is_concrete(val: &Value) -> bool {
    !matches!(val, Value::Null | Value::Object(_) | Value::Array(_))
}

/// Loose truthiness for persisted flags.
///
/// The original store recorded the flag as whatever scalar the writer
/// supplied, so numbers and strings are interpreted rather than rejected.
pub fn truthy(val: &Value) -> bool {
    match val {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Null | Value::Object(_) | Value::Array(_) => false,
    }
}
