//! Meta objects stored alongside states.
//!
//! Every plugin namespace owns a folder object plus one state object per
//! state it persists. Objects carry descriptive metadata only; the values
//! themselves live in states.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The type of a meta object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A grouping node for a namespace.
    #[default]
    Folder,
    /// Metadata for a persisted state.
    State,
}

/// A meta object as stored in the persistent store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// The object type. Defaults to `folder` when a partial write creates
    /// the object without naming one.
    #[serde(rename = "type", default)]
    pub kind: ObjectKind,
    /// Common descriptive metadata (name, value type, roles).
    #[serde(default)]
    pub common: Value,
    /// Implementation-defined payload, passed through verbatim.
    #[serde(default)]
    pub native: Value,
}

impl ObjectEntry {
    /// A folder object for a plugin namespace.
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::Folder,
            common: json!({ "name": name.into() }),
            native: json!({}),
        }
    }

    /// A boolean state object, readable and writable by the owner.
    pub fn boolean_state(name: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::State,
            common: json!({
                "name": name.into(),
                "type": "boolean",
                "read": true,
                "write": true,
            }),
            native: json!({}),
        }
    }
}
