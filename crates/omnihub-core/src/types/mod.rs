//! Shared domain types: persisted states, meta objects, scopes, plugin
//! configurations, and namespace helpers.

pub mod namespace;
pub mod object;
pub mod plugin;
pub mod state;

pub use namespace::{enabled_state_id, host_equivalent_namespace, plugin_namespace};
pub use object::{ObjectEntry, ObjectKind};
pub use plugin::{PluginConfig, Scope};
pub use state::{State, StateInfo};
