//! In-memory store implementation using dashmap.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use omnihub_core::result::AppResult;
use omnihub_core::traits::DataStore;
use omnihub_core::types::{ObjectEntry, State, StateInfo};

/// In-memory persistent store.
///
/// States and objects live in separate maps keyed by their dotted ids.
/// Cloning is cheap and shares the underlying maps, so a host can hand the
/// same store to the plugin handler and keep a handle for itself.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// State id → current state.
    states: std::sync::Arc<DashMap<String, State>>,
    /// Object id → meta object.
    objects: std::sync::Arc<DashMap<String, ObjectEntry>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of states currently held.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of objects currently held.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get_state(&self, id: &str) -> AppResult<Option<State>> {
        Ok(self.states.get(id).map(|entry| entry.value().clone()))
    }

    async fn set_state(&self, id: &str, info: StateInfo) -> AppResult<String> {
        let state = State {
            val: info.val,
            ack: info.ack,
            from: info.from,
            ts: chrono::Utc::now().timestamp_millis(),
        };
        debug!(id, "Writing state");
        self.states.insert(id.to_string(), state);
        Ok(id.to_string())
    }

    async fn get_object(&self, id: &str) -> AppResult<Option<ObjectEntry>> {
        Ok(self.objects.get(id).map(|entry| entry.value().clone()))
    }

    async fn set_object(&self, id: &str, object: ObjectEntry) -> AppResult<()> {
        self.objects.insert(id.to_string(), object);
        Ok(())
    }

    async fn extend_object(&self, id: &str, partial: Value) -> AppResult<()> {
        let mut current = match self.objects.get(id) {
            Some(entry) => serde_json::to_value(entry.value())?,
            None => Value::Object(serde_json::Map::new()),
        };
        merge_json(&mut current, partial);
        let merged: ObjectEntry = serde_json::from_value(current)?;
        self.objects.insert(id.to_string(), merged);
        Ok(())
    }
}

/// Recursively merge `incoming` into `target`. Non-object values replace.
fn merge_json(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(target_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                merge_json(target_map.entry(key).or_insert(Value::Null), value);
            }
        }
        (target_slot, incoming_value) => *target_slot = incoming_value,
    }
}
