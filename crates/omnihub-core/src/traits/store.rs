//! Persistent store trait for pluggable state/object backends.

use async_trait::async_trait;
use serde_json::Value;

use crate::result::AppResult;
use crate::types::{ObjectEntry, State, StateInfo};

/// Trait for the shared persistent key/value store.
///
/// The store holds two kinds of records under dotted ids: *states* (live
/// values with ack/attribution/timestamp) and *objects* (descriptive
/// metadata). The runtime injects one shared handle into every plugin;
/// each plugin is expected to touch only ids under its own namespace.
///
/// Backend errors (network, serialization) surface as ordinary
/// [`crate::AppError`] failures; the runtime treats none of them as fatal.
#[async_trait]
pub trait DataStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a state by id. Returns `None` if the id has never been written.
    async fn get_state(&self, id: &str) -> AppResult<Option<State>>;

    /// Write a state. The store stamps the timestamp. Returns the id.
    async fn set_state(&self, id: &str, info: StateInfo) -> AppResult<String>;

    /// Get a meta object by id. Returns `None` if it does not exist.
    async fn get_object(&self, id: &str) -> AppResult<Option<ObjectEntry>>;

    /// Create or replace a meta object.
    async fn set_object(&self, id: &str, object: ObjectEntry) -> AppResult<()>;

    /// Merge a partial JSON object into an existing meta object, creating
    /// it when absent. Nested objects are merged recursively.
    async fn extend_object(&self, id: &str, partial: Value) -> AppResult<()>;
}
