//! Plugin registry/orchestrator.
//!
//! Owns the mapping from plugin name to `{ configuration, instance }`,
//! drives instantiation via the loader, wires the persistent store into
//! each plugin, and sequences init/destroy with error containment.
//!
//! Entries are processed strictly sequentially in insertion order: one
//! plugin fully completes (including its persisted-state writes) before
//! the next begins. One misbehaving plugin never prevents its siblings
//! from being processed.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use omnihub_core::error::AppError;
use omnihub_core::result::AppResult;
use omnihub_core::traits::DataStore;
use omnihub_core::types::PluginConfig;

use crate::instance::PluginInstance;
use crate::loader::PluginLoader;
use crate::settings::PluginHandlerSettings;

/// One configured plugin.
///
/// The configuration is always present; the instance is absent until a
/// successful construction and removed again on destroy or on an
/// initialization failure. An entry with no instance records that the
/// plugin was *configured* even though not *instantiated*.
#[derive(Debug)]
pub struct PluginEntry {
    /// The plugin's configuration as supplied by the host.
    pub config: PluginConfig,
    /// The live instance, if construction succeeded and it has not been
    /// destroyed.
    pub instance: Option<Arc<Mutex<PluginInstance>>>,
}

#[derive(Debug, Default)]
struct EntryMap {
    /// Name → entry.
    entries: HashMap<String, PluginEntry>,
    /// Names in insertion order; drives every sequential pass.
    order: Vec<String>,
}

/// The registry/orchestrator for all configured plugins.
#[derive(Debug)]
pub struct PluginHandler {
    /// Registry-wide settings supplied by the host.
    settings: PluginHandlerSettings,
    /// The loader resolving names to constructors.
    loader: Arc<dyn PluginLoader>,
    /// Configured plugins.
    state: RwLock<EntryMap>,
}

impl PluginHandler {
    /// Creates a handler with the given settings and loader.
    pub fn new(settings: PluginHandlerSettings, loader: Arc<dyn PluginLoader>) -> Self {
        Self {
            settings,
            loader,
            state: RwLock::new(EntryMap::default()),
        }
    }

    /// The registry-wide settings.
    pub fn settings(&self) -> &PluginHandlerSettings {
        &self.settings
    }

    /// Instantiate every configured plugin, in the iteration order of
    /// `configurations`. There is no dependency ordering between plugins.
    pub async fn add_plugins<I>(&self, configurations: I)
    where
        I: IntoIterator<Item = (String, PluginConfig)>,
    {
        for (name, config) in configurations {
            self.instantiate_plugin(&name, config).await;
        }
    }

    /// Resolve and construct one plugin, searching the settings-supplied
    /// locations in order.
    ///
    /// Never fails to the caller: resolution and construction failures are
    /// logged and leave an entry with the configuration but no instance.
    /// A name that is already registered — with or without a live
    /// instance — is a logged no-op, so an entry left behind by a failed
    /// construction cannot be retried without removing it first.
    pub async fn instantiate_plugin(&self, name: &str, config: PluginConfig) {
        let mut map = self.state.write().await;
        if map.entries.contains_key(name) {
            info!(plugin = %name, "Plugin already registered, ignoring duplicate");
            return;
        }

        let settings = self.settings.for_plugin(name);
        let instance = match self.loader.resolve(name, &self.settings.search_locations) {
            Ok(factory) => match factory(&settings) {
                Ok(plugin) => {
                    debug!(
                        plugin = %name,
                        namespace = %settings.namespace,
                        scope = %settings.scope,
                        "Plugin constructed"
                    );
                    Some(Arc::new(Mutex::new(PluginInstance::new(plugin, settings))))
                }
                Err(e) => {
                    error!(plugin = %name, error = %e, "Plugin construction failed");
                    None
                }
            },
            Err(e) => {
                error!(plugin = %name, error = %e, "Plugin package not found");
                None
            }
        };

        map.order.push(name.to_string());
        map.entries.insert(name.to_string(), PluginEntry { config, instance });
    }

    /// Inject the persistent-store handle into one plugin. Idempotent
    /// overwrite; a no-op when the plugin has no instance.
    pub async fn set_database_for_plugin(&self, name: &str, store: Arc<dyn DataStore>) {
        let instance = {
            let map = self.state.read().await;
            map.entries.get(name).and_then(|entry| entry.instance.clone())
        };
        if let Some(instance) = instance {
            instance.lock().await.set_database(store);
        }
    }

    /// Inject the persistent-store handle into every instantiated plugin.
    pub async fn set_database_for_plugins(&self, store: Arc<dyn DataStore>) {
        let instances = self.instances_in_order().await;
        for (_, instance) in instances {
            instance.lock().await.set_database(store.clone());
        }
    }

    /// Initialize one plugin: run its enable-resolution cascade and, when
    /// it resolves active, its `init`.
    ///
    /// Errors only when the plugin was never instantiated — that is
    /// programmer misuse. Any failure *during* initialization is
    /// contained: the plugin gets a best-effort destroy, its instance is
    /// removed, and the call still returns `Ok`.
    pub async fn init_plugin(&self, name: &str, parent_config: &Value) -> AppResult<()> {
        let (instance, mut config) = {
            let map = self.state.read().await;
            let entry = map.entries.get(name).ok_or_else(|| {
                AppError::plugin(format!("Plugin {name} was never instantiated"))
            })?;
            let instance = entry.instance.clone().ok_or_else(|| {
                AppError::plugin(format!("Plugin {name} was never instantiated"))
            })?;
            (instance, entry.config.clone())
        };

        let result = instance
            .lock()
            .await
            .init_plugin(Some(&mut config), parent_config)
            .await;

        // The cascade may have written the resolved decision back into the
        // configuration.
        {
            let mut map = self.state.write().await;
            if let Some(entry) = map.entries.get_mut(name) {
                entry.config = config;
            }
        }

        if let Err(e) = result {
            error!(plugin = %name, error = %e, "Plugin initialization failed, removing instance");
            let mut guard = instance.lock().await;
            if let Err(destroy_err) = guard.destroy().await {
                warn!(
                    plugin = %name,
                    error = %destroy_err,
                    "Cleanup destroy after failed init also failed"
                );
            }
            drop(guard);
            let mut map = self.state.write().await;
            if let Some(entry) = map.entries.get_mut(name) {
                entry.instance = None;
            }
        }

        Ok(())
    }

    /// Initialize every instantiated plugin, sequentially, in insertion
    /// order. One plugin's failure never prevents the next from running.
    pub async fn init_plugins(&self, parent_config: &Value) {
        let names = {
            let map = self.state.read().await;
            map.order.clone()
        };

        for name in names {
            if !self.is_plugin_instantiated(&name).await {
                debug!(plugin = %name, "Plugin has no instance, skipping init");
                continue;
            }
            if let Err(e) = self.init_plugin(&name, parent_config).await {
                // Only reachable if the entry vanished between the check
                // and the call; log and keep going.
                error!(plugin = %name, error = %e, "Plugin initialization pass error");
            }
        }
    }

    /// Destroy one plugin.
    ///
    /// No instance counts as already destroyed. When the implementer's
    /// `destroy` reports success — or `force` is set — the instance is
    /// removed; unforced removal persists `enabled=false` first. A false
    /// or failing `destroy` without `force` keeps the instance so the
    /// caller may retry.
    pub async fn destroy(&self, name: &str, force: bool) -> bool {
        let instance = {
            let map = self.state.read().await;
            match map.entries.get(name) {
                Some(entry) => match entry.instance.clone() {
                    Some(instance) => instance,
                    None => return true,
                },
                None => return true,
            }
        };

        let mut guard = instance.lock().await;
        let destroyed = match guard.destroy().await {
            Ok(flag) => flag,
            Err(e) => {
                error!(plugin = %name, error = %e, "Plugin destroy failed");
                false
            }
        };

        if !destroyed && !force {
            warn!(plugin = %name, "Plugin reported unfinished cleanup, keeping instance");
            return false;
        }

        // Forced teardown skips persistence; the process is already on its
        // way down.
        if !force {
            if let Err(e) = guard.set_active(false).await {
                warn!(plugin = %name, error = %e, "Could not persist disabled state on destroy");
            }
        }
        drop(guard);

        let mut map = self.state.write().await;
        if let Some(entry) = map.entries.get_mut(name) {
            entry.instance = None;
        }
        info!(plugin = %name, forced = force, "Plugin destroyed");
        true
    }

    /// Force-destroy every plugin, attempting each entry exactly once and
    /// continuing past individual failures.
    pub async fn destroy_all(&self) {
        let names = {
            let map = self.state.read().await;
            map.order.clone()
        };
        for name in names {
            self.destroy(&name, true).await;
        }
        info!("All plugins destroyed");
    }

    /// Whether a plugin name is configured at all.
    pub async fn plugin_exists(&self, name: &str) -> bool {
        let map = self.state.read().await;
        map.entries.contains_key(name)
    }

    /// Whether a plugin currently holds a live instance.
    pub async fn is_plugin_instantiated(&self, name: &str) -> bool {
        let map = self.state.read().await;
        map.entries
            .get(name)
            .is_some_and(|entry| entry.instance.is_some())
    }

    /// Whether a plugin resolved active. `false` for unknown names.
    pub async fn is_plugin_active(&self, name: &str) -> bool {
        let instance = {
            let map = self.state.read().await;
            map.entries.get(name).and_then(|entry| entry.instance.clone())
        };
        match instance {
            Some(instance) => instance.lock().await.is_active(),
            None => false,
        }
    }

    /// The live instance for a plugin, if any.
    pub async fn get_plugin_instance(&self, name: &str) -> Option<Arc<Mutex<PluginInstance>>> {
        let map = self.state.read().await;
        map.entries.get(name).and_then(|entry| entry.instance.clone())
    }

    /// The configuration for a plugin, if configured.
    pub async fn get_plugin_config(&self, name: &str) -> Option<PluginConfig> {
        let map = self.state.read().await;
        map.entries.get(name).map(|entry| entry.config.clone())
    }

    /// Configured plugin names in insertion order.
    pub async fn plugin_names(&self) -> Vec<String> {
        let map = self.state.read().await;
        map.order.clone()
    }

    async fn instances_in_order(&self) -> Vec<(String, Arc<Mutex<PluginInstance>>)> {
        let map = self.state.read().await;
        map.order
            .iter()
            .filter_map(|name| {
                map.entries
                    .get(name)
                    .and_then(|entry| entry.instance.clone())
                    .map(|instance| (name.clone(), instance))
            })
            .collect()
    }
}
