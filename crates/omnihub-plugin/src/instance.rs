//! The plugin contract and the per-plugin lifecycle state machine.
//!
//! A plugin moves `Constructed → Active | Inactive → Destroyed`. The
//! transition out of `Constructed` happens in [`PluginInstance::init_plugin`],
//! which runs the enable-resolution cascade:
//!
//! 1. a concrete persisted `<namespace>.enabled` value wins,
//! 2. otherwise, in adapter scope, the host-scoped equivalent flag wins,
//! 3. otherwise the configuration's `enabled` field, defaulting to enabled.
//!
//! Only when the resolved decision is truthy does the implementer's `init`
//! run. The resolved decision is then persisted (acked, attributed to the
//! plugin's own namespace), surviving restarts as the source of truth for
//! later runs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use omnihub_core::error::AppError;
use omnihub_core::logging::PluginLogger;
use omnihub_core::result::AppResult;
use omnihub_core::traits::DataStore;
use omnihub_core::types::state::{is_concrete, truthy};
use omnihub_core::types::{
    ObjectEntry, PluginConfig, Scope, State, StateInfo, enabled_state_id,
    host_equivalent_namespace,
};

use crate::settings::PluginSettings;

/// Trait implemented by Omnihub plugins.
///
/// The runtime drives the lifecycle; implementers only provide `init` and,
/// when they hold resources, `destroy`.
#[async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug + 'static {
    /// Initialize the plugin. Called at most once, and only when the
    /// enable-resolution cascade decided the plugin should be active.
    /// The configuration's `enabled` field holds the resolved decision.
    async fn init(&mut self, config: &PluginConfig, ctx: &PluginContext) -> AppResult<()>;

    /// Release resources. Return `Ok(true)` when cleanup fully succeeded,
    /// `Ok(false)` to tell the orchestrator to keep the instance and retry
    /// later. The default has nothing to free.
    async fn destroy(&mut self, _ctx: &PluginContext) -> AppResult<bool> {
        Ok(true)
    }
}

/// Context handed to a plugin's `init`/`destroy`.
///
/// Carries the plugin's identity (scope, namespace, logger) and the
/// narrow accessors to the shared persistent store. All store access is
/// expected to stay within the plugin's own namespace.
#[derive(Debug, Clone)]
pub struct PluginContext {
    name: String,
    /// Where this plugin runs. Fixed at construction.
    pub scope: Scope,
    /// The store namespace this plugin owns exclusively.
    pub namespace: String,
    /// Namespace of the owning process.
    pub parent_namespace: String,
    /// Namespaced logger, prefix fixed at construction.
    pub log: PluginLogger,
    /// Opaque host configuration.
    pub host_config: Value,
    /// Host package metadata.
    pub parent_package: Value,
    /// Version of the controlling runtime.
    pub controller_version: String,
    parent_config: Option<Value>,
    store: Option<Arc<dyn DataStore>>,
}

impl PluginContext {
    fn new(settings: PluginSettings) -> Self {
        let log = PluginLogger::new(&settings.log_namespace, &settings.name);
        Self {
            name: settings.name,
            scope: settings.scope,
            namespace: settings.namespace,
            parent_namespace: settings.parent_namespace,
            log,
            host_config: settings.host_config,
            parent_package: settings.parent_package,
            controller_version: settings.controller_version,
            parent_config: None,
            store: None,
        }
    }

    /// The plugin's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent configuration recorded during initialization, if any.
    pub fn parent_config(&self) -> Option<&Value> {
        self.parent_config.as_ref()
    }

    /// Whether the persistent-store handle has been injected yet.
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    fn states(&self) -> AppResult<&Arc<dyn DataStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("States database not initialized"))
    }

    fn objects(&self) -> AppResult<&Arc<dyn DataStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("Objects database not initialized"))
    }

    /// Read a state from the persistent store.
    pub async fn get_state(&self, id: &str) -> AppResult<Option<State>> {
        self.states()?.get_state(id).await
    }

    /// Write a state to the persistent store.
    pub async fn set_state(&self, id: &str, info: StateInfo) -> AppResult<String> {
        self.states()?.set_state(id, info).await
    }

    /// Read a meta object from the persistent store.
    pub async fn get_object(&self, id: &str) -> AppResult<Option<ObjectEntry>> {
        self.objects()?.get_object(id).await
    }

    /// Create or replace a meta object.
    pub async fn set_object(&self, id: &str, object: ObjectEntry) -> AppResult<()> {
        self.objects()?.set_object(id, object).await
    }

    /// Merge a partial JSON object into a meta object.
    pub async fn extend_object(&self, id: &str, partial: Value) -> AppResult<()> {
        self.objects()?.extend_object(id, partial).await
    }
}

/// A constructed plugin with its runtime lifecycle state.
///
/// Owned by the registry. The wrapped [`Plugin`] is only reached through
/// the lifecycle methods here.
#[derive(Debug)]
pub struct PluginInstance {
    plugin: Box<dyn Plugin>,
    ctx: PluginContext,
    /// Mirrors the persisted enable flag.
    active: bool,
    /// Guards against a second `init_plugin` on the same instance.
    initialized: bool,
}

impl PluginInstance {
    /// Wrap a freshly constructed plugin with its settings bundle.
    pub fn new(plugin: Box<dyn Plugin>, settings: PluginSettings) -> Self {
        Self {
            plugin,
            ctx: PluginContext::new(settings),
            active: false,
            initialized: false,
        }
    }

    /// The plugin's name.
    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    /// The plugin's scope.
    pub fn scope(&self) -> Scope {
        self.ctx.scope
    }

    /// The store namespace this plugin owns.
    pub fn namespace(&self) -> &str {
        &self.ctx.namespace
    }

    /// Whether the plugin resolved active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether `init_plugin` has already run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The context shared with the implementer.
    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Inject (or overwrite) the shared persistent-store handle.
    pub fn set_database(&mut self, store: Arc<dyn DataStore>) {
        self.ctx.store = Some(store);
    }

    /// Run the enable-resolution cascade and, when it resolves active, the
    /// implementer's `init`.
    ///
    /// Runs at most once per instance; a duplicate call is logged and
    /// ignored. A missing configuration is a caller bug and errors out.
    /// Store failures during the cascade and `init` failures both surface
    /// as `Err` so the registry can run its containment path.
    pub async fn init_plugin(
        &mut self,
        config: Option<&mut PluginConfig>,
        parent_config: &Value,
    ) -> AppResult<()> {
        let Some(config) = config else {
            return Err(AppError::validation(format!(
                "Plugin {}: configuration is required for initialization",
                self.ctx.name()
            )));
        };

        if self.initialized {
            self.ctx.log.info("Already initialized, ignoring duplicate init");
            return Ok(());
        }

        self.ctx.parent_config = Some(parent_config.clone());

        // Store unavailability must not block resolution, it only means the
        // enable decision may not persist. A store that is present but
        // failing is worth a louder line.
        if let Err(e) = self.bootstrap_namespace().await {
            let msg = format!("Could not create namespace objects: {e}");
            if e.is_unavailable() {
                self.ctx.log.debug(&msg);
            } else {
                self.ctx.log.warn(&msg);
            }
        }

        let resolved = self.resolve_enabled(config, parent_config).await?;
        self.initialized = true;

        if truthy(&resolved) {
            config.set_enabled(resolved);
            match self.plugin.init(config, &self.ctx).await {
                Ok(()) => {
                    self.set_active(true).await?;
                    self.ctx.log.debug("Plugin initialized and activated");
                }
                Err(e) => {
                    if let Err(persist_err) = self.set_active(false).await {
                        self.ctx.log.warn(&format!(
                            "Could not persist disabled state: {persist_err}"
                        ));
                    }
                    return Err(e);
                }
            }
        } else {
            self.set_active(false).await?;
            self.ctx.log.debug("Plugin disabled, init skipped");
        }

        Ok(())
    }

    /// Persist the enable flag (acked, attributed to this namespace) and
    /// update the in-memory mirror. Callable independently of the cascade.
    pub async fn set_active(&mut self, active: bool) -> AppResult<()> {
        let id = enabled_state_id(&self.ctx.namespace);
        self.ctx
            .set_state(&id, StateInfo::acked(active, self.ctx.namespace.clone()))
            .await?;
        self.active = active;
        Ok(())
    }

    /// Ask the implementer to release its resources.
    pub async fn destroy(&mut self) -> AppResult<bool> {
        self.plugin.destroy(&self.ctx).await
    }

    /// Best-effort creation of the namespace folder object and the enabled
    /// state object.
    async fn bootstrap_namespace(&self) -> AppResult<()> {
        let namespace = &self.ctx.namespace;
        if self.ctx.get_object(namespace).await?.is_none() {
            self.ctx
                .set_object(namespace, ObjectEntry::folder(self.ctx.name()))
                .await?;
        }

        let enabled_id = enabled_state_id(namespace);
        if self.ctx.get_object(&enabled_id).await?.is_none() {
            let name = format!("{} enabled", self.ctx.name());
            self.ctx
                .set_object(&enabled_id, ObjectEntry::boolean_state(name))
                .await?;
        }
        Ok(())
    }

    /// The enable-resolution cascade. First matching rule wins.
    async fn resolve_enabled(
        &self,
        config: &PluginConfig,
        parent_config: &Value,
    ) -> AppResult<Value> {
        let enabled_id = enabled_state_id(&self.ctx.namespace);
        if let Some(state) = self.ctx.get_state(&enabled_id).await? {
            if is_concrete(&state.val) {
                return Ok(state.val);
            }
        }

        if self.ctx.scope == Scope::Adapter {
            if let Some(host) = parent_config.get("host").and_then(Value::as_str) {
                if let Some(host_namespace) =
                    host_equivalent_namespace(&self.ctx.namespace, host)
                {
                    let host_id = enabled_state_id(&host_namespace);
                    if let Some(state) = self.ctx.get_state(&host_id).await? {
                        if is_concrete(&state.val) {
                            return Ok(state.val);
                        }
                    }
                }
            }
        }

        Ok(config.enabled().cloned().unwrap_or(Value::Bool(true)))
    }
}
