//! End-to-end lifecycle tests: enable resolution, failure containment,
//! and destroy semantics against the in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use omnihub_core::result::AppResult;
use omnihub_core::traits::DataStore;
use omnihub_core::types::{PluginConfig, Scope, StateInfo, enabled_state_id};
use omnihub_core::AppError;
use omnihub_plugin::instance::{Plugin, PluginContext};
use omnihub_plugin::loader::StaticLoader;
use omnihub_plugin::settings::{PluginHandlerSettings, PluginSettings};
use omnihub_plugin::PluginHandler;
use omnihub_store::MemoryStore;

/// How a probe plugin's `destroy` behaves.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DestroyMode {
    Succeed,
    ReportFalse,
    Fail,
}

/// Test plugin that counts lifecycle calls through shared counters.
#[derive(Debug)]
struct ProbePlugin {
    init_calls: Arc<AtomicUsize>,
    destroy_calls: Arc<AtomicUsize>,
    fail_init: bool,
    destroy_mode: DestroyMode,
}

#[async_trait]
impl Plugin for ProbePlugin {
    async fn init(&mut self, _config: &PluginConfig, _ctx: &PluginContext) -> AppResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(AppError::plugin("probe init failed on purpose"));
        }
        Ok(())
    }

    async fn destroy(&mut self, _ctx: &PluginContext) -> AppResult<bool> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        match self.destroy_mode {
            DestroyMode::Succeed => Ok(true),
            DestroyMode::ReportFalse => Ok(false),
            DestroyMode::Fail => Err(AppError::plugin("probe destroy failed on purpose")),
        }
    }
}

/// Shared counters for one registered probe.
#[derive(Debug, Default, Clone)]
struct Counters {
    init_calls: Arc<AtomicUsize>,
    destroy_calls: Arc<AtomicUsize>,
}

impl Counters {
    fn inits(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    fn destroys(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }
}

fn probe(
    counters: &Counters,
    fail_init: bool,
    destroy_mode: DestroyMode,
) -> impl Fn(&PluginSettings) -> AppResult<Box<dyn Plugin>> + Send + Sync + 'static {
    let init_calls = counters.init_calls.clone();
    let destroy_calls = counters.destroy_calls.clone();
    move |_settings| {
        Ok(Box::new(ProbePlugin {
            init_calls: init_calls.clone(),
            destroy_calls: destroy_calls.clone(),
            fail_init,
            destroy_mode,
        }))
    }
}

fn controller_settings() -> PluginHandlerSettings {
    PluginHandlerSettings {
        scope: Scope::Controller,
        parent_namespace: "system.host.h1".to_string(),
        log_namespace: "host.h1".to_string(),
        host_config: json!({}),
        parent_package: json!({ "name": "omnihub.controller" }),
        controller_version: "1.0.0".to_string(),
        search_locations: Vec::new(),
    }
}

fn adapter_settings(parent_namespace: &str) -> PluginHandlerSettings {
    PluginHandlerSettings {
        parent_namespace: parent_namespace.to_string(),
        log_namespace: parent_namespace
            .trim_start_matches("system.adapter.")
            .to_string(),
        scope: Scope::Adapter,
        ..controller_settings()
    }
}

async fn setup(
    settings: PluginHandlerSettings,
    plugins: Vec<(&str, PluginConfig, &Counters, bool, DestroyMode)>,
) -> (PluginHandler, Arc<MemoryStore>) {
    let mut loader = StaticLoader::new();
    let mut configs = Vec::new();
    for (name, config, counters, fail_init, destroy_mode) in plugins {
        loader.register(name, probe(counters, fail_init, destroy_mode));
        configs.push((name.to_string(), config));
    }

    let handler = PluginHandler::new(settings, Arc::new(loader));
    let store = Arc::new(MemoryStore::new());
    handler.add_plugins(configs).await;
    handler.set_database_for_plugins(store.clone()).await;
    (handler, store)
}

#[tokio::test]
async fn fresh_install_defaults_to_enabled() {
    let counters = Counters::default();
    let (handler, store) = setup(
        controller_settings(),
        vec![("probe", PluginConfig::new(), &counters, false, DestroyMode::Succeed)],
    )
    .await;

    handler.init_plugin("probe", &json!({})).await.unwrap();

    assert!(handler.is_plugin_active("probe").await);
    assert_eq!(counters.inits(), 1);

    // the decision was persisted, acked, attributed to the plugin
    let state = store
        .get_state("system.host.h1.plugins.probe.enabled")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.val, json!(true));
    assert!(state.ack);
    assert_eq!(state.from, "system.host.h1.plugins.probe");
}

#[tokio::test]
async fn persisted_false_wins_over_config_and_skips_init() {
    let counters = Counters::default();
    let mut config = PluginConfig::new();
    config.set_enabled(json!(true));
    let (handler, store) = setup(
        controller_settings(),
        vec![("probe", config, &counters, false, DestroyMode::Succeed)],
    )
    .await;

    store
        .set_state(
            "system.host.h1.plugins.probe.enabled",
            StateInfo::acked(false, "system.host.h1"),
        )
        .await
        .unwrap();

    handler.init_plugin("probe", &json!({})).await.unwrap();

    assert!(!handler.is_plugin_active("probe").await);
    assert_eq!(counters.inits(), 0);
    // inactive, not destroyed
    assert!(handler.is_plugin_instantiated("probe").await);
}

#[tokio::test]
async fn host_flag_applies_to_adapter_scope() {
    let counters = Counters::default();
    let (handler, store) = setup(
        adapter_settings("system.adapter.web.0"),
        vec![("probe", PluginConfig::new(), &counters, false, DestroyMode::Succeed)],
    )
    .await;

    // fleet-wide opt-out at the host level, no plugin-local flag
    store
        .set_state(
            "system.host.node-7.plugins.probe.enabled",
            StateInfo::acked(false, "system.host.node-7"),
        )
        .await
        .unwrap();

    handler
        .init_plugin("probe", &json!({ "host": "node-7" }))
        .await
        .unwrap();

    assert!(!handler.is_plugin_active("probe").await);
    assert_eq!(counters.inits(), 0);
}

#[tokio::test]
async fn host_flag_lookup_skipped_for_foreign_parent_namespace() {
    let counters = Counters::default();
    let mut settings = adapter_settings("system.adapter.web.0");
    settings.parent_namespace = "custom.runtime".to_string();
    let (handler, store) = setup(
        settings,
        vec![("probe", PluginConfig::new(), &counters, false, DestroyMode::Succeed)],
    )
    .await;

    store
        .set_state(
            "system.host.node-7.plugins.probe.enabled",
            StateInfo::acked(false, "system.host.node-7"),
        )
        .await
        .unwrap();

    // namespace does not match system.adapter.<name>.<instance>, so the
    // host flag is ignored and the default-enabled rule applies
    handler
        .init_plugin("probe", &json!({ "host": "node-7" }))
        .await
        .unwrap();

    assert!(handler.is_plugin_active("probe").await);
    assert_eq!(counters.inits(), 1);
}

#[tokio::test]
async fn placeholder_persisted_value_falls_through_to_config() {
    let counters = Counters::default();
    let mut config = PluginConfig::new();
    config.set_enabled(json!(false));
    let (handler, store) = setup(
        controller_settings(),
        vec![("probe", config, &counters, false, DestroyMode::Succeed)],
    )
    .await;

    // an object is a placeholder, not a concrete decision
    store
        .set_state(
            "system.host.h1.plugins.probe.enabled",
            StateInfo::acked(json!({}), "system.host.h1"),
        )
        .await
        .unwrap();

    handler.init_plugin("probe", &json!({})).await.unwrap();

    assert!(!handler.is_plugin_active("probe").await);
    assert_eq!(counters.inits(), 0);
}

#[tokio::test]
async fn init_failure_is_contained_and_siblings_continue() {
    let bad = Counters::default();
    let good = Counters::default();
    let (handler, store) = setup(
        controller_settings(),
        vec![
            ("bad", PluginConfig::new(), &bad, true, DestroyMode::Succeed),
            ("good", PluginConfig::new(), &good, false, DestroyMode::Succeed),
        ],
    )
    .await;

    handler.init_plugins(&json!({})).await;

    // the failing plugin was deactivated, destroyed best-effort, removed
    assert!(handler.plugin_exists("bad").await);
    assert!(!handler.is_plugin_instantiated("bad").await);
    assert!(!handler.is_plugin_active("bad").await);
    assert_eq!(bad.inits(), 1);
    assert_eq!(bad.destroys(), 1);
    let state = store
        .get_state("system.host.h1.plugins.bad.enabled")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.val, json!(false));

    // the sibling initialized normally
    assert!(handler.is_plugin_active("good").await);
    assert_eq!(good.inits(), 1);
}

#[tokio::test]
async fn store_never_injected_fails_init_and_is_contained() {
    let counters = Counters::default();
    let mut loader = StaticLoader::new();
    loader.register("probe", probe(&counters, false, DestroyMode::Succeed));
    let handler = PluginHandler::new(controller_settings(), Arc::new(loader));
    handler
        .instantiate_plugin("probe", PluginConfig::new())
        .await;

    // no set_database call: the cascade's store read fails
    handler.init_plugin("probe", &json!({})).await.unwrap();

    assert!(!handler.is_plugin_instantiated("probe").await);
    assert_eq!(counters.inits(), 0);
}

#[tokio::test]
async fn duplicate_init_is_a_noop() {
    let counters = Counters::default();
    let (handler, _store) = setup(
        controller_settings(),
        vec![("probe", PluginConfig::new(), &counters, false, DestroyMode::Succeed)],
    )
    .await;

    handler.init_plugin("probe", &json!({})).await.unwrap();
    handler.init_plugin("probe", &json!({})).await.unwrap();

    assert_eq!(counters.inits(), 1);
    assert!(handler.is_plugin_active("probe").await);
}

#[tokio::test]
async fn unfinished_destroy_keeps_instance_until_forced() {
    let counters = Counters::default();
    let (handler, store) = setup(
        controller_settings(),
        vec![("probe", PluginConfig::new(), &counters, false, DestroyMode::ReportFalse)],
    )
    .await;
    handler.init_plugin("probe", &json!({})).await.unwrap();

    assert!(!handler.destroy("probe", false).await);
    assert!(handler.is_plugin_instantiated("probe").await);
    assert_eq!(counters.destroys(), 1);

    // forced removal succeeds and skips deactivation persistence
    assert!(handler.destroy("probe", true).await);
    assert!(!handler.is_plugin_instantiated("probe").await);
    let state = store
        .get_state("system.host.h1.plugins.probe.enabled")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.val, json!(true));
}

#[tokio::test]
async fn unforced_destroy_deactivates_before_removal() {
    let counters = Counters::default();
    let (handler, store) = setup(
        controller_settings(),
        vec![("probe", PluginConfig::new(), &counters, false, DestroyMode::Succeed)],
    )
    .await;
    handler.init_plugin("probe", &json!({})).await.unwrap();

    assert!(handler.destroy("probe", false).await);
    assert!(!handler.is_plugin_instantiated("probe").await);
    let state = store
        .get_state("system.host.h1.plugins.probe.enabled")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.val, json!(false));
    assert!(state.ack);
}

#[tokio::test]
async fn destroy_all_attempts_every_entry_past_failures() {
    let first = Counters::default();
    let failing = Counters::default();
    let last = Counters::default();
    let (handler, _store) = setup(
        controller_settings(),
        vec![
            ("first", PluginConfig::new(), &first, false, DestroyMode::Succeed),
            ("failing", PluginConfig::new(), &failing, false, DestroyMode::Fail),
            ("last", PluginConfig::new(), &last, false, DestroyMode::Succeed),
        ],
    )
    .await;
    handler.init_plugins(&json!({})).await;

    handler.destroy_all().await;

    for name in ["first", "failing", "last"] {
        assert!(
            !handler.is_plugin_instantiated(name).await,
            "{name} should have no instance after destroy_all"
        );
    }
    assert_eq!(first.destroys(), 1);
    assert_eq!(failing.destroys(), 1);
    assert_eq!(last.destroys(), 1);
}

#[tokio::test]
async fn set_active_round_trips_through_the_store() {
    let counters = Counters::default();
    let (handler, store) = setup(
        controller_settings(),
        vec![("probe", PluginConfig::new(), &counters, false, DestroyMode::Succeed)],
    )
    .await;

    let instance: Arc<Mutex<_>> = handler.get_plugin_instance("probe").await.unwrap();
    instance.lock().await.set_active(true).await.unwrap();

    let id = enabled_state_id("system.host.h1.plugins.probe");
    let state = store.get_state(&id).await.unwrap().unwrap();
    assert_eq!(state.val, json!(true));
    assert!(state.ack);
    assert!(instance.lock().await.is_active());
}

#[tokio::test]
async fn mixed_configuration_scenario() {
    let a = Counters::default();
    let b = Counters::default();
    let mut b_config = PluginConfig::new();
    b_config.set_enabled(json!(false));
    let (handler, _store) = setup(
        controller_settings(),
        vec![
            ("a", PluginConfig::new(), &a, false, DestroyMode::Succeed),
            ("b", b_config, &b, false, DestroyMode::Succeed),
        ],
    )
    .await;

    handler.init_plugins(&json!({})).await;

    assert!(handler.is_plugin_active("a").await);
    assert!(!handler.is_plugin_active("b").await);
    assert!(handler.get_plugin_instance("a").await.is_some());
    // b is instantiated but inactive, not destroyed
    assert!(handler.get_plugin_instance("b").await.is_some());
    assert_eq!(a.inits(), 1);
    assert_eq!(b.inits(), 0);
}

#[tokio::test]
async fn resolved_decision_is_written_back_into_config() {
    let counters = Counters::default();
    let (handler, _store) = setup(
        controller_settings(),
        vec![("probe", PluginConfig::new(), &counters, false, DestroyMode::Succeed)],
    )
    .await;

    handler.init_plugin("probe", &json!({})).await.unwrap();

    let config = handler.get_plugin_config("probe").await.unwrap();
    assert_eq!(config.enabled(), Some(&Value::Bool(true)));
}
