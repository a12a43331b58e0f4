//! The sentinel plugin implementation.

use serde_json::json;

use omnihub_plugin_sdk::prelude::*;

/// Writes an `alive` flag and host metadata into its namespace on init and
/// clears the flag on destroy.
#[derive(Debug, Default)]
pub struct SentinelPlugin {
    /// Millisecond timestamp recorded at init.
    started_at: Option<i64>,
}

impl SentinelPlugin {
    fn alive_id(ctx: &PluginContext) -> String {
        format!("{}.alive", ctx.namespace)
    }
}

#[async_trait]
impl Plugin for SentinelPlugin {
    async fn init(&mut self, config: &PluginConfig, ctx: &PluginContext) -> AppResult<()> {
        let started_at = chrono::Utc::now().timestamp_millis();
        self.started_at = Some(started_at);

        let alive_id = Self::alive_id(ctx);
        ctx.set_object(&alive_id, ObjectEntry::boolean_state("Host process alive"))
            .await?;
        ctx.set_state(&alive_id, StateInfo::acked(true, ctx.namespace.clone()))
            .await?;

        // Optional detail: record what started us, unless turned off.
        let record_meta = config
            .get("recordMeta")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true);
        if record_meta {
            ctx.extend_object(
                &ctx.namespace,
                json!({
                    "native": {
                        "startedAt": started_at,
                        "controllerVersion": ctx.controller_version,
                        "parentPackage": ctx.parent_package.get("name"),
                    }
                }),
            )
            .await?;
        }

        ctx.log.info("Sentinel active");
        Ok(())
    }

    async fn destroy(&mut self, ctx: &PluginContext) -> AppResult<bool> {
        let alive_id = Self::alive_id(ctx);
        ctx.set_state(&alive_id, StateInfo::acked(false, ctx.namespace.clone()))
            .await?;
        self.started_at = None;
        ctx.log.info("Sentinel stopped");
        Ok(true)
    }
}

/// Constructor for registration with a `StaticLoader`.
pub fn create(_settings: &PluginSettings) -> AppResult<Box<dyn Plugin>> {
    Ok(Box::new(SentinelPlugin::default()))
}
