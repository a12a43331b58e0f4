//! # omnihub-plugin-sdk
//!
//! SDK for developing plugins for Omnihub.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use omnihub_plugin_sdk::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct MyPlugin;
//!
//! #[async_trait]
//! impl Plugin for MyPlugin {
//!     async fn init(&mut self, config: &PluginConfig, ctx: &PluginContext) -> AppResult<()> {
//!         ctx.log.info("starting up");
//!         Ok(())
//!     }
//! }
//!
//! // Compiled-in plugins register a constructor with the StaticLoader:
//! pub fn create(_settings: &PluginSettings) -> AppResult<Box<dyn Plugin>> {
//!     Ok(Box::new(MyPlugin::default()))
//! }
//!
//! // Dynamic plugins export the well-known constructor symbol instead:
//! omnihub_plugin_sdk::export_plugin!(MyPlugin);
//! ```

/// Prelude for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;
    pub use serde_json::{Value, json};

    pub use omnihub_core::logging::PluginLogger;
    pub use omnihub_core::result::AppResult;
    pub use omnihub_core::traits::DataStore;
    pub use omnihub_core::types::{ObjectEntry, PluginConfig, Scope, State, StateInfo};
    pub use omnihub_core::AppError;

    pub use omnihub_plugin::instance::{Plugin, PluginContext};
    pub use omnihub_plugin::loader::PluginConstructor;
    pub use omnihub_plugin::settings::PluginSettings;
}

/// Exports the well-known dynamic-plugin constructor for a plugin type.
///
/// The type must implement [`Plugin`](prelude::Plugin) and `Default`.
/// The host's dynamic loader looks this symbol up after resolving the
/// plugin package.
#[macro_export]
macro_rules! export_plugin {
    ($plugin_type:ty) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn omnihub_plugin_create() -> *mut dyn $crate::prelude::Plugin {
            let plugin: Box<dyn $crate::prelude::Plugin> =
                Box::new(<$plugin_type as Default>::default());
            Box::into_raw(plugin)
        }
    };
}
