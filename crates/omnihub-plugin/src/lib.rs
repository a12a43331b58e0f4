//! # omnihub-plugin
//!
//! Plugin lifecycle orchestration for Omnihub. Provides:
//!
//! - The [`Plugin`] contract implemented by every extension module
//! - [`PluginInstance`], the per-plugin lifecycle state machine with the
//!   enable-resolution cascade and the durable enable flag
//! - [`PluginHandler`], the registry that instantiates plugins, injects the
//!   persistent store, and sequences init/destroy with failure containment
//! - The [`PluginLoader`] seam with a compiled-in [`StaticLoader`] and an
//!   optional `libloading`-backed dynamic loader
//!
//! One misbehaving plugin never takes down its siblings: resolution and
//! construction failures are logged and recorded as configured-but-not-
//! instantiated entries, and an `init` failure tears down only that plugin.

pub mod handler;
pub mod instance;
pub mod loader;
pub mod settings;

pub use handler::{PluginEntry, PluginHandler};
pub use instance::{Plugin, PluginContext, PluginInstance};
#[cfg(feature = "dynamic")]
pub use loader::DynamicLoader;
pub use loader::{PluginConstructor, PluginFactory, PluginLoader, StaticLoader};
pub use settings::{PluginHandlerSettings, PluginSettings};
