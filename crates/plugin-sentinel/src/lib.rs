//! Liveness sentinel plugin for Omnihub.
//!
//! Records when its host process came up into the plugin's own namespace
//! and clears the liveness flag again on destroy. Mostly useful as a
//! minimal end-to-end exercise of the plugin lifecycle and store access.

pub mod plugin;

pub use plugin::{SentinelPlugin, create};
