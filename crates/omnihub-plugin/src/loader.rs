//! Plugin loading: name resolution and construction.
//!
//! A loader resolves a plugin name to a constructible factory within an
//! ordered list of search locations. Resolution failure (package not
//! found) and construction failure (constructor errors) are reported as
//! values; the registry logs them and continues.

use std::collections::HashMap;
use std::path::PathBuf;

use omnihub_core::error::AppError;
use omnihub_core::result::AppResult;

use crate::instance::Plugin;
use crate::settings::PluginSettings;

/// Constructor signature for compiled-in plugins.
pub type PluginConstructor = fn(&PluginSettings) -> AppResult<Box<dyn Plugin>>;

/// A resolved, not-yet-invoked plugin constructor.
pub type PluginFactory = Box<dyn FnOnce(&PluginSettings) -> AppResult<Box<dyn Plugin>> + Send>;

type SharedConstructor =
    std::sync::Arc<dyn Fn(&PluginSettings) -> AppResult<Box<dyn Plugin>> + Send + Sync>;

/// Resolves plugin names to constructible factories.
pub trait PluginLoader: Send + Sync + std::fmt::Debug {
    /// Resolve `name` within the ordered `locations`.
    ///
    /// Returns a not-found error when no package matches the naming
    /// convention in any location. Errors from the returned factory are
    /// construction failures, kept distinct from resolution failures.
    fn resolve(&self, name: &str, locations: &[PathBuf]) -> AppResult<PluginFactory>;
}

/// Loader for compiled-in plugins registered by the host at startup.
///
/// Search locations are ignored; the registered name is the whole
/// resolution.
#[derive(Default)]
pub struct StaticLoader {
    /// Plugin name → constructor.
    constructors: HashMap<String, SharedConstructor>,
}

impl StaticLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under a plugin name.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&PluginSettings) -> AppResult<Box<dyn Plugin>> + Send + Sync + 'static,
    {
        self.constructors
            .insert(name.into(), std::sync::Arc::new(constructor));
    }

    /// Builder-style registration.
    pub fn with<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&PluginSettings) -> AppResult<Box<dyn Plugin>> + Send + Sync + 'static,
    {
        self.register(name, constructor);
        self
    }
}

impl PluginLoader for StaticLoader {
    fn resolve(&self, name: &str, _locations: &[PathBuf]) -> AppResult<PluginFactory> {
        let constructor = self.constructors.get(name).cloned().ok_or_else(|| {
            AppError::not_found(format!("No plugin package found for '{name}'"))
        })?;
        Ok(Box::new(move |settings| constructor(settings)))
    }
}

impl std::fmt::Debug for StaticLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticLoader")
            .field("registered", &self.constructors.len())
            .finish()
    }
}

/// Dynamic plugin loader using `libloading` (feature-gated).
#[cfg(feature = "dynamic")]
pub mod dynamic_loader {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use tracing::{debug, info};

    use omnihub_core::error::AppError;
    use omnihub_core::result::AppResult;

    use crate::instance::Plugin;
    use crate::loader::{PluginFactory, PluginLoader};

    /// Type of the plugin creation function exported by dynamic plugins.
    ///
    /// Dynamic plugins must export
    /// `extern "C" fn omnihub_plugin_create() -> *mut dyn Plugin`
    /// (the legacy `create_plugin` symbol is also accepted).
    pub type CreatePluginFn = unsafe extern "C" fn() -> *mut dyn Plugin;

    /// Loads plugins from shared libraries (.so / .dll / .dylib).
    ///
    /// The package for plugin `name` is the directory
    /// `omnihub-plugin-<name>` inside one of the search locations,
    /// containing `libomnihub_plugin_<name>.<ext>` (dashes mapped to
    /// underscores); a bare library file directly in a search location is
    /// also accepted.
    pub struct DynamicLoader {
        /// Loaded libraries, kept alive for the lifetime of the loader.
        libraries: Mutex<Vec<libloading::Library>>,
    }

    impl DynamicLoader {
        /// Creates a new dynamic loader.
        pub fn new() -> Self {
            Self {
                libraries: Mutex::new(Vec::new()),
            }
        }

        fn candidate_paths(name: &str, location: &Path) -> Vec<PathBuf> {
            let snake = name.replace('-', "_");
            let extensions: &[&str] = if cfg!(target_os = "macos") {
                &["dylib", "so"]
            } else if cfg!(target_os = "windows") {
                &["dll"]
            } else {
                &["so"]
            };

            let package_dir = location.join(format!("omnihub-plugin-{name}"));
            let mut candidates = Vec::new();
            for ext in extensions {
                candidates.push(package_dir.join(format!("libomnihub_plugin_{snake}.{ext}")));
                candidates.push(package_dir.join(format!("omnihub_plugin_{snake}.{ext}")));
                candidates.push(location.join(format!("libomnihub_plugin_{snake}.{ext}")));
            }
            candidates
        }
    }

    impl Default for DynamicLoader {
        fn default() -> Self {
            Self::new()
        }
    }

    impl PluginLoader for DynamicLoader {
        fn resolve(&self, name: &str, locations: &[PathBuf]) -> AppResult<PluginFactory> {
            let path = locations
                .iter()
                .flat_map(|location| Self::candidate_paths(name, location))
                .find(|candidate| candidate.exists())
                .ok_or_else(|| {
                    AppError::not_found(format!(
                        "No plugin package found for '{name}' in {} search location(s)",
                        locations.len()
                    ))
                })?;

            debug!(plugin = %name, path = %path.display(), "Resolved plugin library");

            // SAFETY: loading a plugin library the host configured.
            // Plugins run with full trust in the host process.
            let library = unsafe { libloading::Library::new(&path) }.map_err(|e| {
                AppError::plugin(format!(
                    "Failed to load plugin library '{}': {e}",
                    path.display()
                ))
            })?;

            // SAFETY: the symbol contract above; fn pointers stay valid
            // while the library is alive, and the loader never unloads.
            let create: CreatePluginFn = unsafe {
                match library.get::<CreatePluginFn>(b"omnihub_plugin_create") {
                    Ok(symbol) => *symbol,
                    Err(_) => *library.get::<CreatePluginFn>(b"create_plugin").map_err(|e| {
                        AppError::plugin(format!(
                            "Plugin '{}' exports no constructor symbol: {e}",
                            path.display()
                        ))
                    })?,
                }
            };

            let mut libraries = self
                .libraries
                .lock()
                .map_err(|_| AppError::internal("Dynamic loader library list poisoned"))?;
            libraries.push(library);

            info!(plugin = %name, path = %path.display(), "Dynamic plugin library loaded");

            Ok(Box::new(move |_settings| {
                // SAFETY: the constructor hands us an owned raw pointer.
                let raw = unsafe { create() };
                if raw.is_null() {
                    return Err(AppError::plugin("Plugin constructor returned null"));
                }
                Ok(unsafe { Box::from_raw(raw) })
            }))
        }
    }

    impl std::fmt::Debug for DynamicLoader {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let loaded = self.libraries.lock().map(|libs| libs.len()).unwrap_or(0);
            f.debug_struct("DynamicLoader")
                .field("loaded_count", &loaded)
                .finish()
        }
    }
}

#[cfg(feature = "dynamic")]
pub use dynamic_loader::DynamicLoader;
