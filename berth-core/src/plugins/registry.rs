//! PluginRegistry - owns installed plugins and drives their lifecycle

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};

use berth_plugin_api::{API_VERSION, Plugin, PluginContext};

use super::archive;
use super::error::RegistryError;
use super::loader::{DylibLoaderFactory, LoaderFactory, PluginLoader};
use super::store::ConfigStore;

/// Lifecycle state of an installed plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Instance constructed, `init` not yet run
    Loaded,
    /// `init` succeeded
    Initialized,
    /// `start` succeeded
    Started,
    /// `stop` succeeded
    Stopped,
    /// The last lifecycle call errored or panicked
    Failed,
    /// Uninstalled (terminal)
    Unloaded,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LifecycleState::Loaded => "loaded",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Started => "started",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Failed => "failed",
            LifecycleState::Unloaded => "unloaded",
        };
        write!(f, "{}", s)
    }
}

/// Configuration for PluginRegistry
pub struct RegistryConfig {
    /// Directory searched for conventionally named archives
    pub plugin_dir: PathBuf,
    /// Directory holding per-plugin configuration files
    pub config_dir: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        // Use XDG directory helpers for consistency
        Self {
            plugin_dir: berth_paths::data_dir().join("plugins"),
            config_dir: berth_paths::config_dir().join("plugins"),
        }
    }
}

/// Snapshot of one installed plugin, for listings
#[derive(Debug, Clone)]
pub struct PluginStatus {
    /// Plugin name
    pub name: String,
    /// Version reported by the instance
    pub version: String,
    /// Current lifecycle state
    pub state: LifecycleState,
}

/// The live parts of an installed plugin.
///
/// `instance` is declared before `loader` so that if the cell is ever dropped
/// without an explicit release, the instance (whose vtable lives in the
/// plugin library) is gone before the library is unmapped.
struct PluginCell {
    instance: Option<Box<dyn Plugin>>,
    loader: Box<dyn PluginLoader>,
}

/// An installed plugin with its runtime state
pub struct InstalledPlugin {
    name: String,
    version: String,
    state: RwLock<LifecycleState>,
    context: Arc<PluginContext>,
    cell: Mutex<PluginCell>,
}

impl InstalledPlugin {
    /// Plugin name (the registry key)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version reported by the instance at install time
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        *self.state.read().unwrap()
    }

    /// The context handed to the instance at `init`
    pub fn context(&self) -> &Arc<PluginContext> {
        &self.context
    }

    fn set_state(&self, state: LifecycleState) {
        *self.state.write().unwrap() = state;
    }

    fn status(&self) -> PluginStatus {
        PluginStatus {
            name: self.name.clone(),
            version: self.version.clone(),
            state: self.state(),
        }
    }
}

/// The plugin registry manages installing, starting, stopping, and
/// uninstalling plugins.
///
/// All operations are synchronous. Operations on the same plugin name are
/// serialized through a per-plugin lock; operations on different names run
/// independently.
pub struct PluginRegistry {
    /// Installed plugins by name
    plugins: RwLock<HashMap<String, Arc<InstalledPlugin>>>,
    /// Directory searched for conventionally named archives
    plugin_dir: PathBuf,
    /// Per-plugin configuration files
    store: ConfigStore,
    /// Opens loaders for plugin archives
    factory: Arc<dyn LoaderFactory>,
}

impl PluginRegistry {
    /// Create a registry that loads plugins from dynamic libraries
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_factory(config, Arc::new(DylibLoaderFactory))
    }

    /// Create a registry with a custom loader factory
    pub fn with_factory(config: RegistryConfig, factory: Arc<dyn LoaderFactory>) -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
            plugin_dir: config.plugin_dir,
            store: ConfigStore::new(config.config_dir),
            factory,
        }
    }

    /// Install a plugin from the conventionally named archive in the plugin
    /// directory (`lib<name>_plugin.<ext>`).
    ///
    /// On success the returned handle is initialized but not started. On any
    /// failure the registry is left without a trace of the attempt.
    pub fn install(&self, name: &str) -> Result<Arc<InstalledPlugin>, RegistryError> {
        let path = archive::conventional_archive_path(&self.plugin_dir, name);
        self.install_inner(name, path, None)
    }

    /// Install a plugin from an explicit archive path, with an optional
    /// explicit entry point. A relative path is resolved against the plugin
    /// directory; `entry` of `None` discovers the entry point from the
    /// archive itself.
    pub fn install_from(
        &self,
        name: &str,
        archive: &Path,
        entry: Option<&str>,
    ) -> Result<Arc<InstalledPlugin>, RegistryError> {
        let path = if archive.is_absolute() {
            archive.to_path_buf()
        } else {
            self.plugin_dir.join(archive)
        };
        self.install_inner(name, path, entry)
    }

    fn install_inner(
        &self,
        name: &str,
        path: PathBuf,
        entry: Option<&str>,
    ) -> Result<Arc<InstalledPlugin>, RegistryError> {
        // 1. Fast pre-check for duplicate names (the authoritative check
        //    happens at commit below)
        if self.plugins.read().unwrap().contains_key(name) {
            return Err(RegistryError::AlreadyInstalled {
                name: name.to_string(),
            });
        }

        // 2. Validate the archive file
        archive::validate_archive(&path)?;

        // 3. Resolve the entry point
        let entry = match entry {
            Some(entry) => entry.to_string(),
            None => self.factory.discover(&path)?,
        };

        // 4. Open an isolated loader for the archive
        let mut loader = self.factory.open(&path)?;

        // 5. Instantiate and initialize; the loader is closed on any failure
        let (instance, context) = match self.prepare_instance(name, &entry, loader.as_mut()) {
            Ok(parts) => parts,
            Err(e) => {
                loader.close();
                tracing::error!(plugin = %name, error = %e, "Installation failed");
                return Err(e);
            }
        };
        let version = instance.version().to_string();

        let record = Arc::new(InstalledPlugin {
            name: name.to_string(),
            version,
            state: RwLock::new(LifecycleState::Initialized),
            context,
            cell: Mutex::new(PluginCell {
                instance: Some(instance),
                loader,
            }),
        });

        // 6. Commit. If another caller installed the same name in the
        //    meantime, tear down our own work and report the conflict.
        let mut plugins = self.plugins.write().unwrap();
        match plugins.entry(name.to_string()) {
            Entry::Occupied(_) => {
                drop(plugins);
                Self::release_record(&record);
                Err(RegistryError::AlreadyInstalled {
                    name: name.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                tracing::info!(
                    plugin = %name,
                    version = %record.version,
                    path = %path.display(),
                    "Plugin installed"
                );
                Ok(Arc::clone(slot.insert(record)))
            }
        }
    }

    /// Check the API version, construct the instance, and run `init` with
    /// panic isolation. The caller closes the loader if this fails.
    fn prepare_instance(
        &self,
        name: &str,
        entry: &str,
        loader: &mut dyn PluginLoader,
    ) -> Result<(Box<dyn Plugin>, Arc<PluginContext>), RegistryError> {
        let found = loader.api_version()?;
        if found != API_VERSION {
            return Err(RegistryError::ApiVersionMismatch {
                expected: API_VERSION,
                found,
            });
        }

        let mut instance = loader.instantiate(entry)?;

        let config = self.store.load(name);
        let context = Arc::new(PluginContext::with_config(name.to_string(), config));

        let result =
            std::panic::catch_unwind(AssertUnwindSafe(|| instance.init(Arc::clone(&context))));

        match result {
            Ok(Ok(())) => Ok((instance, context)),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(RegistryError::Unexpected(format!(
                "plugin '{}' panicked in init",
                name
            ))),
        }
    }

    /// Start a plugin. Starting an already started plugin is a no-op.
    pub fn start(&self, name: &str) -> Result<(), RegistryError> {
        let plugin = self.get(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })?;
        let mut cell = plugin.cell.lock().unwrap();

        if plugin.state() == LifecycleState::Started {
            tracing::debug!(plugin = %name, "Plugin already started");
            return Ok(());
        }

        // The instance is only absent if the plugin was uninstalled between
        // the lookup above and taking the cell lock.
        let Some(instance) = cell.instance.as_mut() else {
            return Err(RegistryError::NotFound {
                name: name.to_string(),
            });
        };

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| instance.start()));

        match result {
            Ok(Ok(())) => {
                plugin.set_state(LifecycleState::Started);
                tracing::info!(plugin = %name, "Plugin started");
                Ok(())
            }
            Ok(Err(e)) => {
                plugin.set_state(LifecycleState::Failed);
                tracing::error!(plugin = %name, error = %e, "Plugin start failed");
                Err(e.into())
            }
            Err(_) => {
                plugin.set_state(LifecycleState::Failed);
                tracing::error!(plugin = %name, "Plugin panicked in start");
                Err(RegistryError::Unexpected(format!(
                    "plugin '{}' panicked in start",
                    name
                )))
            }
        }
    }

    /// Stop a plugin. Instances are expected to tolerate `stop` when they
    /// are not running.
    pub fn stop(&self, name: &str) -> Result<(), RegistryError> {
        let plugin = self.get(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })?;
        let mut cell = plugin.cell.lock().unwrap();

        let Some(instance) = cell.instance.as_mut() else {
            return Err(RegistryError::NotFound {
                name: name.to_string(),
            });
        };

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| instance.stop()));

        match result {
            Ok(Ok(())) => {
                plugin.set_state(LifecycleState::Stopped);
                tracing::info!(plugin = %name, "Plugin stopped");
                Ok(())
            }
            Ok(Err(e)) => {
                plugin.set_state(LifecycleState::Failed);
                tracing::error!(plugin = %name, error = %e, "Plugin stop failed");
                Err(e.into())
            }
            Err(_) => {
                plugin.set_state(LifecycleState::Failed);
                tracing::error!(plugin = %name, "Plugin panicked in stop");
                Err(RegistryError::Unexpected(format!(
                    "plugin '{}' panicked in stop",
                    name
                )))
            }
        }
    }

    /// Re-read a plugin's persisted configuration and swap it into the
    /// running context wholesale. Does not re-run `init`; the plugin sees
    /// the new values on its next read.
    pub fn reload_configuration(&self, name: &str) -> Result<(), RegistryError> {
        let plugin = self.get(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })?;

        // Serialize with lifecycle operations on the same name
        let _cell = plugin.cell.lock().unwrap();

        let values = self.store.load(name);
        plugin.context.replace_config(values);
        tracing::info!(plugin = %name, "Configuration reloaded");
        Ok(())
    }

    /// Persist a plugin's configuration. The plugin does not have to be
    /// installed; a later install or reload picks the values up.
    pub fn save_configuration(
        &self,
        name: &str,
        values: &HashMap<String, String>,
    ) -> Result<(), RegistryError> {
        self.store.save(name, values)
    }

    /// Read a plugin's persisted configuration
    pub fn configuration(&self, name: &str) -> HashMap<String, String> {
        self.store.load(name)
    }

    /// Look up an installed plugin. Pure lookup, no side effects.
    pub fn get(&self, name: &str) -> Option<Arc<InstalledPlugin>> {
        self.plugins.read().unwrap().get(name).cloned()
    }

    /// List installed plugins, sorted by name
    pub fn list(&self) -> Vec<PluginStatus> {
        let mut statuses: Vec<PluginStatus> = self
            .plugins
            .read()
            .unwrap()
            .values()
            .map(|p| p.status())
            .collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    /// Number of installed plugins
    pub fn count(&self) -> usize {
        self.plugins.read().unwrap().len()
    }

    /// Uninstall a plugin: destroy the instance, close its loader, remove
    /// the record. Safe to call on a plugin in any state, including failed.
    pub fn uninstall(&self, name: &str) -> Result<(), RegistryError> {
        let record = {
            let mut plugins = self.plugins.write().unwrap();
            plugins
                .remove(name)
                .ok_or_else(|| RegistryError::NotFound {
                    name: name.to_string(),
                })?
        };

        Self::release_record(&record);
        record.set_state(LifecycleState::Unloaded);
        tracing::info!(plugin = %name, "Plugin uninstalled");
        Ok(())
    }

    /// Uninstall every plugin. Failures are logged and do not stop the
    /// remaining teardown.
    pub fn shutdown(&self) {
        let names: Vec<String> = self.plugins.read().unwrap().keys().cloned().collect();

        for name in names {
            if let Err(e) = self.uninstall(&name) {
                tracing::warn!(plugin = %name, error = %e, "Failed to uninstall during shutdown");
            }
        }
    }

    /// Destroy the instance and close the loader, in that order. The
    /// instance's vtable lives in the plugin library, so it must be dropped
    /// before the loader unmaps it.
    fn release_record(record: &InstalledPlugin) {
        let mut cell = record.cell.lock().unwrap();

        if let Some(mut instance) = cell.instance.take() {
            let result = std::panic::catch_unwind(AssertUnwindSafe(|| instance.destroy()));
            if result.is_err() {
                tracing::warn!(plugin = %record.name, "Plugin panicked in destroy");
            }
            drop(instance);
        }

        cell.loader.close();
    }
}
