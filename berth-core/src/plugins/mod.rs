//! Plugin system for berth
//!
//! This module provides the infrastructure for installing and managing plugins:
//!
//! - [`PluginRegistry`]: The central manager that installs, starts, stops, and
//!   uninstalls plugins and reloads their configuration
//! - [`archive`]: Archive validation and entry-point discovery
//! - [`DylibLoader`]: Per-plugin isolated library loading
//! - [`ConfigStore`]: Per-plugin key/value configuration files
//! - [`RegistryError`]: Error types for plugin operations
//!
//! # Archive Layout
//!
//! A plugin archive is a platform dynamic library. Convention-mode installs
//! resolve `lib<name>_plugin.so` (`.dylib` on macOS, `<name>_plugin.dll` on
//! Windows) inside the registry's plugin directory; explicit installs name any
//! archive path directly. Each archive exports:
//! - `_berth_plugin_api_version` - the contract version it was built against
//! - `_berth_plugin_create` - the constructor (or another symbol named by the
//!   archive's descriptor)
//! - `_berth_plugin_descriptor` (optional) - text naming the constructor
//!
//! # Example
//!
//! ```ignore
//! use berth_core::plugins::{PluginRegistry, RegistryConfig};
//!
//! let registry = PluginRegistry::new(RegistryConfig::default());
//!
//! // Install and run a plugin
//! registry.install("echo")?;
//! registry.start("echo")?;
//!
//! // Push new configuration to the running instance
//! registry.save_configuration("echo", &new_values)?;
//! registry.reload_configuration("echo")?;
//!
//! // Tear down
//! registry.uninstall("echo")?;
//! ```

pub mod archive;
mod error;
mod loader;
mod mock;
mod registry;
mod store;

pub use error::RegistryError;
pub use loader::{DylibLoader, DylibLoaderFactory, LoaderFactory, PluginLoader};
pub use mock::{MockLoader, MockLoaderFactory, MockProbe, MockScript};
pub use registry::{
    InstalledPlugin, LifecycleState, PluginRegistry, PluginStatus, RegistryConfig,
};
pub use store::ConfigStore;
