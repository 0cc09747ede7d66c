//! berth-core: Core library for the berth plugin host
//!
//! This crate provides the foundational components for berth:
//!
//! - **Plugin registry** - [`PluginRegistry`] installs plugins by name and drives
//!   their lifecycle (install, start, stop, reload configuration, uninstall)
//! - **Archive handling** - [`plugins::archive`] validates plugin archives and
//!   discovers their entry points
//! - **Isolated loading** - [`plugins::DylibLoader`] gives every plugin its own
//!   closable library mapping
//! - **Configuration** - [`plugins::ConfigStore`] persists per-plugin key/value
//!   configuration that can be reloaded at runtime
//!
//! # Quick Start
//!
//! ```no_run
//! use berth_core::plugins::{PluginRegistry, RegistryConfig};
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = PluginRegistry::new(RegistryConfig::default());
//!
//!     // Install resolves the archive by naming convention
//!     let handle = registry.install("echo")?;
//!     println!("{} {} is {}", handle.name(), handle.version(), handle.state());
//!
//!     registry.start("echo")?;
//!     registry.stop("echo")?;
//!     registry.uninstall("echo")?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                 PluginRegistry                 │
//! │  ┌────────────────────────────────────────────┐│
//! │  │              InstalledPlugin               ││
//! │  │  ┌───────────────┐  ┌───────────────────┐  ││
//! │  │  │ Box<dyn       │  │    DylibLoader    │  ││
//! │  │  │   Plugin>     │  │  (own mapping)    │  ││
//! │  │  └───────────────┘  └───────────────────┘  ││
//! │  └────────────────────────────────────────────┘│
//! └────────────────────────────────────────────────┘
//! ```

pub mod plugins;

// Re-export key types for convenience
pub use plugins::{
    ConfigStore, InstalledPlugin, LifecycleState, LoaderFactory, PluginLoader, PluginRegistry,
    PluginStatus, RegistryConfig, RegistryError,
};
