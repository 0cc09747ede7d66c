//! berth-plugin-api - Plugin API for the berth host
//!
//! This crate provides the traits and types needed to write plugins for berth.
//! Plugins are native Rust dynamic libraries that the host installs by name,
//! drives through an explicit lifecycle (init, start, stop, destroy), and
//! configures through a per-plugin key/value store.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use berth_plugin_api::{Plugin, PluginContext, PluginError, export_plugin};
//!
//! #[derive(Default)]
//! pub struct MyPlugin {
//!     greeting: String,
//! }
//!
//! impl Plugin for MyPlugin {
//!     fn name(&self) -> &str {
//!         "my-plugin"
//!     }
//!
//!     fn version(&self) -> &str {
//!         env!("CARGO_PKG_VERSION")
//!     }
//!
//!     fn init(&mut self, ctx: Arc<PluginContext>) -> Result<(), PluginError> {
//!         self.greeting = ctx.config_get_or("greeting", "hello");
//!         ctx.log_info("Plugin initialized");
//!         Ok(())
//!     }
//! }
//!
//! export_plugin!(MyPlugin);
//! ```

use std::sync::Arc;

pub mod context;
pub mod error;

pub use context::PluginContext;
pub use error::PluginError;

/// Current plugin API version. Plugins must match this exactly.
/// This is checked when loading plugins to ensure compatibility.
pub const API_VERSION: u32 = 1;

/// Symbol the host calls to read the archive's API version.
pub const API_VERSION_SYMBOL: &str = "_berth_plugin_api_version";

/// Default constructor symbol generated by [`export_plugin!`].
pub const CREATE_SYMBOL: &str = "_berth_plugin_create";

/// Destructor symbol generated for symmetry with [`CREATE_SYMBOL`].
pub const DESTROY_SYMBOL: &str = "_berth_plugin_destroy";

/// Descriptor symbol naming the constructor entry point.
///
/// The descriptor returns a NUL-terminated text blob. The first line that is
/// non-empty after trimming and does not start with `#` names the constructor
/// symbol. Hand-written plugins may include comment lines; the macro emits
/// just the constructor name.
pub const DESCRIPTOR_SYMBOL: &str = "_berth_plugin_descriptor";

/// The core plugin trait - implement this to create a berth plugin.
///
/// `start`, `stop`, and `destroy` have default no-op implementations, so
/// plugins without background work only need identity and `init`. `stop` may
/// be called without a preceding `start`; implementations must tolerate it.
pub trait Plugin: Send + Sync {
    /// Unique plugin name, used as the registry key
    fn name(&self) -> &str;

    /// Plugin version string
    fn version(&self) -> &str;

    /// Called once at install time, before the plugin is visible to anyone.
    /// Use this to read configuration and prepare state.
    fn init(&mut self, ctx: Arc<PluginContext>) -> Result<(), PluginError>;

    /// Bring the plugin into active service
    fn start(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Take the plugin out of active service
    fn stop(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called at uninstall. Release resources; must not assume any
    /// particular prior state.
    fn destroy(&mut self) {}
}

/// Export a plugin type for dynamic loading.
///
/// This macro generates the C ABI entry points that berth uses to discover,
/// load, and unload plugins dynamically.
///
/// # Usage
///
/// ```ignore
/// berth_plugin_api::export_plugin!(MyPlugin);
/// ```
///
/// # Generated Functions
///
/// - `_berth_plugin_create()`: Creates a new plugin instance
/// - `_berth_plugin_api_version()`: Returns the API version
/// - `_berth_plugin_destroy()`: Destroys a plugin instance
/// - `_berth_plugin_descriptor()`: Names the constructor entry point
#[macro_export]
macro_rules! export_plugin {
    ($plugin_type:ty) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _berth_plugin_create() -> *mut dyn $crate::Plugin {
            let plugin: Box<dyn $crate::Plugin> = Box::new(<$plugin_type>::default());
            Box::into_raw(plugin)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _berth_plugin_api_version() -> u32 {
            $crate::API_VERSION
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _berth_plugin_destroy(ptr: *mut dyn $crate::Plugin) {
            if !ptr.is_null() {
                unsafe {
                    drop(Box::from_raw(ptr));
                }
            }
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _berth_plugin_descriptor() -> *const ::std::os::raw::c_char {
            c"_berth_plugin_create".as_ptr()
        }
    };
}
