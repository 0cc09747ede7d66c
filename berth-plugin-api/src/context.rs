//! PluginContext - Plugin's interface to host facilities

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Plugin's interface to host facilities.
///
/// One context is created per installed plugin and handed to it at `init`.
/// It provides:
/// - The plugin's registered name
/// - Read access to the plugin's key/value configuration
/// - Logging scoped to the plugin
///
/// The configuration is a snapshot. The host may swap the whole snapshot at
/// runtime (configuration reload); readers see either the old or the new map,
/// never a mix. Plugins should read keys on use rather than caching values
/// they want to stay current.
pub struct PluginContext {
    plugin_name: String,
    config: RwLock<Arc<HashMap<String, String>>>,
}

impl PluginContext {
    /// Create a context with an empty configuration
    pub fn new(plugin_name: String) -> Self {
        Self::with_config(plugin_name, HashMap::new())
    }

    /// Create a context with a pre-loaded configuration
    pub fn with_config(plugin_name: String, config: HashMap<String, String>) -> Self {
        Self {
            plugin_name,
            config: RwLock::new(Arc::new(config)),
        }
    }

    // ─── Configuration ───────────────────────────────────────────────

    /// Get the plugin's name
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Read a configuration value. Absent keys return `None`; this never
    /// fails.
    pub fn config_get(&self, key: &str) -> Option<String> {
        self.config.read().unwrap().get(key).cloned()
    }

    /// Read a configuration value, falling back to `default` when absent
    pub fn config_get_or(&self, key: &str, default: &str) -> String {
        self.config_get(key).unwrap_or_else(|| default.to_string())
    }

    /// Get the current configuration snapshot
    pub fn config_snapshot(&self) -> Arc<HashMap<String, String>> {
        Arc::clone(&self.config.read().unwrap())
    }

    /// Replace the whole configuration snapshot (for internal use by the
    /// registry on reload). Subsequent reads observe the new values.
    pub fn replace_config(&self, values: HashMap<String, String>) {
        *self.config.write().unwrap() = Arc::new(values);
    }

    // ─── Logging ─────────────────────────────────────────────────────

    /// Log an info message (automatically tagged with the plugin name)
    pub fn log_info(&self, message: &str) {
        tracing::info!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log a warning message
    pub fn log_warn(&self, message: &str) {
        tracing::warn!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log an error message
    pub fn log_error(&self, message: &str) {
        tracing::error!(plugin = %self.plugin_name, "{}", message);
    }

    /// Log a debug message
    pub fn log_debug(&self, message: &str) {
        tracing::debug!(plugin = %self.plugin_name, "{}", message);
    }
}
