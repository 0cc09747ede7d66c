//! Echo plugin - a minimal berth plugin
//!
//! Replies to messages with a configurable greeting. Serves as the
//! reference for writing plugins and as a fixture for loading the
//! registry end to end.
//!
//! Configuration keys:
//! - `greeting`: prefix for echoed messages, defaults to `echo`

use std::sync::Arc;

use berth_plugin_api::{Plugin, PluginContext, PluginError};

/// A plugin that echoes messages back with a configurable greeting
#[derive(Default)]
pub struct EchoPlugin {
    greeting: String,
    started: bool,
    context: Option<Arc<PluginContext>>,
}

impl EchoPlugin {
    /// Echo a message back, prefixed with the configured greeting.
    /// Fails unless the plugin is started.
    pub fn echo(&self, message: &str) -> Result<String, PluginError> {
        if !self.started {
            return Err(PluginError::InvalidState(
                "echo plugin is not started".to_string(),
            ));
        }
        Ok(format!("{}: {}", self.greeting, message))
    }
}

impl Plugin for EchoPlugin {
    fn name(&self) -> &str {
        "echo"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self, context: Arc<PluginContext>) -> Result<(), PluginError> {
        self.greeting = context.config_get_or("greeting", "echo");
        context.log_info("Echo plugin initialized");
        self.context = Some(context);
        Ok(())
    }

    fn start(&mut self) -> Result<(), PluginError> {
        self.started = true;
        if let Some(context) = &self.context {
            context.log_info("Echo plugin started");
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PluginError> {
        // Stopping a plugin that never started is fine
        self.started = false;
        Ok(())
    }

    fn destroy(&mut self) {
        self.context = None;
    }
}

// Export the plugin for dynamic loading
berth_plugin_api::export_plugin!(EchoPlugin);
