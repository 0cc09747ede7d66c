//! Error types for plugin authors

use thiserror::Error;

/// Errors that plugins can return from lifecycle methods
#[derive(Error, Debug)]
pub enum PluginError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup failed
    #[error("Startup failed: {0}")]
    Startup(String),

    /// Shutdown failed
    #[error("Shutdown failed: {0}")]
    Shutdown(String),

    /// Operation attempted in the wrong lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl PluginError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a startup error
    pub fn startup(message: impl Into<String>) -> Self {
        Self::Startup(message.into())
    }

    /// Create an invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = PluginError::Config("missing key".to_string());
        assert_eq!(config_err.to_string(), "Configuration error: missing key");

        let startup_err = PluginError::Startup("port in use".to_string());
        assert_eq!(startup_err.to_string(), "Startup failed: port in use");

        let custom_err = PluginError::Custom("something happened".to_string());
        assert_eq!(custom_err.to_string(), "something happened");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let plugin_err: PluginError = io_err.into();

        assert!(matches!(plugin_err, PluginError::Io(_)));
        assert!(plugin_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_helper_constructors() {
        let err = PluginError::custom("test");
        assert!(matches!(err, PluginError::Custom(_)));

        let err = PluginError::config("bad config");
        assert!(matches!(err, PluginError::Config(_)));

        let err = PluginError::startup("failed");
        assert!(matches!(err, PluginError::Startup(_)));

        let err = PluginError::invalid_state("not started");
        assert!(matches!(err, PluginError::InvalidState(_)));
    }

    #[test]
    fn test_invalid_state_error() {
        let err = PluginError::InvalidState("plugin is not started".into());
        assert!(err.to_string().contains("plugin is not started"));
    }

    #[test]
    fn test_shutdown_error() {
        let err = PluginError::Shutdown("worker stuck".into());
        assert_eq!(err.to_string(), "Shutdown failed: worker stuck");
    }
}
