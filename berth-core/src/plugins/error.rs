//! Plugin registry error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the plugin registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Archive path does not exist or is not a regular file
    #[error("Plugin archive not found: {path}")]
    ArchiveNotFound { path: PathBuf },

    /// Archive exists but is not a dynamic library for this platform
    #[error("Not a plugin archive: {path}")]
    InvalidArchiveType { path: PathBuf },

    /// Discovery found no constructor entry point in the archive
    #[error("No plugin entry point found in {path}")]
    EntryPointNotFound { path: PathBuf },

    /// Archive does not export the plugin API version symbol
    #[error("Archive does not implement the plugin contract: {path}")]
    NotAPlugin { path: PathBuf },

    /// API version mismatch between berth and plugin
    #[error("API version mismatch: berth expects {expected}, plugin has {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    /// Constructor symbol missing from the archive
    #[error("Constructor symbol '{symbol}' not found in archive")]
    MissingConstructor { symbol: String },

    /// Constructor resolved but produced no usable instance
    #[error("Plugin instantiation failed: {reason}")]
    InstantiationFailed { reason: String },

    /// A plugin with this name is already installed
    #[error("Plugin '{name}' is already installed")]
    AlreadyInstalled { name: String },

    /// Plugin not found
    #[error("Plugin '{name}' not found")]
    NotFound { name: String },

    /// Reading or writing a plugin configuration file failed
    #[error("Configuration IO error for {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to load dynamic library
    #[error("Failed to load plugin library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// Plugin lifecycle call failed
    #[error("Plugin error: {0}")]
    Plugin(#[from] berth_plugin_api::PluginError),

    /// Any other installation failure
    #[error("Unexpected plugin failure: {0}")]
    Unexpected(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_not_found_display() {
        let err = RegistryError::ArchiveNotFound {
            path: PathBuf::from("/some/archive.so"),
        };
        assert!(err.to_string().contains("/some/archive.so"));
    }

    #[test]
    fn test_api_version_mismatch_display() {
        let err = RegistryError::ApiVersionMismatch {
            expected: 1,
            found: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("1"));
        assert!(msg.contains("2"));
    }

    #[test]
    fn test_not_found_display() {
        let err = RegistryError::NotFound {
            name: "test-plugin".to_string(),
        };
        assert!(err.to_string().contains("test-plugin"));
    }

    #[test]
    fn test_already_installed_display() {
        let err = RegistryError::AlreadyInstalled {
            name: "echo".to_string(),
        };
        assert!(err.to_string().contains("already installed"));
    }

    #[test]
    fn test_missing_constructor_display() {
        let err = RegistryError::MissingConstructor {
            symbol: "_berth_plugin_create".to_string(),
        };
        assert!(err.to_string().contains("_berth_plugin_create"));
    }

    #[test]
    fn test_config_io_display_names_path() {
        let err = RegistryError::ConfigIo {
            path: PathBuf::from("/cfg/echo.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/cfg/echo.toml"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RegistryError = io_err.into();
        assert!(matches!(err, RegistryError::Io(_)));
    }

    #[test]
    fn test_plugin_error_conversion() {
        let plugin_err = berth_plugin_api::PluginError::custom("init blew up");
        let err: RegistryError = plugin_err.into();
        assert!(matches!(err, RegistryError::Plugin(_)));
        assert!(err.to_string().contains("init blew up"));
    }
}
