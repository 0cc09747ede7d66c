//! XDG Base Directory paths for berth.
//!
//! CLI tools should use XDG paths for cross-platform consistency,
//! not platform-native paths. This matches tools like gh, docker, kubectl.

use std::path::PathBuf;

/// Get the berth config directory.
///
/// Returns `$XDG_CONFIG_HOME/berth` if set, otherwise `~/.config/berth`.
/// This is where per-plugin configuration files are stored.
///
/// # Examples
///
/// ```
/// use berth_paths::config_dir;
///
/// let config = config_dir();
/// let plugin_config_dir = config.join("plugins");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("berth")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/berth")
    } else {
        PathBuf::from(".config/berth")
    }
}

/// Get the berth data directory.
///
/// Returns `$XDG_DATA_HOME/berth` if set, otherwise `~/.local/share/berth`.
/// This is where installed plugin archives are stored.
///
/// # Examples
///
/// ```
/// use berth_paths::data_dir;
///
/// let data = data_dir();
/// let archive_dir = data.join("plugins");
/// ```
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("berth")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".local/share/berth")
    } else {
        PathBuf::from(".local/share/berth")
    }
}
