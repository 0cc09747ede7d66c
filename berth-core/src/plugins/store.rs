//! Per-plugin configuration persistence
//!
//! One TOML file per plugin under the store root, holding a flat
//! string-to-string table. Loading never fails: a missing file is an empty
//! configuration, and an unreadable or malformed file is logged and treated
//! as empty. Saving reports IO failures to the caller.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::error::RegistryError;

/// Persistent key/value configuration, one TOML file per plugin
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    /// Create a store rooted at `root`. The directory is created on first
    /// save, not here.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The file backing a plugin's configuration
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.toml", name))
    }

    /// Load a plugin's configuration. Absent or broken files yield an empty
    /// map; this never fails.
    pub fn load(&self, name: &str) -> HashMap<String, String> {
        let path = self.path_for(name);

        if !path.exists() {
            tracing::debug!(plugin = %name, path = %path.display(), "No configuration file, starting empty");
            return HashMap::new();
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(plugin = %name, error = %e, "Failed to read configuration, starting empty");
                return HashMap::new();
            }
        };

        match toml::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(plugin = %name, error = %e, "Malformed configuration, starting empty");
                HashMap::new()
            }
        }
    }

    /// Save a plugin's configuration, creating the store root on demand.
    /// Keys are written in sorted order so files diff cleanly.
    pub fn save(&self, name: &str, values: &HashMap<String, String>) -> Result<(), RegistryError> {
        let path = self.path_for(name);

        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent).map_err(|source| RegistryError::ConfigIo {
                path: path.clone(),
                source,
            })?;
        }

        let ordered: BTreeMap<&String, &String> = values.iter().collect();
        let content = toml::to_string_pretty(&ordered).map_err(|e| RegistryError::ConfigIo {
            path: path.clone(),
            source: std::io::Error::other(e),
        })?;

        std::fs::write(&path, content).map_err(|source| RegistryError::ConfigIo {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(plugin = %name, path = %path.display(), "Configuration saved");
        Ok(())
    }
}
