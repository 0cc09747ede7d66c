//! Isolated plugin loading over dynamic libraries
//!
//! Every installed plugin owns one loader wrapping one library mapping, so
//! plugins never share symbol resolution. Constructors resolve from the
//! loader's cache first, then from the archive itself; anything the archive
//! imports was bound against the host process when the mapping was created.
//! Closing the loader drops the mapping and empties the cache.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use libloading::Library;

use berth_plugin_api::{API_VERSION_SYMBOL, Plugin};

use super::archive;
use super::error::RegistryError;

/// Constructor signature exported by plugin archives
type PluginConstructor = extern "C" fn() -> *mut dyn Plugin;

/// One open plugin archive.
///
/// Implementations own the underlying mapping. `close` must be idempotent,
/// and a closed loader refuses further resolution; instances it already
/// produced stay alive until their owner drops them.
pub trait PluginLoader: Send {
    /// API version the archive was built against
    fn api_version(&self) -> Result<u32, RegistryError>;

    /// Resolve the constructor symbol and build an instance
    fn instantiate(&mut self, entry: &str) -> Result<Box<dyn Plugin>, RegistryError>;

    /// Release the mapping. No-op when already closed.
    fn close(&mut self);

    /// Whether `close` has run
    fn is_closed(&self) -> bool;
}

/// Factory for opening plugin archives.
///
/// Enables dependency injection of loader implementations.
pub trait LoaderFactory: Send + Sync {
    /// Open an archive for loading
    fn open(&self, path: &Path) -> Result<Box<dyn PluginLoader>, RegistryError>;

    /// Discover the constructor entry point in an archive
    fn discover(&self, path: &Path) -> Result<String, RegistryError>;
}

/// Production loader over `libloading`.
///
/// Two loaders opened on the same path are distinct mappings with distinct
/// caches; the same symbol name in two archives never collides.
pub struct DylibLoader {
    path: PathBuf,
    library: Option<Library>,
    /// Constructors already resolved by this loader
    constructors: HashMap<String, PluginConstructor>,
}

impl DylibLoader {
    /// Open the archive at `path`
    pub fn open(path: &Path) -> Result<Self, RegistryError> {
        archive::validate_archive(path)?;

        // SAFETY: loading runs the archive's initialization code. The path
        // has been validated and names an archive the operator asked for.
        let library = unsafe { Library::new(path)? };

        tracing::debug!(archive = %path.display(), "Plugin archive opened");
        Ok(Self {
            path: path.to_path_buf(),
            library: Some(library),
            constructors: HashMap::new(),
        })
    }

    fn library(&self) -> Result<&Library, RegistryError> {
        self.library.as_ref().ok_or_else(|| {
            RegistryError::Unexpected(format!("loader for {} is closed", self.path.display()))
        })
    }
}

impl PluginLoader for DylibLoader {
    fn api_version(&self) -> Result<u32, RegistryError> {
        let library = self.library()?;

        // SAFETY: the version symbol is a plain `extern "C" fn() -> u32`.
        let version_fn: libloading::Symbol<extern "C" fn() -> u32> = unsafe {
            library
                .get(API_VERSION_SYMBOL.as_bytes())
                .map_err(|_| RegistryError::NotAPlugin {
                    path: self.path.clone(),
                })?
        };

        Ok(version_fn())
    }

    fn instantiate(&mut self, entry: &str) -> Result<Box<dyn Plugin>, RegistryError> {
        let create = match self.constructors.get(entry) {
            Some(cached) => *cached,
            None => {
                let library = self.library()?;

                // SAFETY: constructors follow the export_plugin! contract,
                // `extern "C" fn() -> *mut dyn Plugin`.
                let symbol: libloading::Symbol<PluginConstructor> = unsafe {
                    library.get(entry.as_bytes()).map_err(|_| {
                        RegistryError::MissingConstructor {
                            symbol: entry.to_string(),
                        }
                    })?
                };

                let create = *symbol;
                self.constructors.insert(entry.to_string(), create);
                create
            }
        };

        let raw = std::panic::catch_unwind(AssertUnwindSafe(|| create())).map_err(|_| {
            RegistryError::InstantiationFailed {
                reason: format!("constructor '{entry}' panicked"),
            }
        })?;

        if raw.is_null() {
            return Err(RegistryError::InstantiationFailed {
                reason: format!("constructor '{entry}' returned null"),
            });
        }

        // SAFETY: a non-null constructor result is a Box<dyn Plugin> released
        // to the host. The registry drops the instance before this loader
        // closes the mapping its vtable lives in.
        Ok(unsafe { Box::from_raw(raw) })
    }

    fn close(&mut self) {
        self.constructors.clear();
        if let Some(library) = self.library.take() {
            drop(library);
            tracing::debug!(archive = %self.path.display(), "Plugin archive closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.library.is_none()
    }
}

/// Production factory creating [`DylibLoader`]s
pub struct DylibLoaderFactory;

impl LoaderFactory for DylibLoaderFactory {
    fn open(&self, path: &Path) -> Result<Box<dyn PluginLoader>, RegistryError> {
        Ok(Box::new(DylibLoader::open(path)?))
    }

    fn discover(&self, path: &Path) -> Result<String, RegistryError> {
        archive::discover_entry(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.so");

        let result = DylibLoader::open(&path);
        assert!(matches!(result, Err(RegistryError::ArchiveNotFound { .. })));
    }

    #[test]
    fn test_open_rejects_garbage_library() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("garbage.{}", archive::platform_extension()));
        std::fs::write(&path, "not an archive").unwrap();

        let result = DylibLoader::open(&path);
        assert!(matches!(result, Err(RegistryError::LibraryLoad(_))));
    }

    #[test]
    fn test_factory_discover_missing_archive() {
        let dir = TempDir::new().unwrap();
        let factory = DylibLoaderFactory;

        let result = factory.discover(&dir.path().join("missing.so"));
        assert!(matches!(result, Err(RegistryError::ArchiveNotFound { .. })));
    }
}
