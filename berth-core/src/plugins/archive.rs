//! Plugin archive validation and entry-point discovery
//!
//! An archive is a platform dynamic library. Discovery opens the archive in a
//! throwaway mapping, asks its descriptor symbol for the constructor name, and
//! falls back to probing conventional constructor symbols. The mapping is
//! closed again before any discovered constructor runs.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};

use libloading::Library;

use berth_plugin_api::{CREATE_SYMBOL, DESCRIPTOR_SYMBOL, Plugin};

use super::error::RegistryError;

/// Constructor symbols probed when an archive has no descriptor, in order.
/// The first name that resolves wins.
pub const CANDIDATE_SYMBOLS: &[&str] = &[CREATE_SYMBOL, "_plugin_create", "plugin_create"];

/// Dynamic library extension for the current platform
pub fn platform_extension() -> &'static str {
    if cfg!(target_os = "macos") {
        "dylib"
    } else if cfg!(target_os = "windows") {
        "dll"
    } else {
        "so"
    }
}

/// Extensions accepted as plugin archives on the current platform
pub fn accepted_extensions() -> Vec<&'static str> {
    if cfg!(target_os = "macos") {
        vec!["dylib", "so"]
    } else if cfg!(target_os = "windows") {
        vec!["dll"]
    } else {
        vec!["so"]
    }
}

/// Archive path used by convention-mode installs.
///
/// Plugins installed by name alone are expected at
/// `lib<name>_plugin.<ext>` inside the registry's plugin directory
/// (`<name>_plugin.dll` on Windows, no `lib` prefix).
pub fn conventional_archive_path(dir: &Path, name: &str) -> PathBuf {
    let ext = platform_extension();
    if cfg!(target_os = "windows") {
        dir.join(format!("{}_plugin.{}", name, ext))
    } else {
        dir.join(format!("lib{}_plugin.{}", name, ext))
    }
}

/// Derive a plugin name from an archive file name, undoing the
/// `lib<name>_plugin.<ext>` decoration where present. Returns `None` when
/// nothing is left after stripping.
pub fn archive_plugin_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let stem = stem.strip_suffix("_plugin").unwrap_or(stem);
    let stem = stem.strip_prefix("lib").unwrap_or(stem);
    if stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

/// Check that a path names a loadable plugin archive.
///
/// Runs before any open attempt: a missing or non-regular file is
/// [`RegistryError::ArchiveNotFound`], a wrong extension is
/// [`RegistryError::InvalidArchiveType`].
pub fn validate_archive(path: &Path) -> Result<(), RegistryError> {
    if !path.is_file() {
        return Err(RegistryError::ArchiveNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !accepted_extensions().contains(&extension) {
        return Err(RegistryError::InvalidArchiveType {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// Discover the constructor entry point exported by an archive.
///
/// Preference order:
/// 1. The descriptor symbol, when exported: the first non-comment line of its
///    text names the constructor.
/// 2. A probe of [`CANDIDATE_SYMBOLS`].
///
/// Returns [`RegistryError::EntryPointNotFound`] when neither yields a name.
pub fn discover_entry(path: &Path) -> Result<String, RegistryError> {
    validate_archive(path)?;

    // SAFETY: the archive is only probed for well-known symbols; the mapping
    // is dropped before any discovered constructor runs.
    let library = unsafe { Library::new(path)? };

    if let Some(entry) = read_descriptor(&library) {
        tracing::debug!(archive = %path.display(), entry = %entry, "Entry point from descriptor");
        return Ok(entry);
    }

    for candidate in CANDIDATE_SYMBOLS {
        // SAFETY: existence probe only; the symbol is typed but never called.
        let resolves = unsafe {
            library
                .get::<extern "C" fn() -> *mut dyn Plugin>(candidate.as_bytes())
                .is_ok()
        };
        if resolves {
            tracing::debug!(archive = %path.display(), entry = %candidate, "Entry point from probe");
            return Ok((*candidate).to_string());
        }
    }

    Err(RegistryError::EntryPointNotFound {
        path: path.to_path_buf(),
    })
}

/// Read and parse the descriptor symbol, if the archive exports one
fn read_descriptor(library: &Library) -> Option<String> {
    // SAFETY: descriptors return a pointer to a static NUL-terminated string
    // inside the archive; it stays valid while the mapping is open.
    let text = unsafe {
        let descriptor: libloading::Symbol<extern "C" fn() -> *const c_char> =
            library.get(DESCRIPTOR_SYMBOL.as_bytes()).ok()?;
        let raw = descriptor();
        if raw.is_null() {
            return None;
        }
        CStr::from_ptr(raw).to_str().ok()?.to_string()
    };
    parse_descriptor(&text)
}

/// First line that is non-empty after trimming and not a `#` comment
fn parse_descriptor(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_missing_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.so");

        let result = validate_archive(&path);
        assert!(matches!(result, Err(RegistryError::ArchiveNotFound { .. })));
    }

    #[test]
    fn test_validate_directory_is_not_an_archive() {
        let dir = TempDir::new().unwrap();

        let result = validate_archive(dir.path());
        assert!(matches!(result, Err(RegistryError::ArchiveNotFound { .. })));
    }

    #[test]
    fn test_validate_rejects_wrong_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugin.txt");
        std::fs::write(&path, "not a library").unwrap();

        let result = validate_archive(&path);
        assert!(matches!(result, Err(RegistryError::InvalidArchiveType { .. })));
    }

    #[test]
    fn test_validate_accepts_platform_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("plugin.{}", platform_extension()));
        std::fs::write(&path, "stub").unwrap();

        assert!(validate_archive(&path).is_ok());
    }

    #[test]
    fn test_conventional_archive_path_embeds_name() {
        let path = conventional_archive_path(Path::new("/opt/plugins"), "echo");
        let file = path.file_name().and_then(|n| n.to_str()).unwrap();
        assert!(file.contains("echo_plugin"));
        assert!(file.ends_with(platform_extension()));
        assert!(path.starts_with("/opt/plugins"));
    }

    #[test]
    fn test_archive_plugin_name_roundtrips_convention() {
        let path = conventional_archive_path(Path::new("/opt/plugins"), "echo");
        assert_eq!(archive_plugin_name(&path), Some("echo".to_string()));
    }

    #[test]
    fn test_archive_plugin_name_plain_file() {
        assert_eq!(
            archive_plugin_name(Path::new("/opt/plugins/custom.so")),
            Some("custom".to_string())
        );
    }

    #[test]
    fn test_archive_plugin_name_empty_after_stripping() {
        assert_eq!(archive_plugin_name(Path::new("lib_plugin.so")), None);
    }

    #[test]
    fn test_discover_entry_missing_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.so");

        let result = discover_entry(&path);
        assert!(matches!(result, Err(RegistryError::ArchiveNotFound { .. })));
    }

    #[test]
    fn test_discover_entry_rejects_garbage_library() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(format!("garbage.{}", platform_extension()));
        std::fs::write(&path, "definitely not a shared object").unwrap();

        let result = discover_entry(&path);
        assert!(matches!(result, Err(RegistryError::LibraryLoad(_))));
    }

    #[test]
    fn test_parse_descriptor_plain_name() {
        assert_eq!(
            parse_descriptor("_berth_plugin_create"),
            Some("_berth_plugin_create".to_string())
        );
    }

    #[test]
    fn test_parse_descriptor_skips_comments_and_blanks() {
        let text = "# produced by export_plugin!\n\n  # contract v1\n  my_create_fn  \n_ignored";
        assert_eq!(parse_descriptor(text), Some("my_create_fn".to_string()));
    }

    #[test]
    fn test_parse_descriptor_all_comments_is_none() {
        assert_eq!(parse_descriptor("# nothing\n# here\n\n"), None);
        assert_eq!(parse_descriptor(""), None);
    }
}
