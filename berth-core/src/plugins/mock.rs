//! Mock loader for testing
//!
//! MockLoaderFactory allows scripting plugin behavior for unit tests,
//! enabling fast, deterministic testing of registry logic without
//! building real plugin libraries.
//!
//! Register a [`MockScript`] per archive path before installing; the
//! factory hands out loaders that construct in-process plugin instances
//! following the script.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use berth_plugin_api::{API_VERSION, CREATE_SYMBOL, Plugin, PluginContext, PluginError};

use super::error::RegistryError;
use super::loader::{LoaderFactory, PluginLoader};

/// Call counters shared between a script and the instances made from it
#[derive(Default)]
pub struct MockProbe {
    init_calls: AtomicUsize,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    destroy_calls: AtomicUsize,
}

impl MockProbe {
    /// Number of times `init` was called
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    /// Number of times `start` was called
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// Number of times `stop` was called
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    /// Number of times `destroy` was called
    pub fn destroy_calls(&self) -> usize {
        self.destroy_calls.load(Ordering::SeqCst)
    }
}

/// Scripted behavior for one mock plugin
///
/// Defaults describe a well-behaved plugin: current API version,
/// conventional entry point, every lifecycle call succeeds. Builder
/// methods opt into specific failures.
#[derive(Clone)]
pub struct MockScript {
    name: String,
    version: String,
    api_version: u32,
    entry: String,
    fail_init: Option<String>,
    fail_start: Option<String>,
    fail_stop: Option<String>,
    missing_constructor: bool,
    panic_on_init: bool,
    panic_on_start: bool,
    start_delay: Option<Duration>,
    probe: Arc<MockProbe>,
}

impl MockScript {
    /// A well-behaved plugin with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: "0.1.0".to_string(),
            api_version: API_VERSION,
            entry: CREATE_SYMBOL.to_string(),
            fail_init: None,
            fail_start: None,
            fail_stop: None,
            missing_constructor: false,
            panic_on_init: false,
            panic_on_start: false,
            start_delay: None,
            probe: Arc::new(MockProbe::default()),
        }
    }

    /// Set the version the instance reports
    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Set the API version the loader reports
    pub fn api_version(mut self, version: u32) -> Self {
        self.api_version = version;
        self
    }

    /// Set the entry point the archive advertises and accepts
    pub fn entry(mut self, entry: &str) -> Self {
        self.entry = entry.to_string();
        self
    }

    /// Make `init` fail with the given message
    pub fn fail_init(mut self, message: &str) -> Self {
        self.fail_init = Some(message.to_string());
        self
    }

    /// Make `start` fail with the given message
    pub fn fail_start(mut self, message: &str) -> Self {
        self.fail_start = Some(message.to_string());
        self
    }

    /// Make `stop` fail with the given message
    pub fn fail_stop(mut self, message: &str) -> Self {
        self.fail_stop = Some(message.to_string());
        self
    }

    /// Make the loader fail to resolve any constructor symbol
    pub fn missing_constructor(mut self) -> Self {
        self.missing_constructor = true;
        self
    }

    /// Make `init` panic instead of returning
    pub fn panic_on_init(mut self) -> Self {
        self.panic_on_init = true;
        self
    }

    /// Make `start` panic instead of returning
    pub fn panic_on_start(mut self) -> Self {
        self.panic_on_start = true;
        self
    }

    /// Make `start` sleep before returning, for timing tests
    pub fn start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    /// The probe counting lifecycle calls on instances of this script
    pub fn probe(&self) -> Arc<MockProbe> {
        Arc::clone(&self.probe)
    }
}

/// In-process plugin instance following a script
struct MockPlugin {
    script: MockScript,
    context: Option<Arc<PluginContext>>,
}

impl Plugin for MockPlugin {
    fn name(&self) -> &str {
        &self.script.name
    }

    fn version(&self) -> &str {
        &self.script.version
    }

    fn init(&mut self, context: Arc<PluginContext>) -> Result<(), PluginError> {
        self.script.probe.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.script.panic_on_init {
            panic!("scripted panic in init");
        }
        if let Some(message) = &self.script.fail_init {
            return Err(PluginError::Custom(message.clone()));
        }
        self.context = Some(context);
        Ok(())
    }

    fn start(&mut self) -> Result<(), PluginError> {
        self.script.probe.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.script.panic_on_start {
            panic!("scripted panic in start");
        }
        if let Some(delay) = self.script.start_delay {
            std::thread::sleep(delay);
        }
        if let Some(message) = &self.script.fail_start {
            return Err(PluginError::Startup(message.clone()));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PluginError> {
        self.script.probe.stop_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.script.fail_stop {
            return Err(PluginError::Shutdown(message.clone()));
        }
        Ok(())
    }

    fn destroy(&mut self) {
        self.script.probe.destroy_calls.fetch_add(1, Ordering::SeqCst);
        self.context = None;
    }
}

/// Loader handing out instances of a scripted plugin
pub struct MockLoader {
    script: MockScript,
    closed: Arc<AtomicBool>,
}

impl PluginLoader for MockLoader {
    fn api_version(&self) -> Result<u32, RegistryError> {
        Ok(self.script.api_version)
    }

    fn instantiate(&mut self, entry: &str) -> Result<Box<dyn Plugin>, RegistryError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(RegistryError::Unexpected(
                "mock loader is closed".to_string(),
            ));
        }
        if self.script.missing_constructor || entry != self.script.entry {
            return Err(RegistryError::MissingConstructor {
                symbol: entry.to_string(),
            });
        }
        Ok(Box::new(MockPlugin {
            script: self.script.clone(),
            context: None,
        }))
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Factory for creating MockLoader instances
///
/// Tracks every loader it opens so tests can assert that loaders are
/// closed on the failure and uninstall paths.
#[derive(Default)]
pub struct MockLoaderFactory {
    scripts: Mutex<HashMap<PathBuf, MockScript>>,
    loaders: Mutex<Vec<(PathBuf, Arc<AtomicBool>)>>,
}

impl MockLoaderFactory {
    /// Create a new MockLoaderFactory with no scripts
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the plugin behavior behind an archive path
    pub fn script(&self, path: &Path, script: MockScript) {
        self.scripts
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), script);
    }

    /// Number of loaders opened through this factory
    pub fn open_count(&self) -> usize {
        self.loaders.lock().unwrap().len()
    }

    /// Number of opened loaders that have been closed
    pub fn closed_count(&self) -> usize {
        self.loaders
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, closed)| closed.load(Ordering::SeqCst))
            .count()
    }
}

impl LoaderFactory for MockLoaderFactory {
    fn open(&self, path: &Path) -> Result<Box<dyn PluginLoader>, RegistryError> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                RegistryError::Unexpected(format!("no mock script for {}", path.display()))
            })?;

        let closed = Arc::new(AtomicBool::new(false));
        self.loaders
            .lock()
            .unwrap()
            .push((path.to_path_buf(), Arc::clone(&closed)));

        Ok(Box::new(MockLoader { script, closed }))
    }

    fn discover(&self, path: &Path) -> Result<String, RegistryError> {
        let scripts = self.scripts.lock().unwrap();
        let script = scripts
            .get(path)
            .ok_or_else(|| RegistryError::EntryPointNotFound {
                path: path.to_path_buf(),
            })?;
        Ok(script.entry.clone())
    }
}
