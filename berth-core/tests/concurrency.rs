//! Concurrency tests for PluginRegistry
//!
//! These tests validate that per-plugin locking works correctly:
//! - Racing installs of the same name produce exactly one winner
//! - Lifecycle operations on the same plugin are serialized
//! - Operations on different plugins proceed in parallel
//! - List operations don't block on slow plugins

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use berth_core::plugins::archive;
use berth_core::plugins::{MockLoaderFactory, MockScript};
use berth_core::{InstalledPlugin, LifecycleState, PluginRegistry, RegistryConfig, RegistryError};

fn create_test_registry() -> (TempDir, Arc<PluginRegistry>, Arc<MockLoaderFactory>) {
    let dir = TempDir::new().unwrap();
    let config = RegistryConfig {
        plugin_dir: dir.path().join("plugins"),
        config_dir: dir.path().join("config"),
    };
    std::fs::create_dir_all(&config.plugin_dir).unwrap();
    let factory = Arc::new(MockLoaderFactory::new());
    let registry = Arc::new(PluginRegistry::with_factory(config, factory.clone()));
    (dir, registry, factory)
}

fn add_scripted_archive(
    dir: &TempDir,
    factory: &MockLoaderFactory,
    script: MockScript,
    file_name: &str,
) -> PathBuf {
    let path = dir
        .path()
        .join("plugins")
        .join(format!("{}.{}", file_name, archive::platform_extension()));
    std::fs::write(&path, b"fake library").unwrap();
    factory.script(&path, script);
    path
}

#[test]
fn concurrent_installs_of_same_name_yield_one_winner() {
    let (dir, registry, factory) = create_test_registry();
    let path = add_scripted_archive(&dir, &factory, MockScript::new("echo"), "echo");

    let mut handles = Vec::new();
    for _ in 0..4 {
        let registry = Arc::clone(&registry);
        let path = path.clone();
        handles.push(std::thread::spawn(move || {
            registry.install_from("echo", &path, None)
        }));
    }

    let results: Vec<Result<Arc<InstalledPlugin>, RegistryError>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(RegistryError::AlreadyInstalled { .. })))
        .count();

    assert_eq!(successes, 1, "Exactly one install must win");
    assert_eq!(conflicts, results.len() - 1, "Every loser must see a conflict");
    assert_eq!(registry.count(), 1);

    // Every loader opened by a losing install must have been closed;
    // only the winner's loader stays open
    assert_eq!(factory.closed_count(), factory.open_count() - 1);
}

#[test]
fn start_on_same_plugin_is_serialized_and_idempotent() {
    let (dir, registry, factory) = create_test_registry();
    let script = MockScript::new("echo").start_delay(Duration::from_millis(100));
    let probe = script.probe();
    let path = add_scripted_archive(&dir, &factory, script, "echo");

    registry.install_from("echo", &path, None).unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let registry = Arc::clone(&registry);
        handles.push(std::thread::spawn(move || registry.start("echo")));
    }

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    // The second caller waits for the first, then sees the started state
    // and returns without calling into the instance again
    assert_eq!(probe.start_calls(), 1);
    assert_eq!(registry.get("echo").unwrap().state(), LifecycleState::Started);
}

#[test]
fn starts_of_different_plugins_dont_block() {
    let (dir, registry, factory) = create_test_registry();
    let slow = MockScript::new("slow").start_delay(Duration::from_millis(100));
    let slow_path = add_scripted_archive(&dir, &factory, slow, "slow");
    let other = MockScript::new("other").start_delay(Duration::from_millis(100));
    let other_path = add_scripted_archive(&dir, &factory, other, "other");

    registry.install_from("slow", &slow_path, None).unwrap();
    registry.install_from("other", &other_path, None).unwrap();

    let start = Instant::now();

    let r1 = {
        let registry = Arc::clone(&registry);
        std::thread::spawn(move || registry.start("slow"))
    };
    let r2 = {
        let registry = Arc::clone(&registry);
        std::thread::spawn(move || registry.start("other"))
    };

    r1.join().unwrap().unwrap();
    r2.join().unwrap().unwrap();

    let elapsed = start.elapsed();

    // Serialized starts would take ~200ms; allow margin for scheduling
    assert!(
        elapsed < Duration::from_millis(150),
        "Concurrent starts should not block each other: took {:?}",
        elapsed
    );
}

#[test]
fn list_during_slow_start_does_not_block() {
    let (dir, registry, factory) = create_test_registry();
    let script = MockScript::new("slow").start_delay(Duration::from_millis(100));
    let path = add_scripted_archive(&dir, &factory, script, "slow");

    registry.install_from("slow", &path, None).unwrap();

    let start_handle = {
        let registry = Arc::clone(&registry);
        std::thread::spawn(move || registry.start("slow"))
    };

    // Give the start time to take the plugin's lock
    std::thread::sleep(Duration::from_millis(10));

    let start = Instant::now();
    let statuses = registry.list();
    let elapsed = start.elapsed();

    assert_eq!(statuses.len(), 1);
    assert!(elapsed < Duration::from_millis(20), "list blocked for {:?}", elapsed);

    start_handle.join().unwrap().unwrap();
}

#[test]
fn uninstall_waits_for_running_operation() {
    let (dir, registry, factory) = create_test_registry();
    let script = MockScript::new("slow").start_delay(Duration::from_millis(50));
    let probe = script.probe();
    let path = add_scripted_archive(&dir, &factory, script, "slow");

    registry.install_from("slow", &path, None).unwrap();

    let start_handle = {
        let registry = Arc::clone(&registry);
        std::thread::spawn(move || registry.start("slow"))
    };

    std::thread::sleep(Duration::from_millis(10));

    // Uninstall must block until the in-flight start finishes, then
    // destroy the instance and close the loader
    registry.uninstall("slow").unwrap();

    start_handle.join().unwrap().unwrap();

    assert!(registry.get("slow").is_none());
    assert_eq!(probe.start_calls(), 1);
    assert_eq!(probe.destroy_calls(), 1);
    assert_eq!(factory.closed_count(), 1);
}
