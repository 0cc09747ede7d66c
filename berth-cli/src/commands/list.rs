//! List plugin archives and whether they install

use std::path::{Path, PathBuf};

use anyhow::Result;
use berth_core::plugins::archive;
use berth_core::{PluginRegistry, RegistryConfig};
use clap::Args;

/// List arguments
#[derive(Args)]
pub struct ListArgs {
    /// Directory to scan; defaults to the plugin directory
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Run list command
pub fn run(args: ListArgs) -> Result<()> {
    let config = RegistryConfig::default();
    let dir = args.dir.unwrap_or_else(|| config.plugin_dir.clone());
    let registry = PluginRegistry::new(config);
    list(&registry, &dir)
}

fn list(registry: &PluginRegistry, dir: &Path) -> Result<()> {
    let archives = scan_archives(dir)?;

    if archives.is_empty() {
        println!("No plugin archives in {}", dir.display());
        println!();
        println!("To install a plugin:");
        println!("  1. Build it: cargo build --release -p my-plugin");
        println!(
            "  2. Copy the library: cp target/release/libmy_plugin.so {}/",
            dir.display()
        );
        println!("  3. Check it loads: berth list");
        return Ok(());
    }

    for (name, path) in archives {
        match registry.install_from(&name, &path, None) {
            Ok(plugin) => {
                println!(
                    "✓ {} v{}    {}",
                    plugin.name(),
                    plugin.version(),
                    plugin.state()
                );
            }
            Err(e) => {
                println!("✗ {}    {}", name, e);
            }
        }
    }

    registry.shutdown();
    Ok(())
}

/// Archive files in a directory, as (derived name, path) pairs sorted by name
fn scan_archives(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();

    if !dir.exists() {
        return Ok(found);
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Error reading entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !archive::accepted_extensions().contains(&extension) {
            continue;
        }

        if let Some(name) = archive::archive_plugin_name(&path) {
            found.push((name, path));
        }
    }

    found.sort();
    Ok(found)
}
