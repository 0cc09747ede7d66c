//! Reload a plugin's configuration

use anyhow::Result;
use berth_core::{PluginRegistry, RegistryConfig};
use clap::Args;

/// Reload arguments
#[derive(Args)]
pub struct ReloadArgs {
    /// Plugin name to reload
    pub name: String,
}

/// Run reload command
pub fn run(args: ReloadArgs) -> Result<()> {
    let registry = PluginRegistry::new(RegistryConfig::default());
    reload(&registry, &args.name)
}

fn reload(registry: &PluginRegistry, name: &str) -> Result<()> {
    let plugin = registry.install(name)?;
    registry.reload_configuration(name)?;

    println!("Reloaded configuration for plugin: {}", name);

    let snapshot = plugin.context().config_snapshot();
    if snapshot.is_empty() {
        println!("The plugin sees no configuration values.");
    } else {
        println!("The plugin now sees:");
        let mut keys: Vec<&String> = snapshot.keys().collect();
        keys.sort();
        for key in keys {
            println!("  {} = {}", key, snapshot[key]);
        }
    }

    registry.shutdown();
    Ok(())
}
