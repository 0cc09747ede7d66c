//! Verify a plugin uninstalls cleanly

use anyhow::Result;
use berth_core::{PluginRegistry, RegistryConfig};
use clap::Args;

/// Uninstall arguments
#[derive(Args)]
pub struct UninstallArgs {
    /// Plugin name to uninstall
    pub name: String,
}

/// Run uninstall command
pub fn run(args: UninstallArgs) -> Result<()> {
    let registry = PluginRegistry::new(RegistryConfig::default());
    uninstall(&registry, &args.name)
}

fn uninstall(registry: &PluginRegistry, name: &str) -> Result<()> {
    registry.install(name)?;
    registry.uninstall(name)?;

    println!("Plugin '{}' uninstalled cleanly", name);
    Ok(())
}
