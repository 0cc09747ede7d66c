//! Run a plugin through install, start, and stop

use anyhow::Result;
use berth_core::{PluginRegistry, RegistryConfig};
use clap::Args;

/// Stop arguments
#[derive(Args)]
pub struct StopArgs {
    /// Plugin name to exercise
    pub name: String,
}

/// Run stop command
pub fn run(args: StopArgs) -> Result<()> {
    let registry = PluginRegistry::new(RegistryConfig::default());
    stop(&registry, &args.name)
}

fn stop(registry: &PluginRegistry, name: &str) -> Result<()> {
    let plugin = registry.install(name)?;
    registry.start(name)?;
    registry.stop(name)?;

    println!(
        "Plugin {} v{} ran the full cycle ({})",
        plugin.name(),
        plugin.version(),
        plugin.state()
    );

    registry.shutdown();
    Ok(())
}
