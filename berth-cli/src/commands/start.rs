//! Install and start a plugin

use anyhow::Result;
use berth_core::{PluginRegistry, RegistryConfig};
use clap::Args;

/// Start arguments
#[derive(Args)]
pub struct StartArgs {
    /// Plugin name to start
    pub name: String,
}

/// Run start command
pub fn run(args: StartArgs) -> Result<()> {
    let registry = PluginRegistry::new(RegistryConfig::default());
    start(&registry, &args.name)
}

fn start(registry: &PluginRegistry, name: &str) -> Result<()> {
    let plugin = registry.install(name)?;
    registry.start(name)?;

    println!(
        "Started plugin: {} v{} ({})",
        plugin.name(),
        plugin.version(),
        plugin.state()
    );

    registry.shutdown();
    Ok(())
}
