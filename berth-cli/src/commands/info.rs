//! Show plugin details

use std::path::PathBuf;

use anyhow::Result;
use berth_core::{PluginRegistry, RegistryConfig};
use berth_plugin_api::API_VERSION;
use clap::Args;

/// Info arguments
#[derive(Args)]
pub struct InfoArgs {
    /// Plugin name
    pub name: String,

    /// Archive path; defaults to the conventionally named library
    #[arg(long)]
    pub archive: Option<PathBuf>,
}

/// Run info command
pub fn run(args: InfoArgs) -> Result<()> {
    let registry = PluginRegistry::new(RegistryConfig::default());
    info(&registry, &args)
}

fn info(registry: &PluginRegistry, args: &InfoArgs) -> Result<()> {
    let result = match &args.archive {
        Some(archive) => registry.install_from(&args.name, archive, None),
        None => registry.install(&args.name),
    };

    let plugin = match result {
        Ok(plugin) => plugin,
        Err(e) => {
            println!("Plugin '{}' failed to install: {}", args.name, e);
            println!();
            println!("Run 'berth list' to see which archives load.");
            return Ok(());
        }
    };

    println!("Name:     {}", plugin.name());
    println!("Version:  {}", plugin.version());
    println!("State:    {}", plugin.state());
    println!("Host API: {}", API_VERSION);

    let values = registry.configuration(&args.name);
    if !values.is_empty() {
        println!();
        println!("Configuration:");
        let mut keys: Vec<&String> = values.keys().collect();
        keys.sort();
        for key in keys {
            println!("  {} = {}", key, values[key]);
        }
    }

    registry.shutdown();
    Ok(())
}
