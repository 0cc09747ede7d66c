//! Manage persisted plugin configuration

use anyhow::Result;
use berth_core::{PluginRegistry, RegistryConfig};
use clap::{Args, Subcommand};

/// Configuration arguments
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Plugin name
        name: String,
        /// Configuration key
        key: String,
        /// Value to store
        value: String,
    },
    /// Read one configuration value
    Get {
        /// Plugin name
        name: String,
        /// Configuration key
        key: String,
    },
    /// List all configuration values
    List {
        /// Plugin name
        name: String,
    },
}

/// Run config command
pub fn run(args: ConfigArgs) -> Result<()> {
    let registry = PluginRegistry::new(RegistryConfig::default());

    match args.command {
        ConfigCommands::Set { name, key, value } => set_value(&registry, &name, &key, &value),
        ConfigCommands::Get { name, key } => get_value(&registry, &name, &key),
        ConfigCommands::List { name } => list_values(&registry, &name),
    }
}

fn set_value(registry: &PluginRegistry, name: &str, key: &str, value: &str) -> Result<()> {
    let mut values = registry.configuration(name);
    values.insert(key.to_string(), value.to_string());
    registry.save_configuration(name, &values)?;

    println!("Set {} for plugin '{}'", key, name);
    println!("Installed plugins pick this up on 'berth reload {}'.", name);
    Ok(())
}

fn get_value(registry: &PluginRegistry, name: &str, key: &str) -> Result<()> {
    match registry.configuration(name).get(key) {
        Some(value) => println!("{}", value),
        None => println!("{} is not set for plugin '{}'", key, name),
    }
    Ok(())
}

fn list_values(registry: &PluginRegistry, name: &str) -> Result<()> {
    let values = registry.configuration(name);

    if values.is_empty() {
        println!("No configuration for plugin '{}'", name);
        return Ok(());
    }

    let mut keys: Vec<&String> = values.keys().collect();
    keys.sort();
    for key in keys {
        println!("{} = {}", key, values[key]);
    }
    Ok(())
}
