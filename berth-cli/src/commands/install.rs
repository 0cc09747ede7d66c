//! Install a plugin and report its state

use std::path::PathBuf;

use anyhow::Result;
use berth_core::{PluginRegistry, RegistryConfig};
use clap::Args;

/// Install arguments
#[derive(Args)]
pub struct InstallArgs {
    /// Plugin name to install
    pub name: String,

    /// Archive path; defaults to the conventionally named library in the
    /// plugin directory
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Entry point symbol; defaults to the one the archive advertises
    #[arg(long)]
    pub entry: Option<String>,
}

/// Run install command
pub fn run(args: InstallArgs) -> Result<()> {
    let registry = PluginRegistry::new(RegistryConfig::default());
    install(&registry, &args)
}

fn install(registry: &PluginRegistry, args: &InstallArgs) -> Result<()> {
    let plugin = match &args.archive {
        Some(archive) => registry.install_from(&args.name, archive, args.entry.as_deref())?,
        None => registry.install(&args.name)?,
    };

    println!(
        "Installed plugin: {} v{} ({})",
        plugin.name(),
        plugin.version(),
        plugin.state()
    );

    registry.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::plugins::archive;
    use berth_core::plugins::{MockLoaderFactory, MockScript};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_install_args_parsing() {
        use clap::Parser;

        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            args: InstallArgs,
        }

        let cli = TestCli::parse_from(["test", "echo"]);
        assert_eq!(cli.args.name, "echo");
        assert!(cli.args.archive.is_none());
        assert!(cli.args.entry.is_none());

        let cli = TestCli::parse_from([
            "test",
            "echo",
            "--archive",
            "/tmp/libecho_plugin.so",
            "--entry",
            "my_create",
        ]);
        assert_eq!(cli.args.archive, Some(PathBuf::from("/tmp/libecho_plugin.so")));
        assert_eq!(cli.args.entry.as_deref(), Some("my_create"));
    }

    #[test]
    fn test_install_reports_and_tears_down() {
        let dir = TempDir::new().unwrap();
        let config = RegistryConfig {
            plugin_dir: dir.path().join("plugins"),
            config_dir: dir.path().join("config"),
        };
        std::fs::create_dir_all(&config.plugin_dir).unwrap();

        let path = archive::conventional_archive_path(&config.plugin_dir, "echo");
        std::fs::write(&path, b"fake library").unwrap();

        let factory = Arc::new(MockLoaderFactory::new());
        factory.script(&path, MockScript::new("echo"));
        let registry = PluginRegistry::with_factory(config, factory.clone());

        let args = InstallArgs {
            name: "echo".to_string(),
            archive: None,
            entry: None,
        };
        install(&registry, &args).unwrap();

        // The command hosts the plugin only for its own duration
        assert_eq!(registry.count(), 0);
        assert_eq!(factory.closed_count(), 1);
    }
}
