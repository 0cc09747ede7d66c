use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "berth", about = "Plugin host for dynamically loaded modules")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage plugin configuration
    Config(commands::config::ConfigArgs),
    /// Show plugin details
    Info(commands::info::InfoArgs),
    /// Install a plugin and report its state
    Install(commands::install::InstallArgs),
    /// List plugin archives and whether they install
    List(commands::list::ListArgs),
    /// Reload a plugin's configuration
    Reload(commands::reload::ReloadArgs),
    /// Install and start a plugin
    Start(commands::start::StartArgs),
    /// Run a plugin through install, start, and stop
    Stop(commands::stop::StopArgs),
    /// Verify a plugin uninstalls cleanly
    Uninstall(commands::uninstall::UninstallArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Config(args) => commands::config::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Install(args) => commands::install::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Reload(args) => commands::reload::run(args),
        Commands::Start(args) => commands::start::run(args),
        Commands::Stop(args) => commands::stop::run(args),
        Commands::Uninstall(args) => commands::uninstall::run(args),
    }
}
