//! HorizonMaps CLI - Command-line interface
//!
//! Fetches routes from a directions service and runs turn-by-turn guidance
//! against simulated or recorded position tracks.

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use horizonmaps::config::{config_file_path, ConfigFile};
use horizonmaps::logging;

use commands::config::ConfigCommands;
use commands::guide::{ReplayArgs, SimulateArgs};
use commands::route::RouteArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "horizonmaps", version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long = "config", global = true, value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Log filter, overriding logging.level (RUST_LOG still wins)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a route and print its steps
    Route(RouteArgs),

    /// Guide along a route with a simulated drive
    Simulate(SimulateArgs),

    /// Guide along a saved route using a recorded track
    Replay(ReplayArgs),

    /// View or edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config_file.unwrap_or_else(config_file_path);

    // Config commands skip logging setup.
    if let Commands::Config(command) = cli.command {
        return commands::config::run(command, &config_path);
    }

    let mut config = ConfigFile::load_from(&config_path)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let log_guard = logging::init_logging(&config.logging)?;

    tracing::debug!(
        version = horizonmaps::VERSION,
        config = %config_path.display(),
        log_file = log_guard.has_file(),
        "HorizonMaps starting"
    );

    match cli.command {
        Commands::Route(args) => commands::route::run(args, &config),
        Commands::Simulate(args) => commands::guide::run_simulate(args, &config),
        Commands::Replay(args) => commands::guide::run_replay(args, &config),
        Commands::Config(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_route_command() {
        let cli = Cli::try_parse_from([
            "horizonmaps",
            "route",
            "--from",
            "4.6531,-74.0837",
            "--to",
            "4.6600,-74.0700",
            "--profile",
            "walking",
        ])
        .unwrap();
        match cli.command {
            Commands::Route(args) => {
                assert_eq!(args.from.lat, 4.6531);
                assert_eq!(args.to.lon, -74.07);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_simulate_route_conflicts_with_from() {
        let result = Cli::try_parse_from([
            "horizonmaps",
            "simulate",
            "--route",
            "route.json",
            "--from",
            "0,0",
            "--to",
            "0,1",
        ]);
        assert!(result.is_err());
    }
}
