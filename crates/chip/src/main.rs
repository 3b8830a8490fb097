// SPDX-FileCopyrightText: 2026 Chip Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chip - webhook-driven SMS/iMessage assistant.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod config_check;
mod serve;

use std::path::PathBuf;

use chip_config::{ChipConfig, ConfigError};
use clap::{Parser, Subcommand};

/// Chip - webhook-driven SMS/iMessage assistant.
#[derive(Parser, Debug)]
#[command(name = "chip", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server (default).
    Serve,
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Load and validate configuration, then print a redacted summary.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            chip_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("chip: {e}");
                std::process::exit(1);
            }
        }
        Commands::Config {
            action: ConfigAction::Check,
        } => {
            println!("{}", config_check::summary(&config));
        }
    }
}

fn load(path: Option<&std::path::Path>) -> Result<ChipConfig, Vec<ConfigError>> {
    match path {
        Some(path) => chip_config::load_and_validate_path(path),
        None => chip_config::load_and_validate(),
    }
}
