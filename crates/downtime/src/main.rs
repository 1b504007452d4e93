// SPDX-FileCopyrightText: 2026 Downtime Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Downtime - machine stoppage resolution for the plant floor.
//!
//! This is the binary entry point for the Downtime service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod notify;
mod serve;
mod sweep;

/// Downtime - machine stoppage resolution for the plant floor.
#[derive(Parser, Debug)]
#[command(name = "downtime", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the stoppage workflow service.
    Serve,
    /// Run one expiration sweep and print the report.
    Sweep,
    /// Print the resolved configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match downtime_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            downtime_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(err) = serve::run(config).await {
                eprintln!("downtime serve failed: {err}");
                std::process::exit(1);
            }
        }
        Some(Commands::Sweep) => {
            if let Err(err) = sweep::run(config).await {
                eprintln!("downtime sweep failed: {err}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => print!("{rendered}"),
            Err(err) => {
                eprintln!("downtime config failed: {err}");
                std::process::exit(1);
            }
        },
        None => {
            println!("downtime: use --help for available commands");
        }
    }
}
