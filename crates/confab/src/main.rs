// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confab - near-real-time conversation event delivery.
//!
//! This is the binary entry point for the Confab server.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod serve;

/// Confab - near-real-time conversation event delivery.
#[derive(Parser, Debug)]
#[command(name = "confab", version, about, long_about = None)]
struct Cli {
    /// Path to a config file (overrides the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Confab delivery server.
    Serve,
    /// Load and validate the configuration, then exit.
    Check,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let load_result = match &cli.config {
        Some(path) => confab_config::load_and_validate_path(path),
        None => confab_config::load_and_validate(),
    };
    let config = match load_result {
        Ok(config) => config,
        Err(errors) => {
            confab_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Check) => {
            println!(
                "configuration OK (service.name={}, gateway={}:{})",
                config.service.name, config.gateway.host, config.gateway.port
            );
        }
        None => {
            println!("confab: use --help for available commands");
        }
    }
}
