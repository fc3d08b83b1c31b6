// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deskline - a customer support desk.
//!
//! This is the binary entry point: it loads configuration, then serves the
//! HTTP gateway, seeds sample data, or prints the effective config.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod seed;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use deskline_config::DesklineConfig;
use deskline_core::DesklineError;

const REDACTED: &str = "[redacted]";

/// Deskline - users, tickets, and the desk that serves them.
#[derive(Parser, Debug)]
#[command(name = "deskline", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway (JSON API and web pages).
    Serve,
    /// Insert sample users and tickets into an empty database.
    Seed,
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => deskline_config::load_and_validate_path(path),
        None => deskline_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            deskline_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Seed) => seed::run_seed(config).await,
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("deskline: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("deskline: {e}");
        std::process::exit(1);
    }
}

fn print_config(config: &DesklineConfig) -> Result<(), DesklineError> {
    print!("{}", redacted_toml(config)?);
    Ok(())
}

/// Render `config` as TOML with the upsert key and fallback password masked.
fn redacted_toml(config: &DesklineConfig) -> Result<String, DesklineError> {
    let mut shown = config.clone();
    if shown.identity.upsert_key.is_some() {
        shown.identity.upsert_key = Some(REDACTED.to_string());
    }
    shown.identity.fallback_password = REDACTED.to_string();
    toml::to_string_pretty(&shown)
        .map_err(|e| DesklineError::Config(format!("failed to render config: {e}")))
}
