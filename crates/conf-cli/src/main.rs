//! config-center CLI
//!
//! The command-line interface for inspecting and changing configuration
//! through the engine.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use conf_core::{ConfigEngine, EnginePaths};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    let paths = match &cli.prefix {
        Some(prefix) => EnginePaths::under_prefix(prefix),
        None => EnginePaths::discover(),
    };
    let engine = ConfigEngine::new(paths);

    match cli.command {
        Commands::List { appid, resource } => commands::run_list(&engine, appid, resource),
        Commands::Get {
            target,
            key,
            method,
        } => commands::run_get(&engine, &target, key.as_deref(), &method),
        Commands::Set { target, key, value } => {
            commands::run_set(&engine, &target, &key, &value)
        }
        Commands::Reset { target, key } => {
            commands::run_reset(&engine, &target, key.as_deref())
        }
        Commands::Watch { target, key } => {
            commands::run_watch(&engine, &target, key.as_deref())
        }
        Commands::Export { target } => commands::run_export(&engine, &target),
    }
}
