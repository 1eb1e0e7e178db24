//! The `snipx` command-line application.
//!
//! Wires the environment-backed host into the snippet searcher and exposes
//! the `get`, `invoke` and `roots` commands.

pub mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::{handle_get_command, handle_invoke_command, handle_roots_command};

/// The main entry point for the `snipx` application.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    snipx_host::apply_config_to_env().context("loading snipx config file")?;

    match cli.command {
        Commands::Get {
            names,
            package,
            no_help,
            json,
        } => handle_get_command(names, package, !no_help, json).map(|()| ExitCode::SUCCESS),
        Commands::Invoke {
            name,
            package,
            params,
            dry_run,
        } => handle_invoke_command(name, package, params, dry_run),
        Commands::Roots { json } => handle_roots_command(json).map(|()| ExitCode::SUCCESS),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
