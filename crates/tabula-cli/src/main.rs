//! Tabula CLI - Transaction data converter
//!
//! Usage:
//!   tabula import --file F --format alipay     Convert a file to normalized JSON
//!   tabula export --input DATASET.json         Write normalized data as CSV/TSV

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    match cli.command {
        Commands::Import {
            file,
            format,
            timezone,
            currency,
            output,
        } => commands::cmd_import(
            cli.config.as_deref(),
            &file,
            &format,
            timezone,
            currency,
            output.as_deref(),
        ),
        Commands::Export {
            input,
            format,
            output,
        } => commands::cmd_export(&input, &format, output.as_deref()),
    }
}
