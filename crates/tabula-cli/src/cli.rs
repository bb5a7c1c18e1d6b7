//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tabula - Convert transaction files to and from normalized data
#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Tabular transaction data converter", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to ~/.config/tabula/settings.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a transaction file into normalized JSON
    Import {
        /// File to import (UTF-8)
        #[arg(short, long)]
        file: PathBuf,

        /// Source format: native-csv, native-tsv, alipay
        #[arg(long, default_value = "native-csv")]
        format: String,

        /// UTC offset for rows without a timezone, e.g. +08:00
        #[arg(long)]
        timezone: Option<String>,

        /// Currency for new accounts without a currency column
        #[arg(long)]
        currency: Option<String>,

        /// Output JSON file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a normalized JSON dataset as a native table
    Export {
        /// Dataset JSON with transactions, accounts, categories, tags
        #[arg(short, long)]
        input: PathBuf,

        /// Target format: native-csv, native-tsv
        #[arg(long, default_value = "native-csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
