//! Shared command utilities
//!
//! This module contains:
//! - `load_settings` - Resolve converter settings with CLI overrides
//! - `SourceFormat` - Format names accepted on the command line
//! - `write_output` - Write to a file or stdout

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use tabula_core::{ConverterSettings, NativeFormat};

/// File formats known to the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    NativeCsv,
    NativeTsv,
    Alipay,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeCsv => "native-csv",
            Self::NativeTsv => "native-tsv",
            Self::Alipay => "alipay",
        }
    }

    /// The native adapter for this format, if it is one
    pub fn native(&self) -> Option<NativeFormat> {
        match self {
            Self::NativeCsv => Some(NativeFormat::csv()),
            Self::NativeTsv => Some(NativeFormat::tsv()),
            Self::Alipay => None,
        }
    }
}

impl FromStr for SourceFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "native-csv" | "csv" => Ok(Self::NativeCsv),
            "native-tsv" | "tsv" => Ok(Self::NativeTsv),
            "alipay" => Ok(Self::Alipay),
            _ => anyhow::bail!(
                "Unknown format: {}\nUse one of: native-csv, native-tsv, alipay",
                s
            ),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Load settings, then apply command-line overrides and re-validate
pub fn load_settings(
    config: Option<&Path>,
    timezone: Option<String>,
    currency: Option<String>,
) -> Result<ConverterSettings> {
    let mut settings = ConverterSettings::load(config).context("Failed to load settings")?;

    if let Some(timezone) = timezone {
        settings.default_timezone = timezone;
    }
    if let Some(currency) = currency {
        settings.default_currency = currency.to_uppercase();
    }

    settings.validate()?;
    Ok(settings)
}

/// Write `content` to `output`, or to stdout when no path is given.
/// Returns true when a file was written.
pub fn write_output(output: Option<&Path>, content: &str) -> Result<bool> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            Ok(true)
        }
        None => {
            print!("{}", content);
            Ok(false)
        }
    }
}
