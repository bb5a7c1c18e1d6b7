//! Converter settings
//!
//! Values the conversion engine needs from its caller but that no source
//! file carries: the owner of imported data, the currency for accounts
//! created without one, and the UTC offset for rows without a timezone.
//!
//! ## Configuration Resolution
//!
//! 1. An explicit path, when given (a missing file is an error)
//! 2. The per-user override (~/.config/tabula/settings.toml on Linux)
//! 3. Embedded defaults (compiled into binary)
//!
//! Keys omitted from a file keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::currency::is_supported_currency;
use crate::datetime::parse_timezone_offset;
use crate::models::User;

/// Embedded default settings (compiled into binary)
const DEFAULT_SETTINGS: &str = include_str!("../config/settings.toml");

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unsupported default currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Invalid default timezone: {0} (expected ±HH:MM)")]
    InvalidTimezone(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterSettings {
    pub owner_uid: i64,
    /// ISO 4217 code
    pub default_currency: String,
    /// Signed `±HH:MM` offset text
    pub default_timezone: String,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            owner_uid: 1,
            default_currency: "USD".to_string(),
            default_timezone: "+00:00".to_string(),
        }
    }
}

impl ConverterSettings {
    /// Load settings following the resolution order above
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let content = match path {
            Some(path) => read_settings(path)?,
            None => match default_settings_path().filter(|path| path.exists()) {
                Some(path) => read_settings(&path)?,
                None => DEFAULT_SETTINGS.to_string(),
            },
        };

        Self::from_toml(&content)
    }

    /// Parse and validate settings TOML
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let raw: RawSettings = toml::from_str(content)?;

        let mut settings = Self::default();

        if let Some(owner) = raw.owner {
            if let Some(uid) = owner.uid {
                settings.owner_uid = uid;
            }
        }

        if let Some(defaults) = raw.defaults {
            if let Some(currency) = defaults.currency {
                settings.default_currency = currency;
            }
            if let Some(timezone) = defaults.timezone {
                settings.default_timezone = timezone;
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !is_supported_currency(&self.default_currency) {
            return Err(SettingsError::UnsupportedCurrency(
                self.default_currency.clone(),
            ));
        }

        self.utc_offset_minutes()?;
        Ok(())
    }

    /// Default timezone as minutes east of UTC
    pub fn utc_offset_minutes(&self) -> Result<i32, SettingsError> {
        parse_timezone_offset(&self.default_timezone)
            .ok_or_else(|| SettingsError::InvalidTimezone(self.default_timezone.clone()))
    }

    /// The owner of conversions run with these settings
    pub fn user(&self) -> User {
        User {
            uid: self.owner_uid,
            default_currency: self.default_currency.clone(),
        }
    }
}

/// Per-user settings override path
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tabula").join("settings.toml"))
}

fn read_settings(path: &Path) -> Result<String, SettingsError> {
    debug!(path = %path.display(), "loading converter settings");

    fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    owner: Option<RawOwner>,
    defaults: Option<RawDefaults>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    uid: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    currency: Option<String>,
    timezone: Option<String>,
}
