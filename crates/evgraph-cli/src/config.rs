//! CLI configuration
//!
//! Stored as TOML in `<config dir>/evgraph/config.toml`. The
//! `EVGRAPH_CONFIG` environment variable points at another file.

use std::path::PathBuf;

use anyhow::Context;
use evgraph_core::{LengthUnit, MomentumUnit};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "EVGRAPH_CONFIG";

/// Location of the config file
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("evgraph")
        .join("config.toml")
}

/// Output format used when neither the flag nor the config names one
pub const DEFAULT_FORMAT: &str = "table";

/// Where an effective setting comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    File,
    Default,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// One key with the value in effect for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub source: Source,
}

/// Configuration for the CLI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Decimals written for real fields by `convert`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<usize>,
    /// Momentum unit assumed for events without a unit record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum_unit: Option<MomentumUnit>,
    /// Length unit assumed for events without a unit record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_unit: Option<LengthUnit>,
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Config {
    /// Load the config file, falling back to defaults
    pub fn load() -> Self {
        let path = config_file_path();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["precision", "momentum_unit", "length_unit", "format"]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "precision" => self.precision.map(|p| p.to_string()),
            "momentum_unit" => self.momentum_unit.map(|u| u.to_string()),
            "length_unit" => self.length_unit.map(|u| u.to_string()),
            "format" => self.format.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "precision" => {
                let precision: usize = value
                    .parse()
                    .with_context(|| format!("Invalid precision '{}'", value))?;
                evgraph_io::limits::validate_precision(precision)?;
                self.precision = Some(precision);
            }
            "momentum_unit" => self.momentum_unit = Some(value.parse()?),
            "length_unit" => self.length_unit = Some(value.parse()?),
            "format" => match value {
                "table" | "json" => self.format = Some(value.to_string()),
                _ => anyhow::bail!("Unknown format '{}' (expected table or json)", value),
            },
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }

    /// Value in effect for `key`: the stored one, else the built-in default
    pub fn effective(&self, key: &str) -> Option<Setting> {
        let (momentum, length) = self.input_units();
        let fallback = match key {
            "precision" => evgraph_io::DEFAULT_PRECISION.to_string(),
            "momentum_unit" => momentum.to_string(),
            "length_unit" => length.to_string(),
            "format" => DEFAULT_FORMAT.to_string(),
            _ => return None,
        };
        let setting = match self.get(key) {
            Some(value) => Setting {
                key: key.to_string(),
                value,
                source: Source::File,
            },
            None => Setting {
                key: key.to_string(),
                value: fallback,
                source: Source::Default,
            },
        };
        Some(setting)
    }

    pub fn settings(&self) -> Vec<Setting> {
        Self::keys()
            .iter()
            .filter_map(|key| self.effective(key))
            .collect()
    }

    /// Copy with every unset key filled from its default
    pub fn with_defaults(&self) -> Self {
        let (momentum, length) = self.input_units();
        Self {
            precision: Some(self.precision.unwrap_or(evgraph_io::DEFAULT_PRECISION)),
            momentum_unit: Some(momentum),
            length_unit: Some(length),
            format: Some(
                self.format
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
            ),
        }
    }

    /// Units for input files that carry no unit record
    pub fn input_units(&self) -> (MomentumUnit, LengthUnit) {
        (
            self.momentum_unit.unwrap_or_default(),
            self.length_unit.unwrap_or_default(),
        )
    }
}
