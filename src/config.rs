// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Layers, lowest first: built-in defaults, the TOML config file, then
//! `REPAIRBASE_*` environment variables (`__` separates nested keys, e.g.
//! `REPAIRBASE_TRACKER__API_URL`). Command-line flags are applied on top by
//! the caller.

use crate::calculator::Region;
use crate::pricing::Rates;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Price tracker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the price history API
    #[serde(default)]
    pub api_url: Option<String>,
    /// Seconds between polls
    pub poll_interval_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            poll_interval_secs: 300,
        }
    }
}

/// Calculator defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Labor per line item, in the region currency
    pub labor_per_item: f64,
    /// Markup in percent
    pub margin_percent: f64,
    /// Default region
    pub region: Region,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            labor_per_item: 500.0,
            margin_percent: 30.0,
            region: Region::Ua,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for persistent state (error log, watchlists)
    pub data_dir: PathBuf,
    /// Dataset directory or HTTP base URL
    pub dataset: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Fixed exchange rates
    pub rates: Rates,
    /// Price tracker
    pub tracker: TrackerConfig,
    /// Calculator defaults
    pub calculator: CalculatorConfig,
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "hyperpolymath", "repairbase")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: project_dirs()
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".repairbase")),
            dataset: "data".to_string(),
            log_level: "info".to_string(),
            rates: Rates::default(),
            tracker: TrackerConfig::default(),
            calculator: CalculatorConfig::default(),
        }
    }
}

/// Default config file location
#[must_use]
pub fn default_path() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("repairbase.toml"))
}

/// Load configuration: defaults, then `path` (if it exists), then environment
pub fn load(path: &Path) -> Result<Config> {
    let defaults = toml::to_string(&Config::default()).context("Failed to serialize default config")?;

    let settings = config::Config::builder()
        .add_source(config::File::from_str(&defaults, config::FileFormat::Toml))
        .add_source(
            config::File::from(path)
                .format(config::FileFormat::Toml)
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix("REPAIRBASE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    let config: Config = settings
        .try_deserialize()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    if !config.rates.is_valid() {
        anyhow::bail!("Invalid configuration: exchange rates must be positive numbers");
    }

    Ok(config)
}

/// Look up a dotted key (`rates.usd_to_uah`) in the effective configuration
pub fn get_value(config: &Config, key: &str) -> Result<Option<toml::Value>> {
    let root = toml::Value::try_from(config).context("Failed to serialize config")?;
    Ok(key
        .split('.')
        .try_fold(&root, |node, part| node.get(part))
        .cloned())
}

/// Interpret a command-line value as the most specific TOML scalar
fn parse_scalar(raw: &str) -> toml::Value {
    if let Ok(b) = raw.parse::<bool>() {
        return toml::Value::Boolean(b);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return toml::Value::Float(f);
    }
    toml::Value::String(raw.to_string())
}

/// Set a dotted key in the config file at `path`, creating it if needed
///
/// The updated file must still load, otherwise nothing is written.
pub fn set_value(path: &Path, key: &str, raw: &str) -> Result<()> {
    let mut table: toml::Table = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("Failed to parse config {}", path.display()))?
    } else {
        toml::Table::new()
    };

    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, parents)) = parts.split_last() else {
        anyhow::bail!("Empty configuration key");
    };

    let mut node = &mut table;
    for part in parents {
        node = node
            .entry((*part).to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .with_context(|| format!("Configuration key {part} is not a table"))?;
    }

    // Floats stay floats even when typed without a decimal point
    let value = match (node.get(*leaf), parse_scalar(raw)) {
        (Some(toml::Value::Float(_)), toml::Value::Integer(i)) => {
            #[allow(clippy::cast_precision_loss)]
            let f = i as f64;
            toml::Value::Float(f)
        }
        (_, v) => v,
    };
    node.insert((*leaf).to_string(), value);

    let serialized = toml::to_string_pretty(&table).context("Failed to serialize config")?;
    let candidate: toml::Table = serialized.parse().context("Failed to re-read config")?;
    validate(&candidate, key)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, serialized).with_context(|| format!("Failed to write {}", path.display()))
}

/// Check `table` merged over defaults still forms a valid config
fn validate(table: &toml::Table, key: &str) -> Result<()> {
    let defaults = toml::to_string(&Config::default()).context("Failed to serialize default config")?;
    let overlay = toml::to_string(table).context("Failed to serialize config")?;

    let merged = config::Config::builder()
        .add_source(config::File::from_str(&defaults, config::FileFormat::Toml))
        .add_source(config::File::from_str(&overlay, config::FileFormat::Toml))
        .build()
        .and_then(|c| c.try_deserialize::<Config>())
        .with_context(|| format!("Invalid configuration value for {key}"))?;

    if get_value(&merged, key)?.is_none() {
        anyhow::bail!("Invalid configuration key: {key}");
    }
    if !merged.rates.is_valid() {
        anyhow::bail!("Invalid configuration: exchange rates must be positive numbers");
    }
    Ok(())
}
