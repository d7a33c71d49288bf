// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Dataset loading - the in-memory catalog every command reads from
//!
//! Datasets are loaded concurrently from a directory or an HTTP base URL.
//! A dataset that fails to load is logged and left out; the rest of the
//! catalog stays usable.

use crate::types::{
    Device, ErrorCodeEntry, EuPrices, IcRecord, KeyCombination, Measurement, PowerStation,
    RegionalCode, UkrainePrices,
};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Device list
pub const DEVICES_FILE: &str = "devices.json";
/// Article → UAH price table
pub const UKRAINE_PRICES_FILE: &str = "ukraine_prices.json";
/// Article → EUR price table
pub const EU_PRICES_FILE: &str = "eu_prices.json";
/// IC compatibility table
pub const IC_FILE: &str = "ic_compatibility.json";
/// Error codes
pub const ERROR_CODES_FILE: &str = "error_codes.json";
/// Power rail measurements
pub const MEASUREMENTS_FILE: &str = "measurements.json";
/// Key combinations
pub const KEY_COMBINATIONS_FILE: &str = "key_combinations.json";
/// Power stations
pub const POWER_STATIONS_FILE: &str = "power-stations.json";
/// Prefix shared by all regional code files
pub const REGIONAL_CODES_PREFIX: &str = "regional_codes";

/// Errors raised while loading datasets
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Dataset file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Dataset could not be fetched over HTTP
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        /// Requested URL
        url: String,
        /// Underlying HTTP error
        #[source]
        source: reqwest::Error,
    },

    /// Dataset server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Dataset is not valid JSON of the expected shape
    #[error("Failed to parse {name}: {source}")]
    Parse {
        /// Dataset file name
        name: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The dataset source itself is unusable
    #[error("Invalid dataset source: {0}")]
    InvalidSource(String),
}

/// Where datasets are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Local directory holding the JSON files
    Dir(PathBuf),
    /// HTTP base URL serving the JSON files
    Http(Url),
}

impl DataSource {
    /// Parse a directory path or an `http(s)://` URL
    pub fn parse(s: &str) -> Result<Self, CatalogError> {
        let scheme = s.get(..8).unwrap_or(s).to_ascii_lowercase();
        if scheme.starts_with("http://") || scheme.starts_with("https://") {
            // Url::join drops the last segment unless the base ends with '/'
            let base = if s.ends_with('/') { s.to_string() } else { format!("{s}/") };
            let url = Url::parse(&base).map_err(|e| CatalogError::InvalidSource(format!("{s}: {e}")))?;
            Ok(Self::Http(url))
        } else if s.trim().is_empty() {
            Err(CatalogError::InvalidSource("empty path".into()))
        } else {
            Ok(Self::Dir(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dir(path) => write!(f, "{}", path.display()),
            Self::Http(url) => write!(f, "{url}"),
        }
    }
}

/// Reads raw dataset bodies from a [`DataSource`]
struct Fetcher {
    source: DataSource,
    client: reqwest::Client,
}

impl Fetcher {
    fn new(source: DataSource) -> Self {
        Self {
            source,
            client: reqwest::Client::new(),
        }
    }

    async fn read(&self, name: &str) -> Result<String, CatalogError> {
        match &self.source {
            DataSource::Dir(dir) => {
                let path = dir.join(name);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| CatalogError::Read { path, source })
            }
            DataSource::Http(base) => {
                let url = base
                    .join(name)
                    .map_err(|e| CatalogError::InvalidSource(e.to_string()))?;
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|source| CatalogError::Fetch { url: url.to_string(), source })?;
                if !response.status().is_success() {
                    return Err(CatalogError::Status {
                        url: url.to_string(),
                        status: response.status().as_u16(),
                    });
                }
                response
                    .text()
                    .await
                    .map_err(|source| CatalogError::Fetch { url: url.to_string(), source })
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, name: &str) -> Result<T, CatalogError> {
        let body = self.read(name).await?;
        serde_json::from_str(&body).map_err(|source| CatalogError::Parse {
            name: name.to_string(),
            source,
        })
    }

    /// Fetch a dataset, degrading any failure to `None`
    async fn optional<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        match self.fetch(name).await {
            Ok(data) => {
                debug!("Loaded {}", name);
                Some(data)
            }
            Err(e) => {
                warn!("Dataset unavailable: {}", e);
                None
            }
        }
    }

    /// Names of every regional code file the source offers
    async fn regional_code_files(&self) -> Vec<String> {
        let DataSource::Dir(dir) = &self.source else {
            return vec![format!("{REGIONAL_CODES_PREFIX}.json")];
        };

        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list {}: {}", dir.display(), e);
                return names;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(REGIONAL_CODES_PREFIX) && name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();
        names
    }

    async fn regional_codes(&self) -> Option<Vec<RegionalCode>> {
        let files = self.regional_code_files().await;
        let loads = files.iter().map(|name| self.optional::<Vec<RegionalCode>>(name));
        let parts: Vec<Vec<RegionalCode>> = join_all(loads).await.into_iter().flatten().collect();

        if parts.is_empty() {
            return None;
        }

        let mut seen = HashSet::new();
        Some(
            parts
                .into_iter()
                .flatten()
                .filter(|c| seen.insert(c.code.to_uppercase()))
                .collect(),
        )
    }
}

/// All datasets, each `None` when it failed to load
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Where the datasets came from
    pub source: Option<DataSource>,
    /// Devices
    pub devices: Option<Vec<Device>>,
    /// UAH price table
    pub ukraine_prices: Option<UkrainePrices>,
    /// EUR price table
    pub eu_prices: Option<EuPrices>,
    /// IC compatibility
    pub ics: Option<Vec<IcRecord>>,
    /// Error codes
    pub error_codes: Option<Vec<ErrorCodeEntry>>,
    /// Power rail measurements
    pub measurements: Option<Vec<Measurement>>,
    /// Key combinations
    pub key_combinations: Option<Vec<KeyCombination>>,
    /// Regional codes merged from every regional code file
    pub regional_codes: Option<Vec<RegionalCode>>,
    /// Power stations
    pub power_stations: Option<Vec<PowerStation>>,
}

/// Load state of one dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatus {
    /// Dataset name
    pub name: &'static str,
    /// Whether it loaded
    pub loaded: bool,
    /// Record count (0 when not loaded)
    pub records: usize,
}

impl Catalog {
    /// Load every dataset from `source` concurrently
    pub async fn load(source: DataSource) -> Self {
        let fetcher = Fetcher::new(source.clone());

        let (
            devices,
            ukraine_prices,
            eu_prices,
            ics,
            error_codes,
            measurements,
            key_combinations,
            regional_codes,
            power_stations,
        ) = tokio::join!(
            fetcher.optional(DEVICES_FILE),
            fetcher.optional(UKRAINE_PRICES_FILE),
            fetcher.optional(EU_PRICES_FILE),
            fetcher.optional(IC_FILE),
            fetcher.optional(ERROR_CODES_FILE),
            fetcher.optional(MEASUREMENTS_FILE),
            fetcher.optional(KEY_COMBINATIONS_FILE),
            fetcher.regional_codes(),
            fetcher.optional(POWER_STATIONS_FILE),
        );

        Self {
            source: Some(source),
            devices,
            ukraine_prices,
            eu_prices,
            ics,
            error_codes,
            measurements,
            key_combinations,
            regional_codes,
            power_stations,
        }
    }

    /// Load from a directory, for callers without a runtime of their own
    pub fn load_dir_blocking(dir: &Path) -> Result<Self, CatalogError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CatalogError::InvalidSource(e.to_string()))?;
        Ok(runtime.block_on(Self::load(DataSource::Dir(dir.to_path_buf()))))
    }

    /// Devices, empty when not loaded
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        self.devices.as_deref().unwrap_or_default()
    }

    /// IC records, empty when not loaded
    #[must_use]
    pub fn ics(&self) -> &[IcRecord] {
        self.ics.as_deref().unwrap_or_default()
    }

    /// Error codes, empty when not loaded
    #[must_use]
    pub fn error_codes(&self) -> &[ErrorCodeEntry] {
        self.error_codes.as_deref().unwrap_or_default()
    }

    /// Measurements, empty when not loaded
    #[must_use]
    pub fn measurements(&self) -> &[Measurement] {
        self.measurements.as_deref().unwrap_or_default()
    }

    /// Key combinations, empty when not loaded
    #[must_use]
    pub fn key_combinations(&self) -> &[KeyCombination] {
        self.key_combinations.as_deref().unwrap_or_default()
    }

    /// Regional codes, empty when not loaded
    #[must_use]
    pub fn regional_codes(&self) -> &[RegionalCode] {
        self.regional_codes.as_deref().unwrap_or_default()
    }

    /// Power stations, empty when not loaded
    #[must_use]
    pub fn power_stations(&self) -> &[PowerStation] {
        self.power_stations.as_deref().unwrap_or_default()
    }

    /// UAH price for an article
    #[must_use]
    pub fn price_uah(&self, article: &str) -> Option<f64> {
        self.ukraine_prices.as_ref()?.get(article)?.price_uah
    }

    /// EUR price for an article
    #[must_use]
    pub fn price_eur(&self, article: &str) -> Option<f64> {
        self.eu_prices.as_ref()?.get(article)?.price_eur
    }

    /// Load state of every dataset
    #[must_use]
    pub fn summary(&self) -> Vec<DatasetStatus> {
        fn status(name: &'static str, count: Option<usize>) -> DatasetStatus {
            DatasetStatus {
                name,
                loaded: count.is_some(),
                records: count.unwrap_or(0),
            }
        }

        vec![
            status("devices", self.devices.as_ref().map(Vec::len)),
            status("ukraine_prices", self.ukraine_prices.as_ref().map(|p| p.len())),
            status("eu_prices", self.eu_prices.as_ref().map(|p| p.len())),
            status("ic_compatibility", self.ics.as_ref().map(Vec::len)),
            status("error_codes", self.error_codes.as_ref().map(Vec::len)),
            status("measurements", self.measurements.as_ref().map(Vec::len)),
            status("key_combinations", self.key_combinations.as_ref().map(Vec::len)),
            status("regional_codes", self.regional_codes.as_ref().map(Vec::len)),
            status("power_stations", self.power_stations.as_ref().map(Vec::len)),
        ]
    }
}
