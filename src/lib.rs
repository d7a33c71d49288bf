// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repairbase library - reference desk for an Apple device repair shop
//!
//! This crate provides the catalog of devices, part prices, IC compatibility
//! and diagnostic tables, the repair-cost calculator, the error-suggestion
//! healer and the power-station price tracker client.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod calculator;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod healer;
pub mod output;
pub mod pricing;
pub mod search;
pub mod tracker;
pub mod watchlist;

/// Record types for the static datasets
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize};
    use std::collections::BTreeMap;

    // =========================================================================
    // Devices
    // =========================================================================

    /// A replaceable part of a device, keyed by part type in `Device::service_parts`
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct ServicePart {
        /// Vendor part number, joins against the regional price tables
        #[serde(default)]
        pub article: Option<String>,
        /// Reference price in USD
        #[serde(default)]
        pub price_usd: Option<f64>,
    }

    /// A device model in the catalog
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Device {
        /// Marketing name, e.g. "iPhone 13"
        pub name: String,
        /// Category, e.g. "iPhone", "MacBook Pro"
        #[serde(default)]
        pub category: String,
        /// Release year
        #[serde(default)]
        pub year: Option<u16>,
        /// SoC / processor
        #[serde(default)]
        pub processor: Option<String>,
        /// Logic board numbers, e.g. "820-02016"
        #[serde(default)]
        pub board_numbers: Vec<String>,
        /// Part type → part
        #[serde(default)]
        pub service_parts: BTreeMap<String, ServicePart>,
        /// Known failure patterns
        #[serde(default)]
        pub common_issues: Vec<String>,
        /// Free-form difficulty rating
        #[serde(default)]
        pub repair_difficulty: Option<String>,
    }

    // =========================================================================
    // Regional price tables
    // =========================================================================

    /// Entry of the Ukrainian price table (article → record)
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct PriceRecord {
        /// Price in UAH
        #[serde(default)]
        pub price_uah: Option<f64>,
        /// Supplier description
        #[serde(default)]
        pub description: Option<String>,
    }

    /// Entry of the EU price table (article → record)
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct EuPriceRecord {
        /// Price in EUR
        #[serde(default)]
        pub price_eur: Option<f64>,
        /// Supplier description
        #[serde(default)]
        pub description: Option<String>,
    }

    /// Article → UAH price
    pub type UkrainePrices = BTreeMap<String, PriceRecord>;

    /// Article → EUR price
    pub type EuPrices = BTreeMap<String, EuPriceRecord>;

    // =========================================================================
    // Reference tables
    // =========================================================================

    /// IC (chip) compatibility record
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct IcRecord {
        /// Chip name, e.g. "U2"
        #[serde(default)]
        pub name: String,
        /// Marking / part designation, e.g. "1610A3"
        #[serde(default)]
        pub designation: Option<String>,
        /// Charging, audio, power, ...
        #[serde(default)]
        pub category: Option<String>,
        /// Device names this chip is found on
        #[serde(default)]
        pub compatible_devices: Vec<String>,
        /// What the chip does
        #[serde(default)]
        pub functions: Vec<String>,
        /// Interchangeable chips
        #[serde(default)]
        pub analogues: Vec<String>,
        /// Models the chip can be harvested from
        #[serde(default)]
        pub donor_models: Vec<String>,
    }

    /// Restore / diagnostics error code
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct ErrorCodeEntry {
        /// Code as shown by the tool, numeric codes are stored as text
        #[serde(default, deserialize_with = "string_or_number")]
        pub code: String,
        /// What the code means
        #[serde(default)]
        pub description: String,
        /// Likely cause
        #[serde(default)]
        pub cause: Option<String>,
        /// Suggested repair
        #[serde(default)]
        pub solution: Option<String>,
        /// Free-form severity label
        #[serde(default)]
        pub severity: Option<String>,
    }

    /// A single power rail reading
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Rail {
        /// Rail name, e.g. "PP_VDD_MAIN"
        pub name: String,
        /// Diode-mode reading
        #[serde(default)]
        pub diode_mode: Option<String>,
        /// Expected voltage
        #[serde(default)]
        pub voltage: Option<String>,
        /// Notes
        #[serde(default)]
        pub note: Option<String>,
    }

    /// Reference measurements for one board
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct Measurement {
        /// Board number
        #[serde(default)]
        pub board: String,
        /// Device the board belongs to
        #[serde(default)]
        pub device: Option<String>,
        /// Rails
        #[serde(default)]
        pub rails: Vec<Rail>,
    }

    /// Key combination (DFU, recovery, diagnostics, ...)
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct KeyCombination {
        /// What the combination does
        #[serde(default)]
        pub action: String,
        /// The keys, e.g. "Power + Volume Down"
        #[serde(default)]
        pub keys: String,
        /// Devices it applies to
        #[serde(default)]
        pub devices: Vec<String>,
        /// Notes
        #[serde(default)]
        pub notes: Option<String>,
    }

    /// Regional model suffix, e.g. "LL/A"
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct RegionalCode {
        /// Suffix code
        pub code: String,
        /// Sales region
        #[serde(default)]
        pub region: Option<String>,
        /// Country or countries
        #[serde(default)]
        pub country: Option<String>,
        /// Notes
        #[serde(default)]
        pub notes: Option<String>,
    }

    // =========================================================================
    // Power stations
    // =========================================================================

    /// Portable power station tracked for resale
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct PowerStation {
        /// Stable identifier used by the price API
        pub id: String,
        /// Model name
        #[serde(default)]
        pub name: String,
        /// Brand
        #[serde(default)]
        pub brand: Option<String>,
        /// Capacity in watt-hours
        #[serde(default)]
        pub capacity_wh: Option<u32>,
        /// Continuous output in watts
        #[serde(default)]
        pub output_w: Option<u32>,
        /// Last known EU price
        #[serde(default)]
        pub price_eu: Option<f64>,
        /// Last known UA price
        #[serde(default)]
        pub price_ua: Option<f64>,
    }

    /// Live price snapshot returned by the tracker API
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct LivePrice {
        /// Station id
        pub id: String,
        /// Display name
        #[serde(default)]
        pub name: Option<String>,
        /// EU shop price
        #[serde(default)]
        pub price_eu: Option<f64>,
        /// Amazon.de price
        #[serde(default)]
        pub amazon_de: Option<f64>,
        /// UA shop price
        #[serde(default)]
        pub price_ua: Option<f64>,
        /// Where the price came from
        #[serde(default)]
        pub source: Option<String>,
    }

    /// Stored price history row
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct PriceHistoryRecord {
        /// Station id
        pub id: String,
        /// EU shop price
        #[serde(default)]
        pub price_eu: Option<f64>,
        /// Amazon.de price
        #[serde(default)]
        pub amazon_de: Option<f64>,
        /// UA shop price
        #[serde(default)]
        pub price_ua: Option<f64>,
        /// Where the price came from
        #[serde(default)]
        pub source: Option<String>,
        /// When the row was recorded
        #[serde(default)]
        pub recorded_at: Option<DateTime<Utc>>,
    }

    fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Int(n) => n.to_string(),
            Raw::Float(f) => f.to_string(),
        })
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
