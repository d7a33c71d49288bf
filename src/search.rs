// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Filtering and lookup over the catalog

use crate::catalog::Catalog;
use crate::types::{Device, ErrorCodeEntry, IcRecord, KeyCombination, Measurement, RegionalCode};
use std::collections::BTreeMap;
use thiserror::Error;

/// Lookup failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The dataset needed for the lookup did not load
    #[error("Dataset {0} is not loaded")]
    NotLoaded(&'static str),

    /// Nothing matched
    #[error("No {kind} matches '{query}'")]
    NoMatch {
        /// What was looked up
        kind: &'static str,
        /// The query
        query: String,
    },

    /// Several records matched a lookup that needs one
    #[error("Ambiguous {kind} name '{query}', candidates: {}", candidates.join(", "))]
    Ambiguous {
        /// What was looked up
        kind: &'static str,
        /// The query
        query: String,
        /// Names that matched
        candidates: Vec<String>,
    },
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Pick a single record by name: exact match first, then a unique substring match
fn pick_one<'a, T>(
    items: &'a [T],
    name_of: impl Fn(&T) -> &str,
    query: &str,
    kind: &'static str,
) -> Result<&'a T, SearchError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(SearchError::NoMatch { kind, query: query.to_string() });
    }

    if let Some(exact) = items.iter().find(|i| name_of(i).to_lowercase() == needle) {
        return Ok(exact);
    }

    let matches: Vec<&T> = items
        .iter()
        .filter(|i| contains_ci(name_of(i), &needle))
        .collect();

    match matches.len() {
        0 => Err(SearchError::NoMatch { kind, query: query.to_string() }),
        1 => Ok(matches[0]),
        _ => Err(SearchError::Ambiguous {
            kind,
            query: query.to_string(),
            candidates: matches.iter().map(|i| name_of(i).to_string()).collect(),
        }),
    }
}

// =============================================================================
// Devices
// =============================================================================

/// Device list filter
#[derive(Debug, Clone, Default)]
pub struct DeviceQuery {
    /// Substring of name, processor or board number
    pub text: Option<String>,
    /// Exact category (case-insensitive)
    pub category: Option<String>,
    /// Release year
    pub year: Option<u16>,
}

impl DeviceQuery {
    /// Whether `device` passes every set filter
    #[must_use]
    pub fn matches(&self, device: &Device) -> bool {
        if let Some(text) = self.text.as_deref().filter(|t| !t.trim().is_empty()) {
            let needle = text.trim().to_lowercase();
            let hit = contains_ci(&device.name, &needle)
                || device.processor.as_deref().is_some_and(|p| contains_ci(p, &needle))
                || device.board_numbers.iter().any(|b| contains_ci(b, &needle));
            if !hit {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if !device.category.eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }

        if let Some(year) = self.year {
            if device.year != Some(year) {
                return false;
            }
        }

        true
    }
}

/// Devices matching `query`, newest first then by name
#[must_use]
pub fn search_devices<'a>(catalog: &'a Catalog, query: &DeviceQuery) -> Vec<&'a Device> {
    let mut found: Vec<&Device> = catalog.devices().iter().filter(|d| query.matches(d)).collect();
    found.sort_by(|a, b| b.year.cmp(&a.year).then_with(|| a.name.cmp(&b.name)));
    found
}

/// Find one device by name
pub fn find_device<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a Device, SearchError> {
    if catalog.devices.is_none() {
        return Err(SearchError::NotLoaded("devices"));
    }
    pick_one(catalog.devices(), |d| d.name.as_str(), name, "device")
}

/// Device categories with their device counts
#[must_use]
pub fn categories(catalog: &Catalog) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for device in catalog.devices() {
        *counts.entry(device.category.clone()).or_insert(0) += 1;
    }
    counts
}

// =============================================================================
// ICs
// =============================================================================

/// ICs whose name, designation or functions contain `text`
#[must_use]
pub fn search_ics<'a>(catalog: &'a Catalog, text: Option<&str>, category: Option<&str>) -> Vec<&'a IcRecord> {
    let needle = text.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());

    catalog
        .ics()
        .iter()
        .filter(|ic| match &needle {
            Some(n) => {
                contains_ci(&ic.name, n)
                    || ic.designation.as_deref().is_some_and(|d| contains_ci(d, n))
                    || ic.functions.iter().any(|f| contains_ci(f, n))
            }
            None => true,
        })
        .filter(|ic| match category {
            Some(c) => ic.category.as_deref().is_some_and(|ic_cat| ic_cat.eq_ignore_ascii_case(c.trim())),
            None => true,
        })
        .collect()
}

/// Find one IC by name or designation
pub fn find_ic<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a IcRecord, SearchError> {
    if catalog.ics.is_none() {
        return Err(SearchError::NotLoaded("ic_compatibility"));
    }
    let needle = name.trim().to_lowercase();
    if let Some(ic) = catalog
        .ics()
        .iter()
        .find(|ic| ic.designation.as_deref().is_some_and(|d| !needle.is_empty() && d.to_lowercase() == needle))
    {
        return Ok(ic);
    }
    pick_one(catalog.ics(), |ic| ic.name.as_str(), name, "IC")
}

/// Whether two device names refer to the same model, by substring either way
fn names_overlap(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
    !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a))
}

/// ICs listed as compatible with `device`
#[must_use]
pub fn ics_for_device<'a>(catalog: &'a Catalog, device: &Device) -> Vec<&'a IcRecord> {
    catalog
        .ics()
        .iter()
        .filter(|ic| ic.compatible_devices.iter().any(|d| names_overlap(d, &device.name)))
        .collect()
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Error code by exact code
pub fn find_error_code<'a>(catalog: &'a Catalog, code: &str) -> Result<&'a ErrorCodeEntry, SearchError> {
    if catalog.error_codes.is_none() {
        return Err(SearchError::NotLoaded("error_codes"));
    }
    let code = code.trim();
    catalog
        .error_codes()
        .iter()
        .find(|e| e.code.eq_ignore_ascii_case(code))
        .ok_or_else(|| SearchError::NoMatch { kind: "error code", query: code.to_string() })
}

/// Error codes whose code, description or cause contain `text`
#[must_use]
pub fn search_error_codes<'a>(catalog: &'a Catalog, text: Option<&str>) -> Vec<&'a ErrorCodeEntry> {
    let needle = text.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());
    catalog
        .error_codes()
        .iter()
        .filter(|e| match &needle {
            Some(n) => {
                contains_ci(&e.code, n)
                    || contains_ci(&e.description, n)
                    || e.cause.as_deref().is_some_and(|c| contains_ci(c, n))
            }
            None => true,
        })
        .collect()
}

/// Key combinations whose action, keys or devices contain `text`
#[must_use]
pub fn search_key_combinations<'a>(catalog: &'a Catalog, text: Option<&str>) -> Vec<&'a KeyCombination> {
    let needle = text.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());
    catalog
        .key_combinations()
        .iter()
        .filter(|k| match &needle {
            Some(n) => {
                contains_ci(&k.action, n)
                    || contains_ci(&k.keys, n)
                    || k.devices.iter().any(|d| contains_ci(d, n))
            }
            None => true,
        })
        .collect()
}

/// Regional code for a suffix (`LL/A`) or a full part number (`MLPF3LL/A`)
pub fn find_regional_code<'a>(catalog: &'a Catalog, code: &str) -> Result<&'a RegionalCode, SearchError> {
    if catalog.regional_codes.is_none() {
        return Err(SearchError::NotLoaded("regional_codes"));
    }
    let wanted = code.trim().to_uppercase();

    catalog
        .regional_codes()
        .iter()
        .filter(|c| !c.code.is_empty())
        .filter(|c| wanted.ends_with(&c.code.to_uppercase()))
        // Longest suffix wins, "LL/A" over "/A"
        .max_by_key(|c| c.code.len())
        .ok_or_else(|| SearchError::NoMatch { kind: "regional code", query: code.to_string() })
}

/// Measurements for a board number or a device name
///
/// The query must be part of the stored board or device name, so a longer
/// model name never picks up a sibling model's board.
#[must_use]
pub fn measurements_for<'a>(catalog: &'a Catalog, board_or_device: &str) -> Vec<&'a Measurement> {
    let needle = board_or_device.trim().to_lowercase();
    if needle.is_empty() {
        return catalog.measurements().iter().collect();
    }
    catalog
        .measurements()
        .iter()
        .filter(|m| {
            contains_ci(&m.board, &needle)
                || m.device.as_deref().is_some_and(|d| contains_ci(d, &needle))
        })
        .collect()
}
