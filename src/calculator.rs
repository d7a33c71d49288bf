// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Repair-cost calculator
//!
//! Part prices resolve per region in a fixed fallback order:
//! 1. the region's own price table (by article)
//! 2. the device's USD reference price, converted
//! 3. the other region's price table, cross-converted
//!
//! Items no source can price stay in the breakdown with no price and add
//! nothing to the parts cost.

use crate::catalog::Catalog;
use crate::pricing::{Currency, Rates};
use crate::types::Device;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pricing region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Ukraine, priced in UAH
    Ua,
    /// EU, priced in EUR
    Eu,
}

impl Region {
    /// Currency quotes are produced in
    #[must_use]
    pub fn currency(&self) -> Currency {
        match self {
            Self::Ua => Currency::Uah,
            Self::Eu => Currency::Eur,
        }
    }

    /// The region whose table is tried last
    #[must_use]
    pub fn other(&self) -> Self {
        match self {
            Self::Ua => Self::Eu,
            Self::Eu => Self::Ua,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ua => f.write_str("UA"),
            Self::Eu => f.write_str("EU"),
        }
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ua" | "ukraine" => Ok(Self::Ua),
            "eu" | "europe" => Ok(Self::Eu),
            other => Err(format!("Unknown region: {other}. Valid: ua, eu")),
        }
    }
}

/// Which source a resolved price came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// The region's own price table
    RegionTable,
    /// The device's USD reference price
    UsdReference,
    /// The other region's price table
    CrossRegion,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RegionTable => "price table",
            Self::UsdReference => "USD reference",
            Self::CrossRegion => "cross-region",
        })
    }
}

/// A part price expressed in a region's currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    /// Amount in the region currency
    pub amount: f64,
    /// Where it came from
    pub source: PriceSource,
}

/// Resolves part prices against the catalog's price tables
pub struct PriceResolver<'a> {
    catalog: &'a Catalog,
    rates: Rates,
}

impl<'a> PriceResolver<'a> {
    /// Create a resolver over `catalog` using fixed `rates`
    #[must_use]
    pub fn new(catalog: &'a Catalog, rates: Rates) -> Self {
        Self { catalog, rates }
    }

    /// Native table price of `article` for `region`
    fn table_price(&self, article: &str, region: Region) -> Option<f64> {
        match region {
            Region::Ua => self.catalog.price_uah(article),
            Region::Eu => self.catalog.price_eur(article),
        }
    }

    /// Price of one part type of `device` in `region`'s currency
    #[must_use]
    pub fn resolve(&self, device: &Device, part_type: &str, region: Region) -> Option<ResolvedPrice> {
        let part = device.service_parts.get(part_type)?;
        let article = part.article.as_deref();

        if let Some(amount) = article.and_then(|a| self.table_price(a, region)) {
            return Some(ResolvedPrice { amount, source: PriceSource::RegionTable });
        }

        if let Some(usd) = part.price_usd {
            return Some(ResolvedPrice {
                amount: self.rates.convert(usd, Currency::Usd, region.currency()),
                source: PriceSource::UsdReference,
            });
        }

        let other = region.other();
        article
            .and_then(|a| self.table_price(a, other))
            .map(|amount| ResolvedPrice {
                amount: self.rates.convert(amount, other.currency(), region.currency()),
                source: PriceSource::CrossRegion,
            })
    }
}

/// Calculator input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Part types to replace, in order
    pub repairs: Vec<String>,
    /// Labor charged per line item, in the region currency
    pub labor_per_item: f64,
    /// Markup applied to the subtotal, in percent
    pub margin_percent: f64,
    /// Pricing region
    pub region: Region,
}

/// One repair line of a quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Part type
    pub part: String,
    /// Article, when the device lists the part
    pub article: Option<String>,
    /// Resolved price, `None` when unpriced
    pub price: Option<ResolvedPrice>,
}

/// Calculator output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breakdown {
    /// Device the quote is for
    pub device: String,
    /// Region used
    pub region: Region,
    /// Currency of every amount below
    pub currency: Currency,
    /// Line items
    pub items: Vec<LineItem>,
    /// Sum of resolved part prices
    pub parts_cost: f64,
    /// `items × labor_per_item`
    pub labor_cost: f64,
    /// `parts_cost + labor_cost`
    pub subtotal: f64,
    /// `subtotal × margin%`
    pub margin_amount: f64,
    /// `subtotal + margin_amount`
    pub total: f64,
}

impl Breakdown {
    /// Part types no source could price
    #[must_use]
    pub fn unpriced(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|i| i.price.is_none())
            .map(|i| i.part.as_str())
            .collect()
    }
}

/// Compute a repair quote for `device`
#[must_use]
pub fn calculate(catalog: &Catalog, rates: Rates, device: &Device, request: &QuoteRequest) -> Breakdown {
    let resolver = PriceResolver::new(catalog, rates);

    let items: Vec<LineItem> = request
        .repairs
        .iter()
        .map(|part| LineItem {
            part: part.clone(),
            article: device
                .service_parts
                .get(part)
                .and_then(|p| p.article.clone()),
            price: resolver.resolve(device, part, request.region),
        })
        .collect();

    let parts_cost: f64 = items.iter().filter_map(|i| i.price).map(|p| p.amount).sum();
    #[allow(clippy::cast_precision_loss)]
    let labor_cost = items.len() as f64 * request.labor_per_item;
    let subtotal = parts_cost + labor_cost;
    let margin_amount = subtotal * request.margin_percent / 100.0;

    Breakdown {
        device: device.name.clone(),
        region: request.region,
        currency: request.region.currency(),
        items,
        parts_cost,
        labor_cost,
        subtotal,
        margin_amount,
        total: subtotal + margin_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EuPriceRecord, PriceRecord, ServicePart};
    use std::collections::BTreeMap;

    fn part(article: &str, usd: Option<f64>) -> ServicePart {
        ServicePart {
            article: Some(article.into()),
            price_usd: usd,
        }
    }

    fn make_catalog() -> (Catalog, Device) {
        let mut parts = BTreeMap::new();
        parts.insert("battery".to_string(), part("661-22308", Some(49.0)));
        parts.insert("display".to_string(), part("661-21994", Some(199.0)));
        parts.insert("camera".to_string(), part("661-00001", Some(80.0)));
        parts.insert("taptic".to_string(), part("661-00002", None));
        parts.insert("speaker".to_string(), part("661-00003", None));

        let device = Device {
            name: "iPhone 13".into(),
            category: "iPhone".into(),
            year: Some(2021),
            service_parts: parts,
            ..Device::default()
        };

        let mut ua = BTreeMap::new();
        ua.insert("661-22308".to_string(), PriceRecord { price_uah: Some(1800.0), description: None });
        ua.insert("661-21994".to_string(), PriceRecord { price_uah: Some(6500.0), description: None });

        let mut eu = BTreeMap::new();
        eu.insert("661-00002".to_string(), EuPriceRecord { price_eur: Some(20.0), description: None });

        let catalog = Catalog {
            devices: Some(vec![device.clone()]),
            ukraine_prices: Some(ua),
            eu_prices: Some(eu),
            ..Catalog::default()
        };
        (catalog, device)
    }

    #[test]
    fn test_region_table_wins() {
        let (catalog, device) = make_catalog();
        let resolver = PriceResolver::new(&catalog, Rates::default());

        let price = resolver.resolve(&device, "battery", Region::Ua).unwrap();
        assert_eq!(price.source, PriceSource::RegionTable);
        assert_eq!(price.amount, 1800.0);
    }

    #[test]
    fn test_usd_fallback() {
        let (catalog, device) = make_catalog();
        let rates = Rates::default();
        let resolver = PriceResolver::new(&catalog, rates);

        let price = resolver.resolve(&device, "camera", Region::Ua).unwrap();
        assert_eq!(price.source, PriceSource::UsdReference);
        assert!((price.amount - 80.0 * rates.usd_to_uah).abs() < 1e-9);
    }

    #[test]
    fn test_cross_region_fallback() {
        let (catalog, device) = make_catalog();
        let rates = Rates::default();
        let resolver = PriceResolver::new(&catalog, rates);

        let price = resolver.resolve(&device, "taptic", Region::Ua).unwrap();
        assert_eq!(price.source, PriceSource::CrossRegion);
        assert!((price.amount - 20.0 * rates.eur_to_uah).abs() < 1e-9);
    }

    #[test]
    fn test_unpriced_and_unknown_parts() {
        let (catalog, device) = make_catalog();
        let resolver = PriceResolver::new(&catalog, Rates::default());

        assert!(resolver.resolve(&device, "speaker", Region::Ua).is_none());
        assert!(resolver.resolve(&device, "flux capacitor", Region::Ua).is_none());
    }

    #[test]
    fn test_example_quote() {
        let (catalog, device) = make_catalog();
        let request = QuoteRequest {
            repairs: vec!["battery".into(), "display".into()],
            labor_per_item: 500.0,
            margin_percent: 30.0,
            region: Region::Ua,
        };

        let quote = calculate(&catalog, Rates::default(), &device, &request);

        assert_eq!(quote.currency, Currency::Uah);
        assert_eq!(quote.labor_cost, 1000.0);
        assert!((quote.total - (1800.0 + 6500.0 + 1000.0) * 1.30).abs() < 1e-6);
    }

    #[test]
    fn test_unpriced_items_still_charge_labor() {
        let (catalog, device) = make_catalog();
        let request = QuoteRequest {
            repairs: vec!["speaker".into(), "battery".into()],
            labor_per_item: 300.0,
            margin_percent: 0.0,
            region: Region::Ua,
        };

        let quote = calculate(&catalog, Rates::default(), &device, &request);

        assert_eq!(quote.unpriced(), vec!["speaker"]);
        assert_eq!(quote.parts_cost, 1800.0);
        assert_eq!(quote.total, 1800.0 + 600.0);
    }

    #[test]
    fn test_eu_quote_uses_usd_then_cross() {
        let (catalog, device) = make_catalog();
        let rates = Rates::default();
        let request = QuoteRequest {
            repairs: vec!["battery".into()],
            labor_per_item: 0.0,
            margin_percent: 0.0,
            region: Region::Eu,
        };

        let quote = calculate(&catalog, rates, &device, &request);
        let expected = rates.convert(49.0, Currency::Usd, Currency::Eur);

        assert_eq!(quote.items[0].price.unwrap().source, PriceSource::UsdReference);
        assert!((quote.total - expected).abs() < 1e-9);
    }
}
