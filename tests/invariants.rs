// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invariant tests for pricing, quoting and the error log
//!
//! These tests verify critical invariants:
//! 1. Conversion through UAH is reversible at any positive rates
//! 2. A quote's total is always its parts, labor and margin added up
//! 3. The error log never grows past its capacity and keeps the newest entries

use proptest::prelude::*;
use repairbase::calculator::{self, QuoteRequest, Region};
use repairbase::catalog::Catalog;
use repairbase::healer::{ErrorContext, ErrorLog, ErrorMatcher, LOG_CAPACITY};
use repairbase::pricing::{Currency, Rates};
use repairbase::types::{Device, PriceRecord, ServicePart};
use std::collections::BTreeMap;

// =============================================================================
// Test Helpers
// =============================================================================

fn currency() -> impl Strategy<Value = Currency> {
    prop_oneof![Just(Currency::Uah), Just(Currency::Usd), Just(Currency::Eur)]
}

fn rates() -> impl Strategy<Value = Rates> {
    (1.0f64..100.0, 1.0f64..100.0).prop_map(|(usd_to_uah, eur_to_uah)| Rates { usd_to_uah, eur_to_uah })
}

/// Device with one part per entry; `Some` prices land in the UAH table
fn quote_fixture(prices: &[(Option<f64>, Option<f64>)]) -> (Catalog, Device, Vec<String>) {
    let mut parts = BTreeMap::new();
    let mut table = BTreeMap::new();
    let mut repairs = Vec::new();

    for (i, (uah, usd)) in prices.iter().enumerate() {
        let name = format!("part{i}");
        let article = format!("661-{i:05}");
        parts.insert(name.clone(), ServicePart { article: Some(article.clone()), price_usd: *usd });
        if let Some(uah) = uah {
            table.insert(article, PriceRecord { price_uah: Some(*uah), description: None });
        }
        repairs.push(name);
    }

    let device = Device {
        name: "Test device".into(),
        service_parts: parts,
        ..Device::default()
    };
    let catalog = Catalog {
        devices: Some(vec![device.clone()]),
        ukraine_prices: Some(table),
        ..Catalog::default()
    };
    (catalog, device, repairs)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn conversion_round_trips(amount in 0.0f64..1_000_000.0, from in currency(), to in currency(), rates in rates()) {
        let there = rates.convert(amount, from, to);
        let back = rates.convert(there, to, from);
        prop_assert!((back - amount).abs() <= 1e-6 * amount.max(1.0));
    }

    #[test]
    fn conversion_agrees_with_uah_pivot(amount in 0.0f64..1_000_000.0, from in currency(), to in currency(), rates in rates()) {
        let direct = rates.convert(amount, from, to);
        let via_uah = rates.convert(rates.convert(amount, from, Currency::Uah), Currency::Uah, to);
        prop_assert!((direct - via_uah).abs() <= 1e-6 * direct.abs().max(1.0));
    }

    #[test]
    fn quote_total_is_sum_of_parts(
        prices in prop::collection::vec((prop::option::of(1.0f64..50_000.0), prop::option::of(1.0f64..2_000.0)), 1..8),
        labor in 0.0f64..2_000.0,
        margin in 0.0f64..100.0,
    ) {
        let (catalog, device, repairs) = quote_fixture(&prices);
        let request = QuoteRequest {
            repairs,
            labor_per_item: labor,
            margin_percent: margin,
            region: Region::Ua,
        };

        let quote = calculator::calculate(&catalog, Rates::default(), &device, &request);

        let priced: f64 = quote.items.iter().filter_map(|i| i.price).map(|p| p.amount).sum();
        let tolerance = 1e-6 * quote.total.max(1.0);
        prop_assert_eq!(quote.items.len(), prices.len());
        prop_assert!((quote.parts_cost - priced).abs() <= tolerance);
        prop_assert!((quote.subtotal - (quote.parts_cost + quote.labor_cost)).abs() <= tolerance);
        prop_assert!((quote.total - quote.subtotal * (1.0 + margin / 100.0)).abs() <= tolerance);

        // Unpriced means neither a table price nor a USD reference
        let expected_unpriced = prices.iter().filter(|(uah, usd)| uah.is_none() && usd.is_none()).count();
        prop_assert_eq!(quote.unpriced().len(), expected_unpriced);
    }

    #[test]
    fn error_log_is_bounded_fifo(count in 0usize..(LOG_CAPACITY * 3)) {
        let matcher = ErrorMatcher::builtin();
        let mut log = ErrorLog::default();

        for i in 0..count {
            log.record(&matcher, &format!("failure #{i}"), vec![], ErrorContext::new("test", None));
        }

        prop_assert_eq!(log.len(), count.min(LOG_CAPACITY));
        if count > 0 {
            let newest = log.entries().last().map(|e| e.message.clone());
            prop_assert_eq!(newest, Some(format!("failure #{}", count - 1)));
            let oldest = log.entries().next().map(|e| e.message.clone());
            prop_assert_eq!(oldest, Some(format!("failure #{}", count.saturating_sub(LOG_CAPACITY))));
        }
    }
}

#[test]
fn region_table_beats_usd_reference() {
    let (catalog, device, repairs) = quote_fixture(&[(Some(1800.0), Some(69.0))]);
    let request = QuoteRequest {
        repairs,
        labor_per_item: 0.0,
        margin_percent: 0.0,
        region: Region::Ua,
    };

    let quote = calculator::calculate(&catalog, Rates::default(), &device, &request);

    assert_eq!(quote.total, 1800.0);
}
