// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Terminal output - plain or colored text, or JSON

use crate::calculator::Breakdown;
use crate::healer::Severity;
use crate::pricing::{format_amount, format_optional};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::Write;

/// How command results are printed
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    /// Print JSON instead of text
    pub json: bool,
    /// Use ANSI colors
    pub color: bool,
}

impl Output {
    /// Output mode from the global flags
    #[must_use]
    pub fn new(json: bool, no_color: bool) -> Self {
        Self { json, color: !no_color && !json }
    }

    /// Pretty JSON of `value` on stdout
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }

    /// Section heading
    #[must_use]
    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// De-emphasised text
    #[must_use]
    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    /// Money amounts
    #[must_use]
    pub fn money(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    /// Severity label, colored by how bad it is
    #[must_use]
    pub fn severity(&self, severity: Severity) -> String {
        let label = severity.to_string();
        if !self.color {
            return label;
        }
        match severity {
            Severity::Low => label.cyan().to_string(),
            Severity::Medium => label.yellow().to_string(),
            Severity::High => label.red().to_string(),
            Severity::Critical => label.red().bold().to_string(),
        }
    }
}

/// Text rendering of a repair quote
#[must_use]
pub fn render_breakdown(out: &Output, quote: &Breakdown) -> String {
    let mut lines = vec![out.heading(&format!("Repair quote: {} ({})", quote.device, quote.region))];

    for item in &quote.items {
        let article = item.article.as_deref().unwrap_or("no article");
        let price = format_optional(item.price.map(|p| p.amount), quote.currency);
        let source = item
            .price
            .map(|p| format!(" [{}]", p.source))
            .unwrap_or_default();
        lines.push(format!("  {:<12} {:<14} {}{}", item.part, article, price, out.dim(&source)));
    }

    lines.push(format!("  Parts:  {}", format_amount(quote.parts_cost, quote.currency)));
    lines.push(format!("  Labor:  {}", format_amount(quote.labor_cost, quote.currency)));
    lines.push(format!("  Margin: {}", format_amount(quote.margin_amount, quote.currency)));
    lines.push(format!(
        "  Total:  {}",
        out.money(&format_amount(quote.total, quote.currency))
    ));

    let unpriced = quote.unpriced();
    if !unpriced.is_empty() {
        lines.push(format!("  Unpriced: {}", unpriced.join(", ")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{LineItem, PriceSource, Region, ResolvedPrice};
    use crate::pricing::Currency;

    #[test]
    fn test_plain_output_has_no_escapes() {
        let out = Output::new(false, true);
        assert_eq!(out.heading("Devices"), "Devices");
        assert_eq!(out.severity(Severity::High), "high");
    }

    #[test]
    fn test_json_mode_disables_color() {
        assert!(!Output::new(true, false).color);
        assert!(Output::new(false, false).color);
    }

    #[test]
    fn test_render_breakdown() {
        let quote = Breakdown {
            device: "iPhone 13".into(),
            region: Region::Ua,
            currency: Currency::Uah,
            items: vec![
                LineItem {
                    part: "battery".into(),
                    article: Some("661-22308".into()),
                    price: Some(ResolvedPrice { amount: 1800.0, source: PriceSource::RegionTable }),
                },
                LineItem { part: "speaker".into(), article: None, price: None },
            ],
            parts_cost: 1800.0,
            labor_cost: 1000.0,
            subtotal: 2800.0,
            margin_amount: 840.0,
            total: 3640.0,
        };

        let text = render_breakdown(&Output::new(false, true), &quote);

        insta::assert_snapshot!(text, @r"
        Repair quote: iPhone 13 (UA)
          battery      661-22308      1,800.00 UAH [price table]
          speaker      no article     —
          Parts:  1,800.00 UAH
          Labor:  1,000.00 UAH
          Margin: 840.00 UAH
          Total:  3,640.00 UAH
          Unpriced: speaker
        ");
    }
}
