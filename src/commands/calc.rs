// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Calculator commands - repair quotes and currency conversion

use super::AppContext;
use crate::calculator::{self, QuoteRequest, Region};
use crate::output::render_breakdown;
use crate::pricing::{format_amount, Currency};
use crate::search;
use anyhow::{bail, Result};
use tracing::info;

/// Arguments for a repair quote
pub struct CalcArgs {
    /// Part types to replace
    pub repairs: Vec<String>,
    /// Labor per item, config default when absent
    pub labor: Option<f64>,
    /// Margin percent, config default when absent
    pub margin: Option<f64>,
    /// Region, config default when absent
    pub region: Option<Region>,
}

/// Quote a repair
pub async fn run(ctx: &AppContext, device: &str, args: CalcArgs) -> Result<()> {
    if args.repairs.is_empty() {
        bail!("At least one --repair is required");
    }

    let defaults = &ctx.config.calculator;
    let request = QuoteRequest {
        repairs: args.repairs,
        labor_per_item: args.labor.unwrap_or(defaults.labor_per_item),
        margin_percent: args.margin.unwrap_or(defaults.margin_percent),
        region: args.region.unwrap_or(defaults.region),
    };

    if request.labor_per_item < 0.0 || request.margin_percent < 0.0 {
        bail!("Labor and margin must not be negative");
    }

    let catalog = ctx.catalog().await?;
    let device = search::find_device(&catalog, device)?;
    info!("Quoting {} repair(s) on {}", request.repairs.len(), device.name);

    let quote = calculator::calculate(&catalog, ctx.config.rates, device, &request);

    if ctx.out.json {
        return ctx.out.print_json(&quote);
    }
    println!("{}", render_breakdown(&ctx.out, &quote));
    Ok(())
}

/// Convert an amount between currencies at the configured rates
pub fn convert(ctx: &AppContext, amount: f64, from: Currency, to: Currency) -> Result<()> {
    let converted = ctx.config.rates.convert(amount, from, to);

    if ctx.out.json {
        return ctx.out.print_json(&serde_json::json!({
            "amount": amount,
            "from": from,
            "to": to,
            "result": converted,
        }));
    }

    println!(
        "{} = {}",
        format_amount(amount, from),
        ctx.out.money(&format_amount(converted, to))
    );
    Ok(())
}
