// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Device commands - list, filter and show devices

use super::AppContext;
use crate::calculator::{PriceResolver, Region};
use crate::pricing::{format_optional, Currency};
use crate::search::{self, DeviceQuery};
use anyhow::Result;
use serde::Serialize;

/// List devices matching `query`
pub async fn list(ctx: &AppContext, query: DeviceQuery) -> Result<()> {
    let catalog = ctx.catalog().await?;
    if catalog.devices.is_none() {
        anyhow::bail!("Dataset devices is not loaded");
    }

    let devices = search::search_devices(&catalog, &query);

    if ctx.out.json {
        return ctx.out.print_json(&devices);
    }

    if devices.is_empty() {
        println!("No devices match.");
        return Ok(());
    }

    println!("{}", ctx.out.heading(&format!("Devices ({}):", devices.len())));
    for device in devices {
        let year = device.year.map(|y| y.to_string()).unwrap_or_else(|| "----".into());
        let boards = if device.board_numbers.is_empty() {
            String::new()
        } else {
            ctx.out.dim(&format!("  [{}]", device.board_numbers.join(", ")))
        };
        println!("  {} {:<28} {}{}", year, device.name, device.category, boards);
    }
    Ok(())
}

/// Device categories with counts
pub async fn categories(ctx: &AppContext) -> Result<()> {
    let catalog = ctx.catalog().await?;
    let counts = search::categories(&catalog);

    if ctx.out.json {
        return ctx.out.print_json(&counts);
    }

    if counts.is_empty() {
        println!("No devices loaded.");
        return Ok(());
    }

    println!("{}", ctx.out.heading("Categories:"));
    for (category, count) in counts {
        println!("  {category:<24} {count}");
    }
    Ok(())
}

#[derive(Serialize)]
struct PartRow<'a> {
    part: &'a str,
    article: Option<&'a str>,
    price_usd: Option<f64>,
    price_uah: Option<f64>,
    price_eur: Option<f64>,
}

/// Full detail of one device, with resolved prices and compatible ICs
pub async fn show(ctx: &AppContext, name: &str) -> Result<()> {
    let catalog = ctx.catalog().await?;
    let device = search::find_device(&catalog, name)?;
    let resolver = PriceResolver::new(&catalog, ctx.config.rates);
    let ics = search::ics_for_device(&catalog, device);

    let parts: Vec<PartRow> = device
        .service_parts
        .iter()
        .map(|(part, sp)| PartRow {
            part,
            article: sp.article.as_deref(),
            price_usd: sp.price_usd,
            price_uah: resolver.resolve(device, part, Region::Ua).map(|p| p.amount),
            price_eur: resolver.resolve(device, part, Region::Eu).map(|p| p.amount),
        })
        .collect();

    if ctx.out.json {
        return ctx.out.print_json(&serde_json::json!({
            "device": device,
            "parts": parts,
            "ics": ics,
        }));
    }

    let out = &ctx.out;
    println!("{}", out.heading(&device.name));
    println!("  category: {}", device.category);
    if let Some(year) = device.year {
        println!("  year: {year}");
    }
    if let Some(cpu) = &device.processor {
        println!("  processor: {cpu}");
    }
    if !device.board_numbers.is_empty() {
        println!("  boards: {}", device.board_numbers.join(", "));
    }
    if let Some(difficulty) = &device.repair_difficulty {
        println!("  repair difficulty: {difficulty}");
    }

    // Sections whose data is absent are skipped
    if !parts.is_empty() {
        println!("  parts ({}):", parts.len());
        for row in &parts {
            println!(
                "    {:<12} {:<14} {:>16} {:>14}",
                row.part,
                row.article.unwrap_or("—"),
                format_optional(row.price_uah, Currency::Uah),
                format_optional(row.price_eur, Currency::Eur),
            );
        }
    }

    if !device.common_issues.is_empty() {
        println!("  common issues:");
        for issue in &device.common_issues {
            println!("    - {issue}");
        }
    }

    if !ics.is_empty() {
        println!("  ICs ({}):", ics.len());
        for ic in ics {
            let designation = ic.designation.as_deref().unwrap_or("");
            println!("    {} {}", ic.name, out.dim(designation));
        }
    }
    Ok(())
}
