// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Parts command - part prices of one device in a region

use super::AppContext;
use crate::calculator::{PriceResolver, Region, ResolvedPrice};
use crate::pricing::format_optional;
use crate::search;
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct PartPrice<'a> {
    part: &'a str,
    article: Option<&'a str>,
    description: Option<&'a str>,
    price: Option<ResolvedPrice>,
}

/// Run the parts command
pub async fn run(ctx: &AppContext, device: &str, region: Option<Region>) -> Result<()> {
    let catalog = ctx.catalog().await?;
    let device = search::find_device(&catalog, device)?;
    let region = region.unwrap_or(ctx.config.calculator.region);
    let resolver = PriceResolver::new(&catalog, ctx.config.rates);

    let rows: Vec<PartPrice> = device
        .service_parts
        .iter()
        .map(|(part, sp)| {
            let description = sp.article.as_deref().and_then(|a| {
                catalog
                    .ukraine_prices
                    .as_ref()
                    .and_then(|t| t.get(a))
                    .and_then(|r| r.description.as_deref())
            });
            PartPrice {
                part,
                article: sp.article.as_deref(),
                description,
                price: resolver.resolve(device, part, region),
            }
        })
        .collect();

    if ctx.out.json {
        return ctx.out.print_json(&rows);
    }

    if rows.is_empty() {
        println!("{} has no service parts listed.", device.name);
        return Ok(());
    }

    println!(
        "{}",
        ctx.out.heading(&format!("Parts for {} ({}, {}):", device.name, region, region.currency()))
    );
    for row in rows {
        let price = format_optional(row.price.map(|p| p.amount), region.currency());
        let source = row.price.map(|p| format!(" [{}]", p.source)).unwrap_or_default();
        println!(
            "  {:<12} {:<14} {}{}",
            row.part,
            row.article.unwrap_or("—"),
            ctx.out.money(&price),
            ctx.out.dim(&source)
        );
        if let Some(desc) = row.description {
            println!("    {}", ctx.out.dim(desc));
        }
    }
    Ok(())
}
