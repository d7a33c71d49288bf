// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! IC commands - chip compatibility lookup

use super::AppContext;
use crate::output::Output;
use crate::search;
use crate::types::IcRecord;
use anyhow::{bail, Result};

/// Arguments for IC commands
pub struct IcArgs {
    /// Category filter for search
    pub category: Option<String>,
}

/// Run IC command
pub async fn run(ctx: &AppContext, action: &str, query: Option<String>, args: IcArgs) -> Result<()> {
    let catalog = ctx.catalog().await?;
    if catalog.ics.is_none() {
        bail!("Dataset ic_compatibility is not loaded");
    }

    match action {
        "search" | "list" | "ls" => {
            let ics = search::search_ics(&catalog, query.as_deref(), args.category.as_deref());
            if ctx.out.json {
                return ctx.out.print_json(&ics);
            }
            if ics.is_empty() {
                println!("No ICs match.");
                return Ok(());
            }
            println!("{}", ctx.out.heading(&format!("ICs ({}):", ics.len())));
            for ic in ics {
                print_summary(&ctx.out, ic);
            }
        }

        "show" => {
            let name = query.ok_or_else(|| anyhow::anyhow!("IC name is required"))?;
            let ic = search::find_ic(&catalog, &name)?;
            if ctx.out.json {
                return ctx.out.print_json(ic);
            }
            print_detail(&ctx.out, ic);
        }

        "device" | "for" => {
            let name = query.ok_or_else(|| anyhow::anyhow!("Device name is required"))?;
            let device = search::find_device(&catalog, &name)?;
            let ics = search::ics_for_device(&catalog, device);
            if ctx.out.json {
                return ctx.out.print_json(&ics);
            }
            if ics.is_empty() {
                println!("No ICs listed for {}.", device.name);
                return Ok(());
            }
            println!("{}", ctx.out.heading(&format!("ICs on {} ({}):", device.name, ics.len())));
            for ic in ics {
                print_summary(&ctx.out, ic);
            }
        }

        other => {
            bail!("Unknown action: {}. Valid: search, show, device", other);
        }
    }

    Ok(())
}

fn print_summary(out: &Output, ic: &IcRecord) {
    let designation = ic.designation.as_deref().unwrap_or("");
    let category = ic.category.as_deref().unwrap_or("-");
    println!("  {:<20} {:<12} {}", ic.name, designation, out.dim(category));
}

fn print_detail(out: &Output, ic: &IcRecord) {
    println!("{}", out.heading(&ic.name));
    if let Some(d) = &ic.designation {
        println!("  designation: {d}");
    }
    if let Some(c) = &ic.category {
        println!("  category: {c}");
    }

    for (label, values) in [
        ("functions", &ic.functions),
        ("compatible devices", &ic.compatible_devices),
        ("analogues", &ic.analogues),
        ("donor models", &ic.donor_models),
    ] {
        if !values.is_empty() {
            println!("  {label}: {}", values.join(", "));
        }
    }
}
