// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Diagnostic reference commands - error codes, power rails, key combos, region codes

use super::AppContext;
use crate::search;
use anyhow::{bail, Result};

/// List or search error codes
pub async fn error_codes(ctx: &AppContext, text: Option<String>) -> Result<()> {
    let catalog = ctx.catalog().await?;
    if catalog.error_codes.is_none() {
        bail!("Dataset error_codes is not loaded");
    }

    let codes = search::search_error_codes(&catalog, text.as_deref());
    if ctx.out.json {
        return ctx.out.print_json(&codes);
    }
    if codes.is_empty() {
        println!("No error codes match.");
        return Ok(());
    }

    println!("{}", ctx.out.heading(&format!("Error codes ({}):", codes.len())));
    for entry in codes {
        let severity = entry.severity.as_deref().unwrap_or("");
        println!("  {:<8} {} {}", entry.code, entry.description, ctx.out.dim(severity));
    }
    Ok(())
}

/// Show one error code
pub async fn error_code(ctx: &AppContext, code: &str) -> Result<()> {
    let catalog = ctx.catalog().await?;
    let entry = search::find_error_code(&catalog, code)?;

    if ctx.out.json {
        return ctx.out.print_json(entry);
    }

    println!("{}", ctx.out.heading(&format!("Error {}", entry.code)));
    println!("  {}", entry.description);
    if let Some(severity) = &entry.severity {
        println!("  severity: {severity}");
    }
    if let Some(cause) = &entry.cause {
        println!("  cause: {cause}");
    }
    if let Some(solution) = &entry.solution {
        println!("  solution: {solution}");
    }
    Ok(())
}

/// Run a diag command
pub async fn run(ctx: &AppContext, action: &str, query: Option<String>) -> Result<()> {
    let catalog = ctx.catalog().await?;

    match action {
        "rails" | "measurements" => {
            if catalog.measurements.is_none() {
                bail!("Dataset measurements is not loaded");
            }
            let boards = search::measurements_for(&catalog, query.as_deref().unwrap_or(""));
            if ctx.out.json {
                return ctx.out.print_json(&boards);
            }
            if boards.is_empty() {
                println!("No measurements match.");
                return Ok(());
            }
            for board in boards {
                let device = board.device.as_deref().unwrap_or("");
                println!("{} {}", ctx.out.heading(&board.board), ctx.out.dim(device));
                for rail in &board.rails {
                    println!(
                        "  {:<20} diode {:<8} {:<8} {}",
                        rail.name,
                        rail.diode_mode.as_deref().unwrap_or("—"),
                        rail.voltage.as_deref().unwrap_or("—"),
                        rail.note.as_deref().unwrap_or("")
                    );
                }
            }
        }

        "keys" | "combos" => {
            if catalog.key_combinations.is_none() {
                bail!("Dataset key_combinations is not loaded");
            }
            let combos = search::search_key_combinations(&catalog, query.as_deref());
            if ctx.out.json {
                return ctx.out.print_json(&combos);
            }
            if combos.is_empty() {
                println!("No key combinations match.");
                return Ok(());
            }
            for combo in combos {
                println!("{}", ctx.out.heading(&combo.action));
                println!("  keys: {}", combo.keys);
                if !combo.devices.is_empty() {
                    println!("  devices: {}", combo.devices.join(", "));
                }
                if let Some(notes) = &combo.notes {
                    println!("  {}", ctx.out.dim(notes));
                }
            }
        }

        "region" => {
            let code = query.ok_or_else(|| anyhow::anyhow!("Model or region code is required"))?;
            let found = search::find_regional_code(&catalog, &code)?;
            if ctx.out.json {
                return ctx.out.print_json(found);
            }
            println!("{}", ctx.out.heading(&found.code));
            if let Some(region) = &found.region {
                println!("  region: {region}");
            }
            if let Some(country) = &found.country {
                println!("  country: {country}");
            }
            if let Some(notes) = &found.notes {
                println!("  {notes}");
            }
        }

        other => {
            bail!("Unknown action: {}. Valid: rails, keys, region", other);
        }
    }

    Ok(())
}
