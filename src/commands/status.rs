// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Status command - which datasets loaded

use super::AppContext;
use anyhow::Result;

/// Run the status command
pub async fn run(ctx: &AppContext) -> Result<()> {
    let catalog = ctx.catalog().await?;
    let summary = catalog.summary();

    if ctx.out.json {
        return ctx.out.print_json(&serde_json::json!({
            "dataset": ctx.config.dataset,
            "data_dir": ctx.config.data_dir,
            "datasets": summary,
        }));
    }

    println!("{}", ctx.out.heading(&format!("Datasets from {}", ctx.config.dataset)));
    for status in &summary {
        let state = if status.loaded {
            format!("{} records", status.records)
        } else {
            ctx.out.dim("not loaded")
        };
        println!("  {:<18} {}", status.name, state);
    }

    let loaded = summary.iter().filter(|s| s.loaded).count();
    println!();
    println!("{loaded}/{} datasets loaded", summary.len());
    println!("State directory: {}", ctx.config.data_dir.display());
    Ok(())
}
