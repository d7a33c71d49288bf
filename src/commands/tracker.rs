// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Tracker commands - power-station prices

use super::AppContext;
use crate::pricing::{format_optional, Currency};
use crate::tracker::{Poller, RecordRequest, TrackerClient};
use anyhow::{bail, Result};
use std::time::Duration;
use tracing::info;

/// Arguments for tracker commands
pub struct TrackerArgs {
    /// Station id (record)
    pub id: Option<String>,
    /// EU shop price (record)
    pub price_eu: Option<f64>,
    /// Amazon.de price (record)
    pub amazon_de: Option<f64>,
    /// UA shop price (record)
    pub price_ua: Option<f64>,
    /// Where the price came from (record)
    pub source: Option<String>,
    /// Seconds between polls, config default when absent (watch)
    pub interval: Option<u64>,
    /// Number of polls, 0 = until Ctrl-C (watch)
    pub count: u32,
}

fn client(ctx: &AppContext) -> Result<TrackerClient> {
    Ok(TrackerClient::new(ctx.config.tracker.api_url.as_deref())?)
}

/// Run tracker command
pub async fn run(ctx: &AppContext, action: &str, args: TrackerArgs) -> Result<()> {
    match action {
        "stations" | "list" | "ls" => {
            let catalog = ctx.catalog().await?;
            if catalog.power_stations.is_none() {
                bail!("Dataset power_stations is not loaded");
            }
            let stations = catalog.power_stations();
            if ctx.out.json {
                return ctx.out.print_json(stations);
            }
            println!("{}", ctx.out.heading(&format!("Power stations ({}):", stations.len())));
            for s in stations {
                let capacity = s.capacity_wh.map(|c| format!("{c} Wh")).unwrap_or_default();
                println!(
                    "  {:<18} {:<28} {:>9} {:>14} {:>16}",
                    s.id,
                    s.name,
                    capacity,
                    format_optional(s.price_eu, Currency::Eur),
                    format_optional(s.price_ua, Currency::Uah)
                );
            }
        }

        "live" => {
            let live = client(ctx)?.fetch_live().await?;
            if ctx.out.json {
                return ctx.out.print_json(&live);
            }
            if live.is_empty() {
                println!("No live prices.");
                return Ok(());
            }
            println!("{}", ctx.out.heading(&format!("Live prices ({}):", live.len())));
            for p in live {
                println!(
                    "  {:<18} EU {:>14}  Amazon.de {:>14}  UA {:>16}",
                    p.id,
                    format_optional(p.price_eu, Currency::Eur),
                    format_optional(p.amazon_de, Currency::Eur),
                    format_optional(p.price_ua, Currency::Uah)
                );
            }
        }

        "history" => {
            let mut history = client(ctx)?.history_all().await?;
            if let Some(id) = &args.id {
                history.retain(|h| &h.id == id);
            }
            if ctx.out.json {
                return ctx.out.print_json(&history);
            }
            if history.is_empty() {
                println!("No price history.");
                return Ok(());
            }
            for h in history {
                let when = h
                    .recorded_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "  {} {:<18} EU {:>14}  UA {:>16}  {}",
                    ctx.out.dim(&when),
                    h.id,
                    format_optional(h.price_eu, Currency::Eur),
                    format_optional(h.price_ua, Currency::Uah),
                    h.source.as_deref().unwrap_or("")
                );
            }
        }

        "record" => {
            let id = args.id.ok_or_else(|| anyhow::anyhow!("--id is required"))?;
            if args.price_eu.is_none() && args.amazon_de.is_none() && args.price_ua.is_none() {
                bail!("At least one of --price-eu, --amazon-de, --price-ua is required");
            }
            let record = RecordRequest {
                id: id.clone(),
                price_eu: args.price_eu,
                amazon_de: args.amazon_de,
                price_ua: args.price_ua,
                source: args.source.or_else(|| Some("manual".into())),
            };
            client(ctx)?.record(&record).await?;
            println!("Recorded price for {id}");
        }

        "watch" | "poll" => {
            let secs = args.interval.unwrap_or(ctx.config.tracker.poll_interval_secs).max(1);
            let client = client(ctx)?;
            info!("Polling {} every {}s", client.base(), secs);
            let mut poller = Poller::new(client, Duration::from_secs(secs));
            let out = ctx.out;

            poller
                .run(args.count, |n, report| {
                    if out.json {
                        let line = serde_json::json!({
                            "tick": n,
                            "fetched": report.fetched,
                            "recorded": report.recorded,
                            "changes": report.changes,
                        });
                        println!("{line}");
                        return;
                    }
                    println!(
                        "Poll {n}: {} stations, {} recorded, {} changed",
                        report.fetched,
                        report.recorded,
                        report.changes.len()
                    );
                    for change in &report.changes {
                        println!(
                            "  {} {}: {} -> {}",
                            change.id,
                            change.field,
                            change.old.map_or_else(|| "—".into(), |v| format!("{v:.2}")),
                            change.new.map_or_else(|| "—".into(), |v| format!("{v:.2}"))
                        );
                    }
                })
                .await;
        }

        other => {
            bail!("Unknown action: {}. Valid: stations, live, history, record, watch", other);
        }
    }

    Ok(())
}
