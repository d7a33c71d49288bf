// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Watch/buy list commands

use super::AppContext;
use crate::watchlist::{ListKind, Watchlists};
use anyhow::{bail, Result};

/// Run watch command
pub fn run(
    ctx: &AppContext,
    action: &str,
    list: ListKind,
    item: Option<String>,
    note: Option<String>,
) -> Result<()> {
    let data_dir = &ctx.config.data_dir;
    let mut lists = Watchlists::load(data_dir)?;

    match action {
        "add" => {
            let item = item.ok_or_else(|| anyhow::anyhow!("Item is required"))?;
            if lists.add(list, &item, note) {
                lists.save(data_dir)?;
                println!("Added {item} to {list} list");
            } else {
                println!("{item} already in {list} list");
            }
        }

        "remove" | "rm" => {
            let item = item.ok_or_else(|| anyhow::anyhow!("Item is required"))?;
            if lists.remove(list, &item) {
                lists.save(data_dir)?;
                println!("Removed {item} from {list} list");
            } else {
                println!("{item} not in {list} list");
            }
        }

        "list" | "ls" => {
            let items = lists.list(list);
            if ctx.out.json {
                return ctx.out.print_json(items);
            }
            if items.is_empty() {
                println!("The {list} list is empty.");
                return Ok(());
            }
            println!("{}", ctx.out.heading(&format!("{list} list ({}):", items.len())));
            for entry in items {
                let note = entry.note.as_deref().map(|n| format!(" - {n}")).unwrap_or_default();
                println!(
                    "  {} {}{}",
                    ctx.out.dim(&entry.added_at.format("%Y-%m-%d").to_string()),
                    entry.item,
                    note
                );
            }
        }

        "clear" => {
            let dropped = lists.clear(list);
            lists.save(data_dir)?;
            println!("Cleared {dropped} item(s) from {list} list");
        }

        other => {
            bail!("Unknown action: {}. Valid: add, remove, list, clear", other);
        }
    }

    Ok(())
}
