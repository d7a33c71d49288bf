// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Healer commands - inspect the error log and try the matcher

use super::AppContext;
use crate::healer::{Healer, LOG_CAPACITY};
use anyhow::{bail, Context, Result};

/// Run healer command
pub fn run(ctx: &AppContext, action: &str, message: Option<String>) -> Result<()> {
    let mut healer = Healer::open(&ctx.config.data_dir);

    match action {
        "log" | "list" | "ls" => {
            let log = healer.log();
            if ctx.out.json {
                let entries: Vec<_> = log.entries().collect();
                return ctx.out.print_json(&entries);
            }
            if log.is_empty() {
                println!("Error log is empty.");
                return Ok(());
            }
            println!("{}", ctx.out.heading(&format!("Error log ({}/{}):", log.len(), LOG_CAPACITY)));
            for entry in log.entries().rev() {
                let action = entry
                    .context
                    .action
                    .as_deref()
                    .map(|a| format!(" {a}"))
                    .unwrap_or_default();
                println!(
                    "  {} [{}{}] {}",
                    ctx.out.dim(&entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                    entry.context.component,
                    action,
                    entry.message
                );
                if let Some(fix) = &entry.fix {
                    println!("    {} {}", ctx.out.severity(fix.severity), fix.suggestion);
                }
            }
        }

        "clear" => {
            let dropped = healer.log().len();
            healer.clear().context("Failed to clear error log")?;
            println!("Cleared {dropped} log entries.");
        }

        "match" | "suggest" => {
            let message = message.ok_or_else(|| anyhow::anyhow!("Error message is required"))?;
            let fix = healer.matcher().find_fix(&message);
            if ctx.out.json {
                return ctx.out.print_json(&fix);
            }
            match fix {
                Some(fix) => println!("{} {}", ctx.out.severity(fix.severity), fix.suggestion),
                None => println!("No suggestion for this message."),
            }
        }

        other => {
            bail!("Unknown action: {}. Valid: log, clear, match", other);
        }
    }

    Ok(())
}
