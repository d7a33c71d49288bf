// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

use super::AppContext;
use crate::config;
use anyhow::{bail, Context, Result};

/// Run config command
pub fn run(ctx: &AppContext, action: &str, key: Option<String>, value: Option<String>) -> Result<()> {
    match action {
        "show" => {
            if ctx.out.json {
                return ctx.out.print_json(&ctx.config);
            }
            let text = toml::to_string_pretty(&ctx.config).context("Failed to serialize config")?;
            print!("{text}");
        }

        "get" => {
            let key = key.ok_or_else(|| anyhow::anyhow!("Configuration key is required"))?;
            match config::get_value(&ctx.config, &key)? {
                Some(toml::Value::String(s)) => println!("{s}"),
                Some(v) => println!("{v}"),
                None => bail!("Invalid configuration key: {key}"),
            }
        }

        "set" => {
            let key = key.ok_or_else(|| anyhow::anyhow!("Configuration key is required"))?;
            let value = value.ok_or_else(|| anyhow::anyhow!("Value is required"))?;
            tracing::info!("Setting {} = {}", key, value);
            config::set_value(&ctx.config_path, &key, &value)?;
            println!("Set {key} = {value} in {}", ctx.config_path.display());
        }

        "path" => {
            println!("{}", ctx.config_path.display());
        }

        other => {
            bail!("Unknown action: {}. Valid: show, get, set, path", other);
        }
    }
    Ok(())
}
