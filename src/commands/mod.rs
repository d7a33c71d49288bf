// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod calc;
pub mod completions;
pub mod config;
pub mod devices;
pub mod diag;
pub mod healer;
pub mod ic;
pub mod parts;
pub mod status;
pub mod tracker;
pub mod watch;

use crate::catalog::{Catalog, DataSource};
use crate::config::Config;
use crate::output::Output;
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

/// Everything a command needs besides its own arguments
pub struct AppContext {
    /// Effective configuration
    pub config: Config,
    /// File the configuration was read from (and `config set` writes to)
    pub config_path: PathBuf,
    /// Output mode
    pub out: Output,
}

impl AppContext {
    /// Load the catalog from the configured dataset source
    pub async fn catalog(&self) -> Result<Catalog> {
        let source = DataSource::parse(&self.config.dataset)?;
        debug!("Loading datasets from {}", source);
        Ok(Catalog::load(source).await)
    }
}
