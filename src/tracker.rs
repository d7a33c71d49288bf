// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Power-station price tracker - client for the price history API

use crate::types::{LivePrice, PriceHistoryRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// Tracker API failures
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No API URL configured
    #[error("Tracker API url is not configured")]
    NotConfigured,

    /// Configured API URL is not a valid URL
    #[error("Invalid tracker API url {url:?}: {source}")]
    InvalidUrl {
        /// The configured value
        url: String,
        /// Parse error
        #[source]
        source: url::ParseError,
    },

    /// Transport failure
    #[error("Tracker request '{action}' failed: {source}")]
    Request {
        /// API action
        action: &'static str,
        /// Underlying HTTP error
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status
    #[error("HTTP {status} from tracker API ({action})")]
    Status {
        /// API action
        action: &'static str,
        /// HTTP status code
        status: u16,
    },
}

/// Payload for `POST {action: "record"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Station id
    pub id: String,
    /// EU shop price
    pub price_eu: Option<f64>,
    /// Amazon.de price
    pub amazon_de: Option<f64>,
    /// UA shop price
    pub price_ua: Option<f64>,
    /// Where the price came from
    pub source: Option<String>,
}

impl From<&LivePrice> for RecordRequest {
    fn from(live: &LivePrice) -> Self {
        Self {
            id: live.id.clone(),
            price_eu: live.price_eu,
            amazon_de: live.amazon_de,
            price_ua: live.price_ua,
            source: live.source.clone(),
        }
    }
}

#[derive(Serialize)]
struct RecordBody<'a> {
    action: &'static str,
    #[serde(flatten)]
    record: &'a RecordRequest,
}

/// The API answers either with a bare list or with `{ "data": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(v) | Self::Wrapped { data: v } => v,
        }
    }
}

/// HTTP client for the price tracker API
#[derive(Debug, Clone)]
pub struct TrackerClient {
    base: Url,
    http: reqwest::Client,
}

impl TrackerClient {
    /// Client for the API at `api_url`
    pub fn new(api_url: Option<&str>) -> Result<Self, TrackerError> {
        let url = api_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(TrackerError::NotConfigured)?;
        let base = Url::parse(url).map_err(|source| TrackerError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|source| TrackerError::Request { action: "init", source })?;
        Ok(Self { base, http })
    }

    /// API base URL
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    async fn get_list<T: DeserializeOwned>(&self, action: &'static str) -> Result<Vec<T>, TrackerError> {
        debug!("GET {} action={}", self.base, action);
        let response = self
            .http
            .get(self.base.clone())
            .query(&[("action", action)])
            .send()
            .await
            .map_err(|source| TrackerError::Request { action, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Status { action, status: status.as_u16() });
        }

        let listing: Listing<T> = response
            .json()
            .await
            .map_err(|source| TrackerError::Request { action, source })?;
        Ok(listing.into_vec())
    }

    /// Current prices of every tracked station
    pub async fn fetch_live(&self) -> Result<Vec<LivePrice>, TrackerError> {
        self.get_list("fetch-live").await
    }

    /// Every stored history row
    pub async fn history_all(&self) -> Result<Vec<PriceHistoryRecord>, TrackerError> {
        self.get_list("history-all").await
    }

    /// Store one price observation
    pub async fn record(&self, record: &RecordRequest) -> Result<(), TrackerError> {
        let action = "record";
        debug!("POST {} action={} id={}", self.base, action, record.id);
        let response = self
            .http
            .post(self.base.clone())
            .json(&RecordBody { action, record })
            .send()
            .await
            .map_err(|source| TrackerError::Request { action, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Status { action, status: status.as_u16() });
        }
        Ok(())
    }
}

/// A price that moved between two snapshots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChange {
    /// Station id
    pub id: String,
    /// Which price: `price_eu`, `amazon_de` or `price_ua`
    pub field: &'static str,
    /// Before
    pub old: Option<f64>,
    /// After
    pub new: Option<f64>,
}

/// Prices that differ between `prev` and `next`; stations new in `next` are skipped
#[must_use]
pub fn diff_prices(prev: &[LivePrice], next: &[LivePrice]) -> Vec<PriceChange> {
    let before: HashMap<&str, &LivePrice> = prev.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut changes = Vec::new();

    for now in next {
        let Some(was) = before.get(now.id.as_str()) else {
            continue;
        };
        for (field, old, new) in [
            ("price_eu", was.price_eu, now.price_eu),
            ("amazon_de", was.amazon_de, now.amazon_de),
            ("price_ua", was.price_ua, now.price_ua),
        ] {
            if old != new {
                changes.push(PriceChange { id: now.id.clone(), field, old, new });
            }
        }
    }
    changes
}

/// Outcome of one polling tick
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Stations fetched
    pub fetched: usize,
    /// Rows stored
    pub recorded: usize,
    /// Prices that moved since the previous tick
    pub changes: Vec<PriceChange>,
}

/// Periodically fetches live prices and records them
pub struct Poller {
    client: TrackerClient,
    interval: Duration,
    last: Option<Vec<LivePrice>>,
}

impl Poller {
    /// Poll `client` every `interval`
    #[must_use]
    pub fn new(client: TrackerClient, interval: Duration) -> Self {
        Self { client, interval, last: None }
    }

    /// Fetch, record and diff once
    pub async fn tick(&mut self) -> Result<TickReport, TrackerError> {
        let live = self.client.fetch_live().await?;

        let mut recorded = 0;
        for price in &live {
            match self.client.record(&RecordRequest::from(price)).await {
                Ok(()) => recorded += 1,
                Err(e) => warn!("Could not record {}: {}", price.id, e),
            }
        }

        let changes = self
            .last
            .as_deref()
            .map(|prev| diff_prices(prev, &live))
            .unwrap_or_default();

        let report = TickReport { fetched: live.len(), recorded, changes };
        self.last = Some(live);
        Ok(report)
    }

    /// Tick `iterations` times (0 = until Ctrl-C), handing each report to `on_tick`
    ///
    /// A failed tick is logged and polling carries on. Ctrl-C is honoured
    /// both while waiting and in the middle of a tick.
    pub async fn run(&mut self, iterations: u32, mut on_tick: impl FnMut(u32, &TickReport)) {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        let mut count = 0u32;

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                _ = &mut shutdown => {
                    info!("Polling stopped");
                    return;
                }
            }

            count += 1;
            let outcome = tokio::select! {
                outcome = self.tick() => outcome,
                _ = &mut shutdown => {
                    info!("Polling stopped during poll {}", count);
                    return;
                }
            };
            match outcome {
                Ok(report) => on_tick(count, &report),
                Err(e) => warn!("Poll {} failed: {}", count, e),
            }

            if iterations != 0 && count >= iterations {
                return;
            }
        }
    }
}
