// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Remote snapshot fetching.
//!
//! A single GET against the OpenSky `states/all` endpoint, parsed into
//! [`FlightRecord`]s. Records without a position are dropped and the result
//! is capped at [`DEFAULT_MAX_RECORDS`] entries in response order.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;

use crate::model::{FlightRecord, StatesResponse};

/// Public OpenSky endpoint serving every tracked state vector.
pub const DEFAULT_API_URL: &str = "https://opensky-network.org/api/states/all";

/// Performance cap on the number of records kept from one snapshot.
pub const DEFAULT_MAX_RECORDS: usize = 500;

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("server responded with {status} {reason}")]
    Transport { status: u16, reason: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-success status or network failure.
    Transport,
    /// The body could not be parsed.
    Parse,
}

impl FetchError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Network(_) => ErrorKind::Transport,
            Self::Parse(_) => ErrorKind::Parse,
        }
    }
}

/// Anything that can produce a flight snapshot.
pub trait FlightSource: Send + Sync + 'static {
    /// Fetch one complete snapshot. Partial results are never returned.
    fn fetch_snapshot(
        &self,
    ) -> impl Future<Output = Result<Vec<FlightRecord>, FetchError>> + Send;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Endpoint URL.
    pub url: String,
    /// Maximum number of records kept per snapshot.
    pub max_records: usize,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// User agent sent with each request.
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            max_records: DEFAULT_MAX_RECORDS,
            timeout: Duration::from_secs(20),
            user_agent: concat!("opensky-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP fetcher for the OpenSky state-vector API.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Fetch and parse one snapshot.
    pub async fn fetch(&self) -> Result<Vec<FlightRecord>, FetchError> {
        let response = self.client.get(&self.config.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Transport {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        let flights = parse_snapshot(&body, self.config.max_records)?;
        debug!("Fetched {} flights from {}", flights.len(), self.config.url);

        Ok(flights)
    }
}

impl FlightSource for Fetcher {
    fn fetch_snapshot(
        &self,
    ) -> impl Future<Output = Result<Vec<FlightRecord>, FetchError>> + Send {
        self.fetch()
    }
}

/// Parse a `states/all` response body.
///
/// A missing or null `states` field yields an empty snapshot. Vectors
/// without a position are skipped, later duplicates of an `icao24` are
/// dropped, and at most `max_records` records are kept in response order.
pub fn parse_snapshot(body: &str, max_records: usize) -> Result<Vec<FlightRecord>, FetchError> {
    let response: StatesResponse = serde_json::from_str(body)?;
    let Some(states) = response.states else {
        return Ok(Vec::new());
    };

    let mut seen = HashSet::new();
    let flights = states
        .into_iter()
        .filter_map(FlightRecord::from_state_vector)
        .filter(|record| {
            let fresh = seen.insert(record.icao24.clone());
            if !fresh {
                warn!("Dropping duplicate state vector for {}", record.icao24);
            }
            fresh
        })
        .take(max_records)
        .collect();

    Ok(flights)
}
