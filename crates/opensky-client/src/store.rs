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

//! Application state store.
//!
//! [`AppStore`] owns the current snapshot, the watchlist, the selection, the
//! search term and the request status. Every change goes through
//! [`AppStore::process_event`], one atomic transition per [`StoreEvent`].
//! Watchlist changes are written through to the injected
//! [`KeyValueStore`]; write failures are logged and otherwise ignored.

use log::{debug, error, info, warn};

use crate::fetch::FetchError;
use crate::model::FlightRecord;
use crate::storage::{load_watchlist, save_watchlist, KeyValueStore};

/// User-facing message shown for any failed refresh.
pub const FETCH_ERROR_MESSAGE: &str =
    "Could not fetch flight data. The service might be temporarily unavailable.";

/// Store behavior switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConfig {
    /// Drop refresh completions older than the last applied one instead of
    /// letting the last completion win.
    pub discard_stale_refreshes: bool,
}

/// Status of the remote data request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStatus {
    /// True until the first successful refresh.
    pub loading: bool,
    /// User-facing error from the most recent refresh, if it failed.
    pub error: Option<String>,
}

/// External events the store reacts to.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A refresh with sequence number `seq` was started.
    RefreshStarted { seq: u64 },
    /// Refresh `seq` completed with a fresh snapshot.
    RefreshSucceeded { seq: u64, flights: Vec<FlightRecord> },
    /// Refresh `seq` failed.
    RefreshFailed { seq: u64, message: String },
    /// Append an identifier to the watchlist if absent.
    AddToWatchlist(String),
    /// Remove an identifier from the watchlist.
    RemoveFromWatchlist(String),
    /// Select a flight, or clear the selection if it is already selected.
    Select(String),
    ClearSelection,
    /// Replace the search term verbatim.
    SetSearchTerm(String),
}

impl StoreEvent {
    /// Build a failure event from a fetch error, logging the cause.
    #[must_use]
    pub fn refresh_failed(seq: u64, err: &FetchError) -> Self {
        error!("Refresh #{seq} failed ({:?}): {err}", err.kind());
        Self::RefreshFailed {
            seq,
            message: FETCH_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Single owner of all client-side state.
pub struct AppStore<K: KeyValueStore> {
    storage: K,
    config: StoreConfig,
    flights: Vec<FlightRecord>,
    watchlist: Vec<String>,
    selected: Option<String>,
    search_term: String,
    status: RequestStatus,
    has_loaded: bool,
    last_applied_seq: Option<u64>,
    snapshot_revision: u64,
    watchlist_revision: u64,
}

impl<K: KeyValueStore> std::fmt::Debug for AppStore<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("flight_count", &self.flights.len())
            .field("watchlist", &self.watchlist)
            .field("selected", &self.selected)
            .field("search_term", &self.search_term)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<K: KeyValueStore> AppStore<K> {
    /// Create a store, loading the persisted watchlist from `storage`.
    pub fn new(storage: K, config: StoreConfig) -> Self {
        let watchlist = load_watchlist(&storage);
        info!("Starting with {} watched aircraft", watchlist.len());

        Self {
            storage,
            config,
            flights: Vec::new(),
            watchlist,
            selected: None,
            search_term: String::new(),
            status: RequestStatus {
                loading: true,
                error: None,
            },
            has_loaded: false,
            last_applied_seq: None,
            snapshot_revision: 0,
            watchlist_revision: 0,
        }
    }

    /// Apply one event.
    pub fn process_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::RefreshStarted { seq } => {
                debug!("Refresh #{seq} started");
                if !self.has_loaded {
                    self.status.loading = true;
                }
                self.status.error = None;
            }
            StoreEvent::RefreshSucceeded { seq, flights } => {
                if self.is_stale(seq) {
                    warn!("Discarding stale snapshot from refresh #{seq}");
                    return;
                }
                debug!("Refresh #{seq} applied {} flights", flights.len());
                self.flights = flights;
                self.snapshot_revision += 1;
                self.last_applied_seq = Some(seq);
                self.has_loaded = true;
                self.status.loading = false;
                self.status.error = None;
            }
            StoreEvent::RefreshFailed { seq, message } => {
                if self.is_stale(seq) {
                    warn!("Discarding stale failure from refresh #{seq}");
                    return;
                }
                self.last_applied_seq = Some(seq);
                self.status.loading = false;
                self.status.error = Some(message);
            }
            StoreEvent::AddToWatchlist(icao24) => {
                if !self.is_watched(&icao24) {
                    info!("Watching {icao24}");
                    self.watchlist.push(icao24);
                    self.watchlist_changed();
                }
            }
            StoreEvent::RemoveFromWatchlist(icao24) => {
                let before = self.watchlist.len();
                self.watchlist.retain(|id| *id != icao24);
                if self.selected.as_deref() == Some(icao24.as_str()) {
                    self.selected = None;
                }
                if self.watchlist.len() != before {
                    info!("Stopped watching {icao24}");
                    self.watchlist_changed();
                }
            }
            StoreEvent::Select(icao24) => {
                if self.selected.as_deref() == Some(icao24.as_str()) {
                    self.selected = None;
                } else {
                    self.selected = Some(icao24);
                }
            }
            StoreEvent::ClearSelection => {
                self.selected = None;
            }
            StoreEvent::SetSearchTerm(term) => {
                self.search_term = term;
            }
        }
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.config.discard_stale_refreshes
            && self.last_applied_seq.is_some_and(|applied| seq < applied)
    }

    fn watchlist_changed(&mut self) {
        self.watchlist_revision += 1;
        if let Err(e) = save_watchlist(&mut self.storage, &self.watchlist) {
            error!("Failed to persist watchlist: {e}");
        }
    }

    /// Current snapshot, in fetch order.
    #[must_use]
    pub fn flights(&self) -> &[FlightRecord] {
        &self.flights
    }

    /// Watched identifiers, in insertion order.
    #[must_use]
    pub fn watchlist(&self) -> &[String] {
        &self.watchlist
    }

    #[must_use]
    pub fn is_watched(&self, icao24: &str) -> bool {
        self.watchlist.iter().any(|id| id == icao24)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    #[must_use]
    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    /// Bumped every time a snapshot is applied.
    #[must_use]
    pub fn snapshot_revision(&self) -> u64 {
        self.snapshot_revision
    }

    /// Bumped every time the watchlist changes.
    #[must_use]
    pub fn watchlist_revision(&self) -> u64 {
        self.watchlist_revision
    }

    #[must_use]
    pub fn storage(&self) -> &K {
        &self.storage
    }
}
