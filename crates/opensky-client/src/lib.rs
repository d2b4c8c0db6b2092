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

//! OpenSky Network client library for live flight tracking.
//!
//! This library polls the OpenSky `states/all` endpoint and keeps the
//! client-side state a flight tracker needs. It is split into layers that
//! can be used independently or composed together:
//!
//! - **Fetch layer**: one HTTP request, parsed into [`FlightRecord`]s
//! - **Scheduler layer**: fixed-interval refresh with a replaceable action
//! - **Store layer**: snapshot, watchlist, selection and search state with
//!   an explicit event-driven transition table
//! - **Projection layer**: watchlist, search and selection views with
//!   revision-keyed memoization
//! - **Storage layer**: synchronous key-value persistence for the watchlist
//!
//! # Quick Start
//!
//! Use [`FlightFeed`] to poll and apply its events to an [`AppStore`]:
//!
//! ```no_run
//! use opensky_client::{
//!     AppStore, Fetcher, FetcherConfig, FlightFeed, MemoryStore, ProjectionCache, StoreConfig,
//! };
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let fetcher = Fetcher::new(FetcherConfig::default()).unwrap();
//!     let mut feed = FlightFeed::spawn(fetcher, Duration::from_secs(15), None);
//!     let mut store = AppStore::new(MemoryStore::new(), StoreConfig::default());
//!     let mut views = ProjectionCache::new();
//!
//!     while let Some(event) = feed.recv().await {
//!         store.process_event(event.into());
//!         views.update(&store);
//!         println!("{} flights, {} watched", store.flights().len(), views.views(&store).watchlist.len());
//!     }
//! }
//! ```
//!
//! # Using Individual Layers
//!
//! ## Parsing Only
//!
//! ```
//! use opensky_client::fetch::parse_snapshot;
//!
//! let body = r#"{"time": 1700000000, "states": [
//!     ["4b1814", "SWR123  ", "Switzerland", 1700000000, 1700000000, 8.55, 47.45,
//!      10363.2, false, 231.4, 84.0, 0.0, null, 10591.8, "1000", false, 0]
//! ]}"#;
//! let flights = parse_snapshot(body, 500).unwrap();
//! assert_eq!(flights[0].callsign.as_deref(), Some("SWR123"));
//! ```
//!
//! ## Store and Projections Only
//!
//! ```
//! use opensky_client::{AppStore, MemoryStore, StoreConfig, StoreEvent};
//! use opensky_client::projection::search_view;
//!
//! let mut store = AppStore::new(MemoryStore::new(), StoreConfig::default());
//! store.process_event(StoreEvent::AddToWatchlist("4b1814".to_string()));
//! store.process_event(StoreEvent::SetSearchTerm("swr".to_string()));
//!
//! assert_eq!(store.watchlist(), ["4b1814".to_string()]);
//! assert!(search_view(store.flights(), store.search_term()).is_empty());
//! ```

pub mod feed;
pub mod fetch;
pub mod model;
pub mod projection;
pub mod scheduler;
pub mod storage;
pub mod store;

pub use feed::{FeedEvent, FlightFeed, Notifier};
pub use fetch::{
    parse_snapshot, ErrorKind, FetchError, Fetcher, FetcherConfig, FlightSource, DEFAULT_API_URL,
    DEFAULT_MAX_RECORDS,
};
pub use model::{FlightRecord, PositionSource, StateVector, VerticalTrend, UNKNOWN_CALLSIGN};
pub use projection::{ProjectionCache, Views};
pub use scheduler::{RefreshScheduler, DEFAULT_REFRESH_INTERVAL};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, WATCHLIST_KEY};
pub use store::{AppStore, RequestStatus, StoreConfig, StoreEvent, FETCH_ERROR_MESSAGE};
