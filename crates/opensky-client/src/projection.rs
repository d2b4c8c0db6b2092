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

//! View projections derived from store state.
//!
//! The free functions are pure derivations over a snapshot. The
//! [`ProjectionCache`] keeps their results as indices into the snapshot and
//! only recomputes a projection when the state it depends on changes.

use std::collections::HashMap;

use crate::model::FlightRecord;
use crate::storage::KeyValueStore;
use crate::store::AppStore;

fn watchlist_indices(flights: &[FlightRecord], watchlist: &[String]) -> Vec<usize> {
    let by_id: HashMap<&str, usize> = flights
        .iter()
        .enumerate()
        .map(|(idx, flight)| (flight.icao24.as_str(), idx))
        .collect();

    watchlist
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect()
}

fn search_indices(flights: &[FlightRecord], term: &str) -> Vec<usize> {
    if term.is_empty() {
        return Vec::new();
    }

    let needle = term.to_lowercase();
    flights
        .iter()
        .enumerate()
        .filter(|(_, flight)| flight.callsign_contains(&needle))
        .map(|(idx, _)| idx)
        .collect()
}

fn selected_index(flights: &[FlightRecord], selected: Option<&str>) -> Option<usize> {
    let selected = selected?;
    flights.iter().position(|flight| flight.icao24 == selected)
}

/// Watched flights present in the snapshot, in watchlist order.
///
/// Identifiers without a matching record are skipped.
#[must_use]
pub fn watchlist_view<'a>(flights: &'a [FlightRecord], watchlist: &[String]) -> Vec<&'a FlightRecord> {
    watchlist_indices(flights, watchlist)
        .into_iter()
        .map(|idx| &flights[idx])
        .collect()
}

/// Flights whose callsign contains `term`, ignoring case.
///
/// An empty term yields no results. Flights without a callsign never match.
#[must_use]
pub fn search_view<'a>(flights: &'a [FlightRecord], term: &str) -> Vec<&'a FlightRecord> {
    search_indices(flights, term)
        .into_iter()
        .map(|idx| &flights[idx])
        .collect()
}

/// The selected flight, if it is in the snapshot.
#[must_use]
pub fn selected_view<'a>(
    flights: &'a [FlightRecord],
    selected: Option<&str>,
) -> Option<&'a FlightRecord> {
    selected_index(flights, selected).map(|idx| &flights[idx])
}

/// Resolved projections borrowed from a store.
#[derive(Debug, Clone, Default)]
pub struct Views<'a> {
    pub watchlist: Vec<&'a FlightRecord>,
    pub search_results: Vec<&'a FlightRecord>,
    pub selected: Option<&'a FlightRecord>,
}

/// A cached projection keyed by the state it was derived from.
#[derive(Debug, Default)]
struct Cached<Key, Value> {
    key: Option<Key>,
    value: Value,
}

impl<Key: PartialEq, Value> Cached<Key, Value> {
    /// Recompute when `key` differs from the cached one. Returns whether it
    /// recomputed.
    fn refresh(&mut self, key: Key, compute: impl FnOnce() -> Value) -> bool {
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.value = compute();
        self.key = Some(key);
        true
    }
}

/// Memoized projections over an [`AppStore`].
///
/// Call [`update`](Self::update) after applying events, then
/// [`views`](Self::views) with the same store to resolve the results.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    watchlist: Cached<(u64, u64), Vec<usize>>,
    search: Cached<(u64, String), Vec<usize>>,
    selected: Cached<(u64, Option<String>), Option<usize>>,
    recomputations: u64,
}

impl ProjectionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring every projection up to date with `store`.
    pub fn update<K: KeyValueStore>(&mut self, store: &AppStore<K>) {
        let flights = store.flights();
        let snapshot = store.snapshot_revision();

        let recomputed = [
            self.watchlist
                .refresh((snapshot, store.watchlist_revision()), || {
                    watchlist_indices(flights, store.watchlist())
                }),
            self.search
                .refresh((snapshot, store.search_term().to_string()), || {
                    search_indices(flights, store.search_term())
                }),
            self.selected
                .refresh((snapshot, store.selected().map(str::to_string)), || {
                    selected_index(flights, store.selected())
                }),
        ];

        self.recomputations += recomputed.iter().filter(|r| **r).count() as u64;
    }

    /// Resolve cached indices against `store`'s snapshot.
    ///
    /// The store must not have changed since the last [`update`](Self::update).
    #[must_use]
    pub fn views<'a, K: KeyValueStore>(&self, store: &'a AppStore<K>) -> Views<'a> {
        let flights = store.flights();
        let resolve = |indices: &[usize]| -> Vec<&'a FlightRecord> {
            indices.iter().filter_map(|idx| flights.get(*idx)).collect()
        };

        Views {
            watchlist: resolve(&self.watchlist.value),
            search_results: resolve(&self.search.value),
            selected: self.selected.value.and_then(|idx| flights.get(idx)),
        }
    }

    /// Total number of projection recomputations so far.
    #[must_use]
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::record;
    use crate::storage::MemoryStore;
    use crate::store::{StoreConfig, StoreEvent};

    fn ids(flights: &[&FlightRecord]) -> Vec<String> {
        flights.iter().map(|f| f.icao24.clone()).collect()
    }

    #[test]
    fn test_watchlist_drops_missing_and_keeps_order() {
        let flights = vec![record("C", None), record("B", None), record("D", None)];
        let watchlist = vec!["A".to_string(), "B".to_string(), "C".to_string()];

        assert_eq!(ids(&watchlist_view(&flights, &watchlist)), vec!["B", "C"]);
    }

    #[test]
    fn test_search_matching() {
        let flights = vec![
            record("1", Some("ab123")),
            record("2", None),
            record("3", Some("XAB9")),
            record("4", Some("KLM1")),
        ];

        assert_eq!(ids(&search_view(&flights, "AB")), vec!["1", "3"]);
        assert!(search_view(&flights, "").is_empty());
    }

    #[test]
    fn test_selected_lookup() {
        let flights = vec![record("1", None), record("2", None)];
        assert_eq!(selected_view(&flights, Some("2")).unwrap().icao24, "2");
        assert!(selected_view(&flights, Some("9")).is_none());
        assert!(selected_view(&flights, None).is_none());
    }

    #[test]
    fn test_cache_recomputes_only_on_change() {
        let mut store = AppStore::new(MemoryStore::new(), StoreConfig::default());
        let mut cache = ProjectionCache::new();

        store.process_event(StoreEvent::RefreshSucceeded {
            seq: 1,
            flights: vec![record("a", Some("DLH1")), record("b", Some("UAL2"))],
        });
        cache.update(&store);
        assert_eq!(cache.recomputations(), 3);

        cache.update(&store);
        assert_eq!(cache.recomputations(), 3);

        store.process_event(StoreEvent::SetSearchTerm("dlh".into()));
        cache.update(&store);
        assert_eq!(cache.recomputations(), 4);
        assert_eq!(ids(&cache.views(&store).search_results), vec!["a"]);

        store.process_event(StoreEvent::AddToWatchlist("b".into()));
        store.process_event(StoreEvent::Select("b".into()));
        cache.update(&store);
        assert_eq!(cache.recomputations(), 6);

        let views = cache.views(&store);
        assert_eq!(ids(&views.watchlist), vec!["b"]);
        assert_eq!(views.selected.map(|f| f.icao24.as_str()), Some("b"));
    }

    #[test]
    fn test_cache_follows_new_snapshot() {
        let mut store = AppStore::new(MemoryStore::new(), StoreConfig::default());
        let mut cache = ProjectionCache::new();
        store.process_event(StoreEvent::AddToWatchlist("a".into()));
        store.process_event(StoreEvent::Select("a".into()));

        store.process_event(StoreEvent::RefreshSucceeded {
            seq: 1,
            flights: vec![record("a", None)],
        });
        cache.update(&store);
        assert_eq!(cache.views(&store).watchlist.len(), 1);

        store.process_event(StoreEvent::RefreshSucceeded {
            seq: 2,
            flights: vec![record("z", None)],
        });
        cache.update(&store);

        let views = cache.views(&store);
        assert!(views.watchlist.is_empty());
        assert!(views.selected.is_none());
    }
}
