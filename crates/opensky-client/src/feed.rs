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

//! Live flight feed.
//!
//! Binds a [`FlightSource`] to a [`RefreshScheduler`]. Each tick allocates
//! a sequence number, reports [`FeedEvent::Started`], and spawns the fetch;
//! the fetch task reports [`FeedEvent::Finished`] when it resolves. Fetches
//! may overlap. Events are queued on a channel for the owning thread to
//! drain and apply to its [`AppStore`](crate::store::AppStore).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::fetch::{FetchError, FlightSource};
use crate::model::FlightRecord;
use crate::scheduler::RefreshScheduler;
use crate::store::StoreEvent;

/// Callback fired after each queued event, e.g. to request a repaint.
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Progress of one refresh.
#[derive(Debug)]
pub enum FeedEvent {
    Started {
        seq: u64,
    },
    Finished {
        seq: u64,
        result: Result<Vec<FlightRecord>, FetchError>,
    },
}

impl FeedEvent {
    #[must_use]
    pub fn seq(&self) -> u64 {
        match self {
            Self::Started { seq } | Self::Finished { seq, .. } => *seq,
        }
    }
}

impl From<FeedEvent> for StoreEvent {
    fn from(event: FeedEvent) -> Self {
        match event {
            FeedEvent::Started { seq } => StoreEvent::RefreshStarted { seq },
            FeedEvent::Finished {
                seq,
                result: Ok(flights),
            } => StoreEvent::RefreshSucceeded { seq, flights },
            FeedEvent::Finished {
                seq,
                result: Err(e),
            } => StoreEvent::refresh_failed(seq, &e),
        }
    }
}

/// Handle to a running feed. Dropping it stops the refresh timer.
pub struct FlightFeed {
    scheduler: RefreshScheduler,
    event_rx: mpsc::UnboundedReceiver<FeedEvent>,
}

impl std::fmt::Debug for FlightFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightFeed")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl FlightFeed {
    /// Start polling `source` every `interval`, beginning immediately.
    ///
    /// Must be called from within a tokio runtime; fetch tasks are spawned
    /// on that runtime even when a refresh is triggered from another thread.
    #[must_use]
    pub fn spawn<S: FlightSource>(source: S, interval: Duration, notifier: Option<Notifier>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let source = Arc::new(source);
        let next_seq = Arc::new(AtomicU64::new(1));
        let runtime = Handle::current();

        info!("Starting flight feed, refreshing every {}s", interval.as_secs());

        let scheduler = RefreshScheduler::spawn(interval, move || {
            let seq = next_seq.fetch_add(1, Ordering::Relaxed);
            start_refresh(&runtime, &source, seq, &event_tx, notifier.as_ref());
        });

        Self {
            scheduler,
            event_rx,
        }
    }

    /// Refresh immediately, outside the regular cadence.
    pub fn refresh_now(&self) -> bool {
        info!("Manual refresh requested");
        self.scheduler.trigger()
    }

    /// Take every event queued so far without waiting.
    pub fn drain(&mut self) -> Vec<FeedEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        self.event_rx.recv().await
    }

    /// Stop the refresh timer. Fetches already in flight still report.
    pub fn shutdown(&self) {
        self.scheduler.stop();
    }
}

fn start_refresh<S: FlightSource>(
    runtime: &Handle,
    source: &Arc<S>,
    seq: u64,
    event_tx: &mpsc::UnboundedSender<FeedEvent>,
    notifier: Option<&Notifier>,
) {
    if event_tx.send(FeedEvent::Started { seq }).is_err() {
        return; // Receiver dropped
    }
    if let Some(notify) = notifier {
        notify();
    }

    let source = Arc::clone(source);
    let event_tx = event_tx.clone();
    let notifier = notifier.cloned();

    runtime.spawn(async move {
        let result = source.fetch_snapshot().await;
        debug!("Refresh #{seq} finished (ok: {})", result.is_ok());

        if event_tx.send(FeedEvent::Finished { seq, result }).is_ok() {
            if let Some(notify) = notifier {
                notify();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::record;
    use crate::storage::MemoryStore;
    use crate::store::{AppStore, StoreConfig, FETCH_ERROR_MESSAGE};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// One scripted response: delay, then either flights or a 503.
    type Step = (Duration, Option<Vec<FlightRecord>>);

    struct ScriptedSource {
        steps: Mutex<VecDeque<Step>>,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
            }
        }
    }

    impl FlightSource for ScriptedSource {
        fn fetch_snapshot(
            &self,
        ) -> impl Future<Output = Result<Vec<FlightRecord>, FetchError>> + Send {
            let (delay, flights) = self
                .steps
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((Duration::ZERO, Some(Vec::new())));

            async move {
                tokio::time::sleep(delay).await;
                flights.ok_or(FetchError::Transport {
                    status: 503,
                    reason: "Service Unavailable".to_string(),
                })
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_started_then_finished() {
        let source = ScriptedSource::new(vec![(Duration::ZERO, Some(vec![record("a", None)]))]);
        let mut feed = FlightFeed::spawn(source, Duration::from_secs(15), None);

        let started = feed.recv().await.unwrap();
        assert!(matches!(started, FeedEvent::Started { seq: 1 }));

        match feed.recv().await.unwrap() {
            FeedEvent::Finished { seq, result } => {
                assert_eq!(seq, 1);
                assert_eq!(result.unwrap().len(), 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_refreshes_complete_out_of_order() {
        let source = ScriptedSource::new(vec![
            (Duration::from_secs(20), Some(vec![record("slow", None)])),
            (Duration::from_secs(1), Some(vec![record("fast", None)])),
        ]);
        let mut feed = FlightFeed::spawn(source, Duration::from_secs(15), None);

        let mut finished = Vec::new();
        while finished.len() < 2 {
            if let FeedEvent::Finished { seq, .. } = feed.recv().await.unwrap() {
                finished.push(seq);
            }
        }

        assert_eq!(finished, vec![2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_then_manual_retry_updates_store() {
        let source = ScriptedSource::new(vec![
            (Duration::ZERO, Some(vec![record("a", None)])),
            (Duration::ZERO, None),
            (Duration::ZERO, Some(vec![record("b", None)])),
        ]);
        let mut feed = FlightFeed::spawn(source, Duration::from_secs(15), None);
        let mut store = AppStore::new(MemoryStore::new(), StoreConfig::default());

        // Initial load
        for _ in 0..2 {
            store.process_event(feed.recv().await.unwrap().into());
        }
        assert_eq!(store.flights()[0].icao24, "a");

        // Scheduled tick fails
        for _ in 0..2 {
            store.process_event(feed.recv().await.unwrap().into());
        }
        assert!(!store.status().loading);
        assert_eq!(store.status().error.as_deref(), Some(FETCH_ERROR_MESSAGE));
        assert_eq!(store.flights()[0].icao24, "a");

        // Retry succeeds
        assert!(feed.refresh_now());
        for _ in 0..2 {
            store.process_event(feed.recv().await.unwrap().into());
        }
        assert_eq!(store.status().error, None);
        assert_eq!(store.flights()[0].icao24, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifier_and_drain() {
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        let notifier: Notifier = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut feed = FlightFeed::spawn(
            ScriptedSource::new(Vec::new()),
            Duration::from_secs(15),
            Some(notifier),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;

        let events = feed.drain();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.seq() == 1));
        assert_eq!(notified.load(Ordering::SeqCst), 2);
        assert!(feed.drain().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_refreshing() {
        let mut feed = FlightFeed::spawn(
            ScriptedSource::new(Vec::new()),
            Duration::from_secs(15),
            None,
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        feed.shutdown();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(feed.drain().len(), 2);
        assert!(!feed.refresh_now());
    }
}
