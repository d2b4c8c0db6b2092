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

//! Fixed-interval refresh scheduling.
//!
//! The scheduler fires its action once immediately and then on every
//! interval tick until stopped. The action lives in a shared slot separate
//! from the timer task, so replacing it takes effect on the next tick
//! without restarting the timer.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, info};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default cadence between refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15);

/// Shortest interval the scheduler will run at.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Zero-argument action run on each tick.
pub type Action = Arc<dyn Fn() + Send + Sync>;

type ActionSlot = Arc<RwLock<Option<Action>>>;

/// Handle to a running refresh timer.
///
/// Must be created from within a tokio runtime. Actions run on the timer
/// task while the slot is read-locked, so an action must not call
/// [`set_action`](Self::set_action) or [`stop`](Self::stop) itself.
pub struct RefreshScheduler {
    slot: ActionSlot,
    cancel_token: CancellationToken,
    interval: Duration,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("interval", &self.interval)
            .field("stopped", &self.cancel_token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl RefreshScheduler {
    /// Start the timer. `action` fires immediately, then every `interval`.
    #[must_use]
    pub fn spawn<F>(interval: Duration, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let interval = interval.max(MIN_INTERVAL);
        let action: Action = Arc::new(action);
        let slot: ActionSlot = Arc::new(RwLock::new(Some(action)));
        let cancel_token = CancellationToken::new();

        let task_slot = Arc::clone(&slot);
        let task_cancel = cancel_token.clone();
        tokio::spawn(async move {
            tick_loop(task_slot, task_cancel, interval).await;
        });

        Self {
            slot,
            cancel_token,
            interval,
        }
    }

    /// Replace the action. The next tick runs the new one.
    ///
    /// Ignored once the scheduler is stopped.
    pub fn set_action<F>(&self, action: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let action: Action = Arc::new(action);
        if let Ok(mut slot) = self.slot.write() {
            if slot.is_some() {
                *slot = Some(action);
            }
        }
    }

    /// Run the current action right away, outside the regular cadence.
    ///
    /// Returns `false` if the scheduler has been stopped.
    pub fn trigger(&self) -> bool {
        invoke(&self.slot)
    }

    /// Stop the timer. No action fires after this returns.
    pub fn stop(&self) {
        self.cancel_token.cancel();
        if let Ok(mut slot) = self.slot.write() {
            *slot = None;
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run the action in `slot`, if any. Returns whether it ran.
fn invoke(slot: &RwLock<Option<Action>>) -> bool {
    let Ok(guard) = slot.read() else {
        return false;
    };

    match guard.as_ref() {
        Some(action) => {
            action();
            true
        }
        None => false,
    }
}

async fn tick_loop(slot: ActionSlot, cancel_token: CancellationToken, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            () = cancel_token.cancelled() => {
                info!("Refresh scheduler stopped");
                return;
            }

            _ = ticker.tick() => {
                debug!("Refresh tick");
                if !invoke(&slot) {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_immediately_then_every_interval() {
        let (count, action) = counter();
        let _scheduler = RefreshScheduler::spawn(Duration::from_secs(15), action);

        advance(10).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        advance(15_000).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        advance(30_000).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uses_latest_action() {
        let (first, first_action) = counter();
        let (second, second_action) = counter();
        let scheduler = RefreshScheduler::spawn(Duration::from_secs(15), first_action);

        advance(10).await;
        scheduler.set_action(second_action);
        advance(15_000).await;

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_fires_after_stop() {
        let (count, action) = counter();
        let scheduler = RefreshScheduler::spawn(Duration::from_secs(15), action);

        advance(10).await;
        scheduler.stop();
        assert!(scheduler.is_stopped());

        advance(60_000).await;
        assert!(!scheduler.trigger());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_runs_out_of_band() {
        let (count, action) = counter();
        let scheduler = RefreshScheduler::spawn(Duration::from_secs(15), action);

        advance(10).await;
        assert!(scheduler.trigger());
        assert_eq!(count.load(Ordering::SeqCst), 2);

        // Regular cadence is unaffected by the manual trigger
        advance(15_000).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_timer() {
        let (count, action) = counter();
        let scheduler = RefreshScheduler::spawn(Duration::from_secs(1), action);

        advance(10).await;
        drop(scheduler);
        advance(5_000).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
