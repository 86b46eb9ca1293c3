//! Periodic polling of live stats for the tracked players.
//!
//! Each poll fetches one batch for the whole gameweek, diffs every tracked
//! player against the snapshot store and hands the resulting events to an
//! [`EventSink`]. Polls never overlap: a tick that finds a fetch still in
//! flight is skipped, not queued. The only suspension point in a poll is
//! the fetch itself, and it is bounded by a timeout so a hung request can't
//! hold the single-flight flag. The diff, commit and delivery all run under
//! the store lock without awaiting.
//!
//! [`stop`](PollScheduler::stop) and [`track`](PollScheduler::track) change
//! the generation under the same lock, so once either returns no poll from
//! the previous generation can commit or deliver.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::{
    cli::types::{time::now_millis, GameweekId},
    engine::{
        detector::EventDetector,
        events::{DomainEvent, TrackedPlayer},
        snapshot::StatsSnapshotStore,
    },
    fpl::http::LiveStatsSource,
};


/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Fetch timeout until [`PollScheduler::start`] ties it to the poll interval.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Receives the events produced by one poll, in detection order.
pub trait EventSink: Send {
    fn deliver(&mut self, events: Vec<DomainEvent>);
}

/// What happened to one poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Batch diffed and committed.
    Completed { events: usize },
    /// Another poll was still in flight.
    Skipped,
    /// Fetch failed or timed out; nothing was mutated.
    Failed,
    /// Scheduler was stopped or restarted while the fetch was in flight.
    Discarded,
    /// Scheduler is not running.
    Stopped,
}

#[derive(Debug, Default)]
struct Tracking {
    players: Vec<TrackedPlayer>,
    gameweek: Option<GameweekId>,
}

struct Shared<S, K> {
    source: S,
    detector: EventDetector,
    store: Mutex<StatsSnapshotStore>,
    sink: Mutex<K>,
    tracking: Mutex<Tracking>,
    in_flight: AtomicBool,
    alive: AtomicBool,
    generation: AtomicU64,
    fetch_timeout_ms: AtomicU64,
}

/// Holds the single-flight flag for the duration of one poll.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Nothing panics while holding these locks, but don't let a poisoned
    // lock take the scheduler down with it.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<S: LiveStatsSource, K: EventSink> Shared<S, K> {
    async fn poll_once(&self, generation: u64) -> PollOutcome {
        if !self.is_current(generation) {
            return PollOutcome::Stopped;
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("previous poll still in flight, skipping tick");
            return PollOutcome::Skipped;
        };

        let (players, gameweek) = {
            let tracking = lock(&self.tracking);
            match tracking.gameweek {
                Some(gw) if !tracking.players.is_empty() => (tracking.players.clone(), gw),
                _ => return PollOutcome::Stopped,
            }
        };

        let timeout = self.fetch_timeout();
        let live = match tokio::time::timeout(timeout, self.source.fetch_live(gameweek)).await {
            Ok(Ok(live)) => live,
            Ok(Err(e)) => {
                warn!(gameweek = %gameweek, error = %e, "live stats fetch failed, retrying next tick");
                return PollOutcome::Failed;
            }
            Err(_) => {
                warn!(
                    gameweek = %gameweek,
                    timeout_ms = timeout.as_millis() as u64,
                    "live stats fetch timed out, retrying next tick"
                );
                return PollOutcome::Failed;
            }
        };

        let observed_at = now_millis();
        // Held through delivery; stop() and track() need it to change generation.
        let mut store = lock(&self.store);
        if !self.is_current(generation) {
            debug!(gameweek = %gameweek, "scheduler stopped during fetch, discarding results");
            return PollOutcome::Discarded;
        }
        if store.gameweek() != Some(gameweek) {
            debug!(gameweek = %gameweek, "gameweek changed during fetch, discarding results");
            return PollOutcome::Discarded;
        }

        let mut events = Vec::new();
        for player in &players {
            let Some(entry) = live.stats_for(player.id) else {
                debug!(player_id = %player.id, "tracked player missing from live data");
                continue;
            };
            let finished = live.is_match_finished(player.id);
            events.extend(store.observe(&self.detector, player, &entry.stats, finished, observed_at));
        }

        let count = events.len();
        if count > 0 {
            info!(gameweek = %gameweek, events = count, "live events detected");
            lock(&self.sink).deliver(events);
        }
        drop(store);
        PollOutcome::Completed { events: count }
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms.load(Ordering::Acquire))
    }

    fn is_current(&self, generation: u64) -> bool {
        self.alive.load(Ordering::Acquire) && self.generation.load(Ordering::Acquire) == generation
    }
}

/// Drives periodic live-stat polls for a set of tracked players.
pub struct PollScheduler<S, K> {
    shared: Arc<Shared<S, K>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl<S, K> PollScheduler<S, K>
where
    S: LiveStatsSource + 'static,
    K: EventSink + 'static,
{
    pub fn new(source: S, sink: K) -> Self {
        Self::with_detector(source, sink, EventDetector::default())
    }

    pub fn with_detector(source: S, sink: K, detector: EventDetector) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                detector,
                store: Mutex::new(StatsSnapshotStore::new()),
                sink: Mutex::new(sink),
                tracking: Mutex::new(Tracking::default()),
                in_flight: AtomicBool::new(false),
                alive: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                fetch_timeout_ms: AtomicU64::new(DEFAULT_FETCH_TIMEOUT.as_millis() as u64),
            }),
            ticker: Mutex::new(None),
        }
    }

    /// Start (or restart) polling every `interval`; the first poll runs immediately.
    ///
    /// A fetch that takes longer than `interval` is abandoned. An empty
    /// player list is the same as [`stop`](Self::stop). Must be called from
    /// within a tokio runtime.
    pub fn start(&self, players: Vec<TrackedPlayer>, gameweek: GameweekId, interval: Duration) {
        let period = interval.max(Duration::from_millis(1));
        self.shared
            .fetch_timeout_ms
            .store(period.as_millis() as u64, Ordering::Release);
        let Some(generation) = self.track(players, gameweek) else {
            return;
        };

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !shared.is_current(generation) {
                    break;
                }
                // Spawned so a slow fetch never holds up the timer; overlapping
                // ticks fall through the single-flight guard.
                let poll = Arc::clone(&shared);
                tokio::spawn(async move {
                    poll.poll_once(generation).await;
                });
            }
        });
        *lock(&self.ticker) = Some(handle);

        info!(gameweek = %gameweek, interval_ms = period.as_millis() as u64, "poll scheduler started");
    }

    /// Set the tracked players and gameweek without starting the timer.
    ///
    /// Polls then only happen through [`force_check`](Self::force_check).
    /// Switching to a different gameweek clears the snapshot store first, so
    /// the first poll of the new gameweek only sets baselines. Returns the new
    /// generation, or `None` when `players` is empty and the scheduler stopped.
    pub fn track(&self, players: Vec<TrackedPlayer>, gameweek: GameweekId) -> Option<u64> {
        if players.is_empty() {
            self.stop();
            return None;
        }

        self.cancel_ticker();
        let mut store = lock(&self.shared.store);
        store.reset_for(gameweek);
        {
            let mut tracking = lock(&self.shared.tracking);
            tracking.players = players;
            tracking.gameweek = Some(gameweek);
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.shared.alive.store(true, Ordering::Release);
        Some(generation)
    }

    /// Cancel the timer. In-flight fetches finish but their results are discarded.
    ///
    /// Waits for a poll that is already committing, so nothing reaches the
    /// store or the sink after this returns. Must not be called from inside
    /// [`with_store`](Self::with_store) or [`with_sink`](Self::with_sink).
    pub fn stop(&self) {
        let was_alive = {
            let _store = lock(&self.shared.store);
            self.shared.generation.fetch_add(1, Ordering::AcqRel);
            self.shared.alive.swap(false, Ordering::AcqRel)
        };
        self.cancel_ticker();
        if was_alive {
            info!("poll scheduler stopped");
        }
    }

    /// Poll right now instead of waiting for the next tick.
    pub async fn force_check(&self) -> PollOutcome {
        let generation = self.shared.generation.load(Ordering::Acquire);
        self.shared.poll_once(generation).await
    }

    pub fn is_running(&self) -> bool {
        self.shared.alive.load(Ordering::Acquire)
    }

    pub fn gameweek(&self) -> Option<GameweekId> {
        lock(&self.shared.tracking).gameweek
    }

    /// Read access to the snapshot store.
    pub fn with_store<R>(&self, f: impl FnOnce(&StatsSnapshotStore) -> R) -> R {
        f(&lock(&self.shared.store))
    }

    /// Read or write access to the event sink.
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut K) -> R) -> R {
        f(&mut lock(&self.shared.sink))
    }

    fn cancel_ticker(&self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }
}

impl<S, K> Drop for PollScheduler<S, K> {
    fn drop(&mut self) {
        {
            let _store = lock(&self.shared.store);
            self.shared.alive.store(false, Ordering::Release);
        }
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }
}
