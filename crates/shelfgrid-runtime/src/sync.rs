#![forbid(unsafe_code)]

//! Debounced layout persistence.
//!
//! Every commit schedules a write of the full layout; a later commit inside
//! the quiet period replaces the pending write and restarts the timer. When
//! the timer expires the most recent layout is handed to the
//! [`PersistenceSink`] exactly once. Failures are logged and dropped; the
//! local committed layout stays authoritative.
//!
//! Two drivers share the same semantics:
//!
//! - [`Debounce`] is a pure deadline slot polled with an explicit clock, for
//!   single-threaded hosts and deterministic tests.
//! - [`SyncDebouncer`] owns one background thread that sleeps on a condvar
//!   until the deadline, writes outside the lock, and is joined on drop.

use std::fmt;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use shelfgrid_layout::PlacementRecord;
use web_time::{Duration, Instant};

/// A failed write reported by a [`PersistenceSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistError {
    message: String,
}

impl PersistError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layout persistence failed: {}", self.message)
    }
}

impl std::error::Error for PersistError {}

/// Destination for committed layouts.
///
/// Called from the debouncer's worker thread with the full sorted record
/// list. Implementations should not retry; the next commit brings a fresh
/// layout anyway.
pub trait PersistenceSink: Send + Sync + 'static {
    fn persist(&self, records: &[PlacementRecord]) -> Result<(), PersistError>;
}

impl<F> PersistenceSink for F
where
    F: Fn(&[PlacementRecord]) -> Result<(), PersistError> + Send + Sync + 'static,
{
    fn persist(&self, records: &[PlacementRecord]) -> Result<(), PersistError> {
        self(records)
    }
}

/// In-memory sink that keeps every write. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    writes: Arc<Mutex<Vec<Vec<PlacementRecord>>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write so far, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<Vec<PlacementRecord>> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The most recent write.
    #[must_use]
    pub fn last(&self) -> Option<Vec<PlacementRecord>> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl PersistenceSink for MemorySink {
    fn persist(&self, records: &[PlacementRecord]) -> Result<(), PersistError> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(records.to_vec());
        Ok(())
    }
}

/// Single pending value bound to a deadline.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending value and restart the timer at `now`.
    ///
    /// Returns the superseded value.
    pub fn schedule(&mut self, value: T, now: Instant) -> Option<T> {
        self.pending
            .replace((value, now + self.delay))
            .map(|(old, _)| old)
    }

    /// Drop the pending value without firing.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Take the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.cancel(),
            _ => None,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }
}

/// Counters kept by [`SyncDebouncer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub scheduled: u64,
    /// Pending writes replaced by a newer commit.
    pub superseded: u64,
    /// Pending writes dropped by `cancel` or shutdown.
    pub cancelled: u64,
    pub writes: u64,
    pub failures: u64,
}

struct WorkerState {
    debounce: Debounce<Vec<PlacementRecord>>,
    in_flight: bool,
    shutdown: bool,
    stats: SyncStats,
}

struct Shared {
    state: Mutex<WorkerState>,
    wake: Condvar,
    idle: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, WorkerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Worker-thread debouncer in front of a [`PersistenceSink`].
pub struct SyncDebouncer {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl fmt::Debug for SyncDebouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("SyncDebouncer")
            .field("delay", &state.debounce.delay())
            .field("pending", &state.debounce.is_pending())
            .field("stats", &state.stats)
            .finish()
    }
}

impl SyncDebouncer {
    /// Start the worker thread.
    ///
    /// The worker logs through the dispatcher that is current on the calling
    /// thread.
    pub fn spawn<S: PersistenceSink>(sink: S, delay: Duration) -> io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(WorkerState {
                debounce: Debounce::new(delay),
                in_flight: false,
                shutdown: false,
                stats: SyncStats::default(),
            }),
            wake: Condvar::new(),
            idle: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let dispatch = tracing::dispatcher::get_default(|current| current.clone());
        let worker = thread::Builder::new()
            .name("shelfgrid-sync".into())
            .spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || run_worker(&worker_shared, &sink));
            })?;
        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Replace any pending write with `records` and restart the timer.
    pub fn schedule(&self, records: Vec<PlacementRecord>) {
        let mut state = self.shared.lock();
        let items = records.len();
        state.stats.scheduled += 1;
        if state.debounce.schedule(records, Instant::now()).is_some() {
            state.stats.superseded += 1;
        }
        tracing::trace!(target: "shelfgrid.sync", items, "layout write scheduled");
        drop(state);
        self.shared.wake.notify_all();
    }

    /// Drop the pending write, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut state = self.shared.lock();
        let cancelled = state.debounce.cancel().is_some();
        if cancelled {
            state.stats.cancelled += 1;
            tracing::debug!(target: "shelfgrid.sync", "pending layout write cancelled");
        }
        drop(state);
        self.shared.wake.notify_all();
        self.shared.idle.notify_all();
        cancelled
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.lock().debounce.is_pending()
    }

    /// Records that will be written when the timer fires.
    #[must_use]
    pub fn pending_records(&self) -> Option<Vec<PlacementRecord>> {
        self.shared.lock().debounce.pending().cloned()
    }

    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.shared.lock().stats
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.shared.lock().debounce.delay()
    }

    /// Block until nothing is pending or being written, or `timeout` passes.
    ///
    /// Returns `true` if the debouncer went idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        let mut state = self.shared.lock();
        loop {
            if !state.debounce.is_pending() && !state.in_flight {
                return true;
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return false;
            }
            let (next, _) = self
                .shared
                .idle
                .wait_timeout(state, timeout - elapsed)
                .unwrap_or_else(|e| e.into_inner());
            state = next;
        }
    }

    /// Cancel any pending write and join the worker. Idempotent.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        {
            let mut state = self.shared.lock();
            if state.debounce.cancel().is_some() {
                state.stats.cancelled += 1;
            }
            state.shutdown = true;
        }
        self.shared.wake.notify_all();
        if worker.join().is_err() {
            tracing::warn!(target: "shelfgrid.sync", "sync worker panicked");
        }
        self.shared.idle.notify_all();
    }
}

impl Drop for SyncDebouncer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<S: PersistenceSink>(shared: &Shared, sink: &S) {
    let mut state = shared.lock();
    loop {
        if state.shutdown {
            return;
        }
        let now = Instant::now();
        if let Some(records) = state.debounce.poll(now) {
            state.in_flight = true;
            drop(state);

            let outcome = {
                let _span =
                    tracing::debug_span!(target: "shelfgrid.sync", "sync.persist", items = records.len())
                        .entered();
                sink.persist(&records)
            };
            match &outcome {
                Ok(()) => {
                    tracing::debug!(target: "shelfgrid.sync", items = records.len(), "layout persisted");
                }
                Err(err) => {
                    tracing::warn!(
                        target: "shelfgrid.sync",
                        error = %err,
                        items = records.len(),
                        "layout persistence failed; keeping local layout"
                    );
                }
            }

            state = shared.lock();
            state.in_flight = false;
            match outcome {
                Ok(()) => state.stats.writes += 1,
                Err(_) => state.stats.failures += 1,
            }
            shared.idle.notify_all();
            continue;
        }

        if !state.debounce.is_pending() {
            shared.idle.notify_all();
        }
        state = match state.debounce.deadline() {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(now);
                shared
                    .wake
                    .wait_timeout(state, timeout)
                    .unwrap_or_else(|e| e.into_inner())
                    .0
            }
            None => shared.wake.wait(state).unwrap_or_else(|e| e.into_inner()),
        };
    }
}
