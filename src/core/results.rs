//! Throttled, append-only collection of search results.
//!
//! The worker pushes every match as it is found; the consumer only sees them
//! in batches, at most once per throttle interval, so a match-dense tree does
//! not force one view update per match.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Minimum time between two throttled commits.
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Default)]
struct BufferState {
    committed: Vec<PathBuf>,
    pending: Vec<PathBuf>,
    timer_started: Option<Instant>,
    version: u64,
}

impl BufferState {
    fn commit_pending(&mut self) -> usize {
        let count = self.pending.len();
        if count > 0 {
            self.committed.append(&mut self.pending);
            self.version += 1;
        }
        count
    }
}

/// Results shared between a search worker (producer) and its consumer.
///
/// `committed` only ever grows at the end, so an index handed out once stays
/// valid until [`ResultBuffer::clear`].
#[derive(Debug)]
pub struct ResultBuffer {
    throttle: Duration,
    state: Mutex<BufferState>,
}

impl Default for ResultBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_INTERVAL)
    }
}

impl ResultBuffer {
    pub fn new(throttle: Duration) -> Self {
        Self {
            throttle,
            state: Mutex::new(BufferState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        // The state is valid after every statement, so a poisoned lock is
        // still safe to keep using.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn throttle_interval(&self) -> Duration {
        self.throttle
    }

    /// Buffers a result, committing the whole pending batch once the throttle
    /// interval has elapsed since the batch was started.
    pub fn push(&self, path: PathBuf) {
        let mut state = self.lock();
        state.pending.push(path);

        let now = Instant::now();
        let started = *state.timer_started.get_or_insert(now);
        if now.duration_since(started) >= self.throttle {
            let count = state.commit_pending();
            state.timer_started = Some(now);
            tracing::debug!("Committed {} buffered results", count);
        }
    }

    /// Commits everything still pending, regardless of the throttle.
    ///
    /// Returns the number of results that were moved.
    pub fn flush_pending(&self) -> usize {
        let mut state = self.lock();
        state.timer_started = None;
        let count = state.commit_pending();
        if count > 0 {
            tracing::debug!("Flushed {} pending results", count);
        }
        count
    }

    /// Drops all results, committed and pending, and resets the throttle timer.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.committed.clear();
        state.pending.clear();
        state.timer_started = None;
        state.version += 1;
    }

    /// Number of committed results.
    pub fn len(&self) -> usize {
        self.lock().committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().committed.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<PathBuf> {
        self.lock().committed.get(index).cloned()
    }

    /// A copy of all committed results, in push order.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.lock().committed.clone()
    }

    /// Committed results from index `start` onwards, for incremental rendering.
    pub fn committed_since(&self, start: usize) -> Vec<PathBuf> {
        let state = self.lock();
        state
            .committed
            .get(start..)
            .map(<[PathBuf]>::to_vec)
            .unwrap_or_default()
    }

    /// Number of results buffered but not yet visible.
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Increases every time the committed collection changes.
    pub fn version(&self) -> u64 {
        self.lock().version
    }
}
