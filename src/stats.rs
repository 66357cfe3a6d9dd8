//! Usage accounting: operation counters and session durations.
//!
//! Counters are atomics and never reset. Each open session gets its own
//! start timestamp keyed by [`SessionId`], so overlapping sessions each
//! contribute their own elapsed time to the lifetime total.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::clock::{Clock, SystemClock};

/// Opaque identifier of one open-to-release session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Raw id value
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session was never opened or was already released
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unknown session {0}")]
pub struct UnknownSession(pub SessionId);

/// Immutable copy of the statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub open_count: u64,
    pub write_count: u64,
    pub read_count: u64,
    /// Sum of elapsed time over all completed sessions
    pub total_open_duration: Duration,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Open count: {}", self.open_count)?;
        writeln!(f, "Write count: {}", self.write_count)?;
        writeln!(f, "Read count: {}", self.read_count)?;
        writeln!(f, "Open time: {} ms", self.total_open_duration.as_millis())
    }
}

/// Session timers and lifetime total, updated together
#[derive(Default)]
struct Timers {
    started: HashMap<SessionId, Instant>,
    total: Duration,
}

/// Operation counters plus per-session duration accumulator
pub struct StatsTracker {
    clock: Arc<dyn Clock>,
    open_count: AtomicU64,
    write_count: AtomicU64,
    read_count: AtomicU64,
    next_session: AtomicU64,
    timers: Mutex<Timers>,
}

impl StatsTracker {
    /// Create a tracker on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a tracker on a custom clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            open_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
            read_count: AtomicU64::new(0),
            next_session: AtomicU64::new(1),
            timers: Mutex::new(Timers::default()),
        }
    }

    pub fn record_open(&self) {
        self.open_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_success(&self) {
        self.read_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write_success(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Start a timer for a fresh session
    pub fn begin_session(&self) -> SessionId {
        let id = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        let now = self.clock.now();
        self.timers.lock().started.insert(id, now);
        id
    }

    /// Stop a session's timer and add its elapsed time to the total
    pub fn end_session(&self, id: SessionId) -> Result<Duration, UnknownSession> {
        let now = self.clock.now();
        let mut timers = self.timers.lock();
        let start = timers.started.remove(&id).ok_or(UnknownSession(id))?;
        let elapsed = now.saturating_duration_since(start);
        timers.total += elapsed;
        Ok(elapsed)
    }

    /// Number of sessions currently open
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.timers.lock().started.len()
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            open_count: self.open_count.load(Ordering::Relaxed),
            write_count: self.write_count.load(Ordering::Relaxed),
            read_count: self.read_count.load(Ordering::Relaxed),
            total_open_duration: self.timers.lock().total,
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn tracker_with_manual_clock() -> (StatsTracker, ManualClock) {
        let clock = ManualClock::new();
        (StatsTracker::with_clock(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_counters_start_at_zero() {
        let tracker = StatsTracker::new();
        assert_eq!(tracker.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_counters_are_independent() {
        let tracker = StatsTracker::new();
        tracker.record_open();
        tracker.record_write_success();
        tracker.record_write_success();
        tracker.record_read_success();

        let snap = tracker.snapshot();
        assert_eq!(snap.open_count, 1);
        assert_eq!(snap.write_count, 2);
        assert_eq!(snap.read_count, 1);
    }

    #[test]
    fn test_session_duration_accumulates() {
        let (tracker, clock) = tracker_with_manual_clock();

        let id = tracker.begin_session();
        clock.advance(Duration::from_millis(40));
        assert_eq!(tracker.end_session(id).unwrap(), Duration::from_millis(40));

        let id = tracker.begin_session();
        clock.advance(Duration::from_millis(2));
        tracker.end_session(id).unwrap();

        assert_eq!(tracker.snapshot().total_open_duration, Duration::from_millis(42));
    }

    /// Overlapping sessions must each measure from their own start
    #[test]
    fn test_overlapping_sessions_use_own_start() {
        let (tracker, clock) = tracker_with_manual_clock();

        let first = tracker.begin_session();
        clock.advance(Duration::from_millis(100));
        let second = tracker.begin_session();
        clock.advance(Duration::from_millis(10));

        assert_eq!(tracker.end_session(first).unwrap(), Duration::from_millis(110));
        clock.advance(Duration::from_millis(5));
        assert_eq!(tracker.end_session(second).unwrap(), Duration::from_millis(15));

        assert_eq!(tracker.snapshot().total_open_duration, Duration::from_millis(125));
    }

    #[test]
    fn test_end_unknown_session() {
        let (tracker, clock) = tracker_with_manual_clock();
        let id = tracker.begin_session();
        clock.advance(Duration::from_millis(7));
        tracker.end_session(id).unwrap();

        assert_eq!(tracker.end_session(id), Err(UnknownSession(id)));
        assert_eq!(tracker.snapshot().total_open_duration, Duration::from_millis(7));
    }

    #[test]
    fn test_session_ids_are_unique() {
        let tracker = StatsTracker::new();
        let a = tracker.begin_session();
        let b = tracker.begin_session();
        assert_ne!(a, b);
        assert_eq!(tracker.active_sessions(), 2);
    }

    #[test]
    fn test_snapshot_format() {
        let snap = StatsSnapshot {
            open_count: 3,
            write_count: 2,
            read_count: 1,
            total_open_duration: Duration::from_micros(1_500_900),
        };
        assert_eq!(
            snap.to_string(),
            "Open count: 3\nWrite count: 2\nRead count: 1\nOpen time: 1500 ms\n"
        );
    }
}
