//! Time source abstraction for deadline accounting.
//!
//! # Responsibility
//! - Define the ledger-wide timestamp representation.
//! - Provide injectable clocks for production and deterministic tests.
//!
//! # Invariants
//! - Timestamps are nanosecond counts since the Unix epoch.
//! - `SystemClock::now` is total: it never panics, even on a host clock
//!   set before the epoch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch.
pub type Timestamp = u64;

/// Nanoseconds in one whole day.
pub const NANOS_PER_DAY: u64 = 86_400 * 1_000_000_000;

/// Computes the absolute deadline `days` whole days after `now`.
///
/// Returns `None` when the result does not fit the timestamp range.
pub fn deadline_after_days(now: Timestamp, days: u32) -> Option<Timestamp> {
    u64::from(days)
        .checked_mul(NANOS_PER_DAY)
        .and_then(|span| now.checked_add(span))
}

/// Injectable time source.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX),
            Err(_) => 0,
        }
    }
}

/// Manually driven clock for deterministic deadline tests.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// while the repository owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn starting_at(now: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now)),
        }
    }

    /// Moves the clock forward by `delta` nanoseconds.
    pub fn advance(&self, delta: u64) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute instant.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
