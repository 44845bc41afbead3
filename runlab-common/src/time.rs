//! Timestamp utilities

use chrono::{DateTime, Utc};
use std::time::Instant;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Nanoseconds since the Unix epoch
///
/// Saturates at `i64::MAX` (year 2262) instead of failing.
pub fn unix_nanos(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Wall-clock anchor paired with a monotonic clock
///
/// `start_ns` is read from the wall clock once; later readings add monotonic
/// elapsed time to it, so they never go below `start_ns` even when the system
/// clock is stepped backwards mid-request.
#[derive(Debug, Clone, Copy)]
pub struct AnchoredClock {
    start_ns: i64,
    started: Instant,
}

impl AnchoredClock {
    /// Anchor on the current time
    pub fn start() -> Self {
        Self {
            start_ns: unix_nanos(now()),
            started: Instant::now(),
        }
    }

    /// Epoch nanoseconds at the anchor point
    pub fn start_ns(&self) -> i64 {
        self.start_ns
    }

    /// Epoch nanoseconds now, derived from the anchor
    pub fn now_ns(&self) -> i64 {
        let elapsed = i64::try_from(self.started.elapsed().as_nanos()).unwrap_or(i64::MAX);
        self.start_ns.saturating_add(elapsed)
    }
}
