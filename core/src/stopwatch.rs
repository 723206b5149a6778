//! Wall-clock elapsed-time helper backing the `max_time` completion cap.
//!
//! Grounded on `original_source/include/libsemigroups/timer.hpp`: the source
//! keeps a small `Timer` type wrapping `std::chrono` that completion loops
//! poll alongside the cancellation flag. `std::time::Instant` gives the same
//! thing without needing a wrapper for correctness, but we keep the wrapper
//! so call sites read the same way the source's `_timer.elapsed() > _limit`
//! checks do.

use std::time::{Duration, Instant};

/// Tracks elapsed time since construction and compares it to an optional
/// limit.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
    limit: Option<Duration>,
}
impl Stopwatch {
    /// Starts a stopwatch with no limit.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            limit: None,
        }
    }
    /// Starts a stopwatch that expires after `limit`.
    pub fn with_limit(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit: Some(limit),
        }
    }
    /// Returns the elapsed time since construction.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
    /// Returns whether the configured limit (if any) has elapsed.
    pub fn expired(&self) -> bool {
        self.limit.is_some_and(|limit| self.elapsed() >= limit)
    }
}
impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}
