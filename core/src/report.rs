//! Progress reporting.
//!
//! `spec.md` §1 puts the source's process-wide reporter and thread-id
//! registry (`report.hpp`) out of scope, and §9 asks for "an injected
//! reporter object that accepts tagged events" in its place. We go one step
//! further and use `tracing`, the way the teacher crates do: each engine
//! emits a `tracing::debug!`/`tracing::trace!` event tagged with its own
//! target (`smgrp::froidure_pin`, `smgrp::todd_coxeter`,
//! `smgrp::rewriting`, `smgrp::congruence`) instead of routing through a
//! bespoke reporter type. `Config::report`/`Config::report_interval`
//! (§6 `set_report`/`set_report_interval`) gate how often the expensive
//! "current size/rules/classes" events are computed and logged; the events
//! themselves are always available to any `tracing` subscriber the caller
//! installs.

use std::time::{Duration, Instant};

/// Cadence gate for periodic progress events, configured by
/// `Config::report`/`Config::report_interval`.
#[derive(Debug, Clone)]
pub struct ReportThrottle {
    enabled: bool,
    interval: Duration,
    last: Option<Instant>,
}
impl ReportThrottle {
    /// Constructs a throttle with the given enablement and interval.
    pub fn new(enabled: bool, interval: Duration) -> Self {
        Self {
            enabled,
            interval,
            last: None,
        }
    }
}
impl Default for ReportThrottle {
    /// A disabled throttle, matching `Config::default()`'s `report`/
    /// `report_interval`.
    fn default() -> Self {
        Self::new(false, Duration::from_millis(1000))
    }
}
impl ReportThrottle {
    /// Returns whether a progress event should be emitted now, and if so,
    /// resets the internal clock.
    pub fn should_report(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Logs a `tracing::debug!` progress line if `throttle` says it's time.
///
/// `target` should be one of the engine targets listed above; `f` is called
/// only when a report will actually be emitted, so it may do work (like
/// counting rules) that would be wasteful every iteration.
pub fn maybe_report(
    throttle: &mut ReportThrottle,
    target: &'static str,
    f: impl FnOnce() -> String,
) {
    if throttle.should_report() {
        tracing::debug!(target: target, "{}", f());
    }
}
