//! Cooperative cancellation flag shared between an engine and whatever owns
//! it (a [`crate::congruence::Congruence`] racing several strategies, or a
//! caller enforcing a wall-clock timeout).
//!
//! `spec.md` §5: "Strategies poll a shared `killed` flag ... Suspension is
//! cooperative; no strategy is ever forcibly interrupted." A strategy that
//! observes its flag set must leave its data in a state whose own
//! invariants still hold, even though the computation is incomplete.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared, cheaply-cloned flag that a long-running computation polls
/// between suspension points (per §5: between KB stack drains/overlap
/// sweeps, between TC coset sweeps, between FP length buckets, between P
/// pair dequeues).
#[derive(Debug, Clone, Default)]
pub struct KillSwitch(Arc<AtomicBool>);

impl KillSwitch {
    /// Constructs a fresh, unset kill switch.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }
    /// Returns whether the switch has been flipped.
    pub fn is_killed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
    /// Flips the switch. Idempotent.
    pub fn kill(&self) {
        self.0.store(true, Ordering::Release);
    }
    /// Resets the switch to unset, for reuse on a resumed computation.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}
