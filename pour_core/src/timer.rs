//! Explicit "has this period passed since the last check" timer.

use std::time::{Duration, Instant};

/// Owned by whichever loop does the periodic work; the caller supplies `now`
/// so the timer works with any `Clock`.
#[derive(Debug, Clone, Copy)]
pub struct PollTimer {
    last: Instant,
}

impl PollTimer {
    pub fn new(now: Instant) -> Self {
        Self { last: now }
    }

    /// True at most once per `period`; restarts the period when it fires.
    pub fn has_elapsed(&mut self, now: Instant, period: Duration) -> bool {
        if now.saturating_duration_since(self.last) >= period {
            self.last = now;
            true
        } else {
            false
        }
    }
}
