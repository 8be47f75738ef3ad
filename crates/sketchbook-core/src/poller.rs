//! Fixed-interval poller
//!
//! Gates a periodic operation on elapsed time since its last run. There is no
//! catch-up: a loop that stalls across several intervals still fires once.

/// Tracks when a periodic operation last ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalPoller {
    interval_ms: u64,
    last_run_ms: Option<u64>,
}

impl IntervalPoller {
    /// Poller that fires on its first [`poll`](Self::poll).
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_run_ms: None,
        }
    }

    /// Poller that treats `last_run_ms` as the previous run, so the first fire
    /// happens once `interval_ms` has elapsed since then.
    pub const fn starting_at(interval_ms: u64, last_run_ms: u64) -> Self {
        Self {
            interval_ms,
            last_run_ms: Some(last_run_ms),
        }
    }

    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns `true` and records `now_ms` if the interval has elapsed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let due = match self.last_run_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.interval_ms,
        };

        if due {
            self.last_run_ms = Some(now_ms);
        }
        due
    }

    /// Time left until the next fire, zero if already due.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.last_run_ms {
            None => 0,
            Some(last) => self
                .interval_ms
                .saturating_sub(now_ms.wrapping_sub(last)),
        }
    }
}
