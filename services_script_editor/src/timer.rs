//! Clocks and the restartable periodic task
//!
//! Time only moves when the session polls. Under test the clock is a
//! [`SimClock`] that advances when told to, so timer behaviour is fully
//! deterministic.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin
    fn now_ms(&self) -> u64;
}

/// Simulated clock with controllable time progression
///
/// Clones share the same time, so a test can keep a handle while the
/// session owns another.
///
/// ```
/// use services_script_editor::timer::{Clock, SimClock};
///
/// let clock = SimClock::new();
/// let handle = clock.clone();
/// handle.advance(1500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock by `delta_ms`
    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Wall clock based on [`Instant`], starting at 0 on construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Restartable recurring task
///
/// At most one schedule is live: `start` replaces any previous one.
/// `poll` fires at most once per call; ticks missed while nobody polled
/// collapse into that one firing.
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    period_ms: u64,
    next_due: Option<u64>,
    fired: u64,
}

impl PeriodicTask {
    /// Creates a stopped task. A zero period is treated as 1 ms.
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_due: None,
            fired: 0,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// (Re)start the schedule; the first tick is one period after `now_ms`
    pub fn start(&mut self, now_ms: u64) {
        self.next_due = Some(now_ms.saturating_add(self.period_ms));
    }

    /// Cancel the schedule
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Time of the next tick, if running
    pub fn next_due(&self) -> Option<u64> {
        self.next_due
    }

    /// Number of ticks fired since construction
    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    /// Returns true if a tick is due at `now_ms`, and schedules the next
    /// one at the first period boundary after `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.next_due {
            Some(due) if now_ms >= due => {
                let missed = (now_ms - due) / self.period_ms;
                let next = due.saturating_add((missed + 1).saturating_mul(self.period_ms));
                self.next_due = Some(next);
                self.fired += 1;
                true
            }
            _ => false,
        }
    }
}
