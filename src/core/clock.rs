//! Time sources for update bookkeeping.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Smallest delta time, in seconds, an update ever reports.
///
/// Applied when the clock reports zero or negative elapsed time.
pub const MIN_DELTA_TIME: f64 = 0.000_001;

/// Source of the current time for a state machine.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by [`Utc::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock.
///
/// Clones share the same time, so a test or a fixed-step simulation can keep
/// one handle and give another to the machine.
///
/// # Example
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use tickstate::core::{Clock, ManualClock};
///
/// let clock = ManualClock::new(Utc::now());
/// let start = clock.now();
///
/// clock.advance(Duration::milliseconds(16));
/// assert_eq!(clock.now() - start, Duration::milliseconds(16));
/// ```
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move the clock by `by`. Negative durations move it backwards.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.now.set(at);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Signed seconds from `earlier` to `later`.
pub(crate) fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let elapsed = later.signed_duration_since(earlier);
    match elapsed.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => elapsed.num_milliseconds() as f64 / 1e3,
    }
}
