//! Time source abstraction.
//!
//! Store timestamps and the save debounce both read time through [`Clock`],
//! so tests can drive virtual time with [`ManualClock`].

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Starts at the given Unix epoch milliseconds (clamped to the epoch when
    /// out of range).
    pub fn at_epoch_ms(epoch_ms: i64) -> Self {
        let start = Utc
            .timestamp_millis_opt(epoch_ms)
            .single()
            .unwrap_or_default();
        Self::new(start)
    }

    pub fn advance_ms(&self, millis: i64) {
        self.now.set(self.now.get() + Duration::milliseconds(millis));
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.now.set(instant);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};

    #[test]
    fn clones_share_the_same_instant() {
        let clock = ManualClock::at_epoch_ms(1_000);
        let handle = clock.clone();
        handle.advance_ms(450);
        assert_eq!(clock.now().timestamp_millis(), 1_450);
    }
}
