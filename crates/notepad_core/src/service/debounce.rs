//! Trailing-edge debounce for persistence writes.
//!
//! # Responsibility
//! - Model the pending save as a cancelable, fire-once delayed task.
//! - Report the save state shown to the user.
//!
//! # Invariants
//! - At most one write is pending; scheduling again replaces its deadline.
//! - A pending write fires at most once, on the first poll at or after its
//!   deadline.

use chrono::{DateTime, Duration, Utc};

/// User-visible persistence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// A debounced write is waiting for its quiet interval.
    Pending,
    /// Last write succeeded and nothing is pending.
    Saved,
    /// Last write failed; in-memory state is ahead of storage.
    Failed,
}

impl SaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Saved => "saved",
            Self::Failed => "failed",
        }
    }
}

/// Single delayed task with reschedule-on-trigger semantics.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    due_at: Option<DateTime<Utc>>,
}

impl Debouncer {
    pub fn new(quiet: std::time::Duration) -> Self {
        let millis = i64::try_from(quiet.as_millis()).unwrap_or(i64::MAX);
        Self {
            quiet: Duration::try_milliseconds(millis).unwrap_or(Duration::MAX),
            due_at: None,
        }
    }

    /// Schedules (or reschedules) the task one quiet interval after `now`.
    pub fn schedule(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let due_at = now.checked_add_signed(self.quiet).unwrap_or(now);
        self.due_at = Some(due_at);
        due_at
    }

    /// Drops the pending task. Returns whether one existed.
    pub fn cancel(&mut self) -> bool {
        self.due_at.take().is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    /// Consumes the task if its deadline has passed.
    pub fn fire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.due_at {
            Some(due_at) if now >= due_at => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn reschedule_moves_deadline_and_fires_once() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut debouncer = Debouncer::new(std::time::Duration::from_millis(450));

        debouncer.schedule(start);
        debouncer.schedule(start + Duration::milliseconds(300));
        assert!(!debouncer.fire_if_due(start + Duration::milliseconds(450)));
        assert!(debouncer.fire_if_due(start + Duration::milliseconds(750)));
        assert!(!debouncer.fire_if_due(start + Duration::milliseconds(2_000)));
    }

    #[test]
    fn cancel_clears_pending_task() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut debouncer = Debouncer::new(std::time::Duration::from_millis(10));
        debouncer.schedule(start);
        assert!(debouncer.cancel());
        assert!(!debouncer.is_pending());
        assert!(!debouncer.cancel());
    }
}
