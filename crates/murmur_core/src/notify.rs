//! Notification scheduling collaborator.
//!
//! # Responsibility
//! - Define the interface the executor uses to schedule reminder
//!   notifications before persisting the reminder.
//!
//! # Invariants
//! - Scheduling never fails loudly; an unavailable scheduler returns `None`
//!   and the reminder is persisted without a notification id.

use chrono::{DateTime, Local};

/// Schedules a user-visible notification for a future instant.
pub trait NotificationScheduler {
    /// Returns the scheduler-assigned notification id, or `None` when no
    /// notification could be scheduled.
    fn schedule(&self, title: &str, body: &str, when: DateTime<Local>) -> Option<String>;
}

/// Scheduler that schedules nothing; used by headless callers and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScheduler;

impl NotificationScheduler for NullScheduler {
    fn schedule(&self, _title: &str, _body: &str, _when: DateTime<Local>) -> Option<String> {
        None
    }
}
