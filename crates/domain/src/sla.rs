// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SLA policy evaluation.
//!
//! Pure functions mapping a ticket priority to its due date and a
//! `(due_date, status)` pair to a breach decision. The current time is
//! always passed in by the caller.

use std::str::FromStr;

use time::{Duration, OffsetDateTime};

use crate::types::{Priority, TicketStatus};

/// Default lookahead for deadline reminders, in hours.
pub const DEFAULT_DEADLINE_WINDOW_HOURS: i64 = 24;

/// Longest accepted lookahead for deadline reminders: one leap year, in hours.
pub const MAX_DEADLINE_WINDOW_HOURS: i64 = 24 * 366;

/// Computes the due date for a ticket of the given priority.
#[must_use]
pub fn calculate_due_date(priority: Priority, created_at: OffsetDateTime) -> OffsetDateTime {
    created_at.saturating_add(Duration::hours(priority.sla_hours()))
}

/// Computes the due date from a raw priority string.
///
/// An unrecognized priority resolves to MEDIUM's window.
#[must_use]
pub fn calculate_due_date_for(priority: &str, created_at: OffsetDateTime) -> OffsetDateTime {
    let priority: Priority = Priority::from_str(priority).unwrap_or_default();
    calculate_due_date(priority, created_at)
}

/// Returns true if the ticket is past due while still active.
///
/// Terminal tickets are never breached, however overdue they are.
#[must_use]
pub fn is_breached(
    due_date: Option<OffsetDateTime>,
    status: TicketStatus,
    now: OffsetDateTime,
) -> bool {
    let Some(due_date) = due_date else {
        return false;
    };
    if status.is_terminal() {
        return false;
    }
    now > due_date
}

/// Signed time until the due date. Negative means overdue.
#[must_use]
pub fn time_remaining(due_date: Option<OffsetDateTime>, now: OffsetDateTime) -> Option<Duration> {
    due_date.map(|due| due - now)
}

/// Human readable remaining (or overdue) time.
#[must_use]
pub fn format_remaining(due_date: Option<OffsetDateTime>, now: OffsetDateTime) -> String {
    let Some(remaining) = time_remaining(due_date, now) else {
        return String::from("No SLA");
    };

    let total_minutes: i64 = remaining.whole_minutes().abs();
    let hours: i64 = total_minutes / 60;
    let minutes: i64 = total_minutes % 60;

    if remaining.is_negative() {
        format!("Breached by {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m remaining")
    }
}
