// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Duration, OffsetDateTime, macros::datetime};

use crate::{
    Priority, TicketStatus, calculate_due_date, calculate_due_date_for, format_remaining,
    is_breached, time_remaining,
};

const CREATED: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

#[test]
fn test_due_date_per_priority() {
    assert_eq!(
        calculate_due_date(Priority::Critical, CREATED),
        datetime!(2026-03-01 16:00 UTC)
    );
    assert_eq!(
        calculate_due_date(Priority::High, CREATED),
        datetime!(2026-03-01 20:00 UTC)
    );
    assert_eq!(
        calculate_due_date(Priority::Medium, CREATED),
        datetime!(2026-03-02 12:00 UTC)
    );
    assert_eq!(
        calculate_due_date(Priority::Low, CREATED),
        datetime!(2026-03-04 12:00 UTC)
    );
}

#[test]
fn test_unknown_priority_falls_back_to_medium() {
    assert_eq!(
        calculate_due_date_for("URGENT", CREATED),
        calculate_due_date(Priority::Medium, CREATED)
    );
    assert_eq!(
        calculate_due_date_for("high", CREATED),
        calculate_due_date(Priority::High, CREATED)
    );
}

#[test]
fn test_is_breached_requires_active_and_past_due() {
    let due = Some(CREATED);
    let after = CREATED + Duration::minutes(1);

    assert!(is_breached(due, TicketStatus::InProgress, after));
    assert!(!is_breached(due, TicketStatus::InProgress, CREATED));
    assert!(!is_breached(due, TicketStatus::Resolved, after));
    assert!(!is_breached(due, TicketStatus::Closed, after));
    assert!(!is_breached(None, TicketStatus::Open, after));
}

#[test]
fn test_time_remaining_is_signed() {
    let due = Some(CREATED);
    assert_eq!(
        time_remaining(due, CREATED - Duration::hours(2)),
        Some(Duration::hours(2))
    );
    assert_eq!(
        time_remaining(due, CREATED + Duration::hours(2)),
        Some(Duration::hours(-2))
    );
    assert_eq!(time_remaining(None, CREATED), None);
}

#[test]
fn test_format_remaining() {
    let due = Some(CREATED);
    assert_eq!(
        format_remaining(due, CREATED - Duration::minutes(150)),
        "2h 30m remaining"
    );
    assert_eq!(
        format_remaining(due, CREATED + Duration::minutes(65)),
        "Breached by 1h 5m"
    );
    assert_eq!(format_remaining(None, CREATED), "No SLA");
}
