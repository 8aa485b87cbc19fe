// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Selection rules for the lazy breach check and the deadline sweep.

use time::{Duration, OffsetDateTime};

use zordon_hub_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use zordon_hub_domain::{Ticket, is_breached};

use crate::state::{NotificationKind, NotificationRequest};

/// Returns the ids of tickets that are breached now but not yet flagged.
///
/// Tickets already flagged are skipped so a repeated read issues no
/// redundant write.
#[must_use]
pub fn select_newly_breached(tickets: &[Ticket], now: OffsetDateTime) -> Vec<i64> {
    tickets
        .iter()
        .filter(|t| !t.breached && is_breached(t.due_date, t.status, now))
        .map(|t| t.ticket_id)
        .collect()
}

/// Builds the audit event recorded when a ticket is flagged as breached.
#[must_use]
pub fn breach_audit_event(ticket_id: i64, now: OffsetDateTime) -> AuditEvent {
    AuditEvent::new(
        Actor::system(),
        Cause::new(
            format!("breach-check-{}", now.unix_timestamp()),
            String::from("SLA due date passed while the ticket was active"),
        ),
        Action::new(String::from("MarkBreached"), None),
        StateSnapshot::new(String::from("breached=false")),
        StateSnapshot::new(String::from("breached=true")),
        Some(ticket_id),
    )
}

/// Returns true if a deadline reminder should be sent for `ticket`.
///
/// The ticket must be active, assigned, not yet reminded, and due inside
/// `(now, now + window]`.
#[must_use]
pub fn is_deadline_candidate(ticket: &Ticket, now: OffsetDateTime, window: Duration) -> bool {
    let Some(due_date) = ticket.due_date else {
        return false;
    };
    ticket.assignee_id.is_some()
        && ticket.status.is_active()
        && !ticket.deadline_notified
        && due_date > now
        && due_date <= now.saturating_add(window)
}

/// Selects deadline reminder candidates, soonest due first.
#[must_use]
pub fn select_deadline_candidates(
    tickets: &[Ticket],
    now: OffsetDateTime,
    window: Duration,
) -> Vec<NotificationRequest> {
    let mut candidates: Vec<&Ticket> = tickets
        .iter()
        .filter(|t| is_deadline_candidate(t, now, window))
        .collect();
    candidates.sort_by_key(|t| (t.due_date, t.ticket_id));

    candidates
        .into_iter()
        .filter_map(|t| {
            t.assignee_id.map(|assignee_id| NotificationRequest {
                recipient_id: assignee_id,
                ticket_id: t.ticket_id,
                ticket_title: t.title.clone(),
                kind: NotificationKind::DeadlineApproaching,
            })
        })
        .collect()
}
