// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use zordon_hub_audit::{AuditEvent, StateSnapshot};
use zordon_hub_domain::{NewTicket, Ticket};

/// Converts a ticket to a snapshot for audit purposes.
#[must_use]
pub fn ticket_snapshot(ticket: &Ticket) -> StateSnapshot {
    let assignee: String = ticket
        .assignee_id
        .map_or_else(|| String::from("none"), |id| id.to_string());
    StateSnapshot::new(format!(
        "status={},assignee={},priority={},breached={}",
        ticket.status, assignee, ticket.priority, ticket.breached
    ))
}

/// A signed change to one engineer's cached workload score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadAdjustment {
    pub engineer_id: i64,
    /// Either `1` or `-1`.
    pub delta: i64,
}

impl WorkloadAdjustment {
    #[must_use]
    pub const fn increment(engineer_id: i64) -> Self {
        Self {
            engineer_id,
            delta: 1,
        }
    }

    #[must_use]
    pub const fn decrement(engineer_id: i64) -> Self {
        Self {
            engineer_id,
            delta: -1,
        }
    }
}

/// Who a notification is about and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    /// Sent to the engineer who just received the ticket.
    AssignedToYou,
    /// Sent to the reporter when their ticket gets an engineer.
    ReporterTicketAssigned {
        /// Display name of the new assignee.
        assignee_name: String,
    },
    /// Sent to the assignee when the due date is inside the reminder window.
    DeadlineApproaching,
}

/// A request for an outbound email, produced as data by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub recipient_id: i64,
    pub ticket_id: i64,
    pub ticket_title: String,
    pub kind: NotificationKind,
}

/// The result of a successful ticket transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub ticket_id: i64,
    /// The ticket after the transition, `None` when it was deleted.
    pub new_ticket: Option<Ticket>,
    /// Workload changes to apply atomically alongside the ticket write.
    pub workload_adjustments: Vec<WorkloadAdjustment>,
    /// Best-effort notifications to dispatch after the write commits.
    pub notifications: Vec<NotificationRequest>,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// The result of creating a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResult {
    pub new_ticket: NewTicket,
    /// Not yet bound to a ticket id; persistence binds it after the insert.
    pub audit_event: AuditEvent,
}
