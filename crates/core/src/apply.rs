// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;

use crate::command::{Command, TicketDraft};
use crate::error::CoreError;
use crate::state::{
    CreateResult, NotificationKind, NotificationRequest, TransitionResult, WorkloadAdjustment,
    ticket_snapshot,
};
use zordon_hub_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use zordon_hub_domain::{
    DEFAULT_CATEGORY, NewTicket, Priority, Ticket, TicketStatus, User, calculate_due_date,
    normalize_tags, validate_title,
};

/// Builds a new OPEN ticket for `reporter_id`.
///
/// The due date is fixed here from the priority's SLA window and never
/// recalculated afterwards.
///
/// # Errors
///
/// Returns an error if the title is empty after trimming.
pub fn apply_create(
    reporter_id: i64,
    draft: TicketDraft,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<CreateResult, CoreError> {
    let title: String = validate_title(&draft.title)?;
    let priority: Priority = draft.priority.unwrap_or_default();
    let category: String = draft
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    let description: Option<String> = draft
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let new_ticket: NewTicket = NewTicket {
        title,
        description,
        category,
        priority,
        status: TicketStatus::Open,
        reporter_id,
        due_date: calculate_due_date(priority, now),
        tags: normalize_tags(&draft.tags),
        created_at: now,
    };

    let action: Action = Action::new(
        String::from("CreateTicket"),
        Some(format!(
            "Created {} ticket '{}' reported by user {reporter_id}",
            new_ticket.priority, new_ticket.title
        )),
    );
    let after: StateSnapshot = StateSnapshot::new(format!(
        "status={},assignee=none,priority={},breached=false",
        new_ticket.status, new_ticket.priority
    ));
    let audit_event: AuditEvent =
        AuditEvent::new(actor, cause, action, StateSnapshot::empty(), after, None);

    Ok(CreateResult {
        new_ticket,
        audit_event,
    })
}

/// Applies a lifecycle command to a ticket, producing the new ticket,
/// the workload adjustments, the notifications and an audit event.
///
/// This function is pure. Role gating happens before it is called; the
/// rules enforced here hold regardless of who is acting.
///
/// # Errors
///
/// Returns an error if:
/// - The assignee does not hold the ENGINEER role
/// - ASSIGNED is requested for a ticket with no assignee
pub fn apply(
    ticket: &Ticket,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let before: StateSnapshot = ticket_snapshot(ticket);
    let action_name: &'static str = command.action_name();

    let (new_ticket, workload_adjustments, notifications, details) = match command {
        Command::AssignTicket { assignee } => apply_assign(ticket, &assignee, now)?,
        Command::SetStatus { status } => apply_set_status(ticket, status, now)?,
        Command::DeleteTicket => {
            let mut adjustments: Vec<WorkloadAdjustment> = Vec::new();
            if let Some(assignee_id) = ticket.assignee_id
                && ticket.status.is_active()
            {
                adjustments.push(WorkloadAdjustment::decrement(assignee_id));
            }
            (
                None,
                adjustments,
                Vec::new(),
                format!("Deleted ticket {} in status {}", ticket.ticket_id, ticket.status),
            )
        }
    };

    let after: StateSnapshot = new_ticket
        .as_ref()
        .map_or_else(StateSnapshot::empty, ticket_snapshot);
    let action: Action = Action::new(String::from(action_name), Some(details));
    let audit_event: AuditEvent =
        AuditEvent::new(actor, cause, action, before, after, Some(ticket.ticket_id));

    Ok(TransitionResult {
        ticket_id: ticket.ticket_id,
        new_ticket,
        workload_adjustments,
        notifications,
        audit_event,
    })
}

type Transition = (
    Option<Ticket>,
    Vec<WorkloadAdjustment>,
    Vec<NotificationRequest>,
    String,
);

fn apply_assign(
    ticket: &Ticket,
    assignee: &User,
    now: OffsetDateTime,
) -> Result<Transition, CoreError> {
    if !assignee.is_engineer() {
        return Err(CoreError::InvalidAssignee {
            user_id: assignee.user_id,
            role: assignee.role,
        });
    }

    let previous: Option<i64> = ticket.assignee_id;
    let was_active: bool = ticket.status.is_active();
    let mut adjustments: Vec<WorkloadAdjustment> = Vec::new();

    // A terminal ticket was not counted for anyone, so only an active one
    // releases its previous assignee.
    if let Some(previous_id) = previous
        && previous_id != assignee.user_id
        && was_active
    {
        adjustments.push(WorkloadAdjustment::decrement(previous_id));
    }
    if previous != Some(assignee.user_id) || !was_active {
        adjustments.push(WorkloadAdjustment::increment(assignee.user_id));
    }

    let mut updated: Ticket = ticket.clone();
    updated.assignee_id = Some(assignee.user_id);
    // Reassignment always resets to ASSIGNED, even from further along.
    updated.status = TicketStatus::Assigned;
    updated.updated_at = now;

    let notifications: Vec<NotificationRequest> = vec![
        NotificationRequest {
            recipient_id: assignee.user_id,
            ticket_id: ticket.ticket_id,
            ticket_title: ticket.title.clone(),
            kind: NotificationKind::AssignedToYou,
        },
        NotificationRequest {
            recipient_id: ticket.reporter_id,
            ticket_id: ticket.ticket_id,
            ticket_title: ticket.title.clone(),
            kind: NotificationKind::ReporterTicketAssigned {
                assignee_name: assignee.name.clone(),
            },
        },
    ];

    let details: String = match previous {
        Some(previous_id) if previous_id != assignee.user_id => format!(
            "Reassigned ticket {} from user {previous_id} to user {}",
            ticket.ticket_id, assignee.user_id
        ),
        _ => format!(
            "Assigned ticket {} to user {}",
            ticket.ticket_id, assignee.user_id
        ),
    };

    Ok((Some(updated), adjustments, notifications, details))
}

fn apply_set_status(
    ticket: &Ticket,
    status: TicketStatus,
    now: OffsetDateTime,
) -> Result<Transition, CoreError> {
    if status == TicketStatus::Assigned && ticket.assignee_id.is_none() {
        return Err(CoreError::InvalidTransition {
            from: ticket.status,
            to: status,
            reason: String::from("the ticket has no assignee"),
        });
    }

    let mut adjustments: Vec<WorkloadAdjustment> = Vec::new();
    if let Some(assignee_id) = ticket.assignee_id {
        if ticket.status.is_active() && status.is_terminal() {
            adjustments.push(WorkloadAdjustment::decrement(assignee_id));
        } else if ticket.status.is_terminal() && status.is_active() {
            adjustments.push(WorkloadAdjustment::increment(assignee_id));
        }
    }

    let mut updated: Ticket = ticket.clone();
    updated.status = status;
    updated.updated_at = now;

    let details: String = format!(
        "Ticket {} moved from {} to {status}",
        ticket.ticket_id, ticket.status
    );

    Ok((Some(updated), adjustments, Vec::new(), details))
}
