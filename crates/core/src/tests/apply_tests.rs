// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    NOW, create_test_actor, create_test_cause, create_test_engineer, create_test_ticket,
    create_test_user,
};
use crate::{
    Command, CoreError, CreateResult, NotificationKind, TicketDraft, TransitionResult,
    WorkloadAdjustment, apply, apply_create,
};
use time::Duration;
use zordon_hub_domain::{DomainError, Priority, Role, TicketStatus};

fn draft(title: &str, priority: Option<Priority>) -> TicketDraft {
    TicketDraft {
        title: String::from(title),
        priority,
        ..TicketDraft::default()
    }
}

#[test]
fn test_create_defaults() {
    let result: CreateResult = apply_create(
        7,
        draft("  Command center lights flicker ", None),
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    let ticket = result.new_ticket;
    assert_eq!(ticket.title, "Command center lights flicker");
    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.priority, Priority::Medium);
    assert_eq!(ticket.category, "GENERAL");
    assert_eq!(ticket.reporter_id, 7);
    assert_eq!(ticket.due_date, NOW + Duration::hours(24));
}

#[test]
fn test_create_critical_due_in_four_hours() {
    let result: CreateResult = apply_create(
        7,
        draft("Megazord power core", Some(Priority::Critical)),
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(result.new_ticket.due_date, NOW + Duration::hours(4));
    assert_eq!(result.audit_event.action.name, "CreateTicket");
    assert_eq!(result.audit_event.ticket_id, None);
}

#[test]
fn test_create_rejects_blank_title() {
    let result = apply_create(
        7,
        draft("   ", None),
        create_test_actor(),
        create_test_cause(),
        NOW,
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidTitle(_)))
    ));
}

#[test]
fn test_create_blank_category_defaults() {
    let mut ticket_draft: TicketDraft = draft("Alarm", None);
    ticket_draft.category = Some(String::from("  "));
    ticket_draft.tags = vec![String::from("alarm"), String::from(" alarm ")];
    let result: CreateResult = apply_create(
        7,
        ticket_draft,
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(result.new_ticket.category, "GENERAL");
    assert_eq!(result.new_ticket.tags, vec![String::from("alarm")]);
}

#[test]
fn test_assign_to_non_engineer_fails() {
    let ticket = create_test_ticket(1, TicketStatus::Open, None);
    for role in [Role::Ranger, Role::Admin] {
        let result = apply(
            &ticket,
            Command::AssignTicket {
                assignee: create_test_user(9, role),
            },
            create_test_actor(),
            create_test_cause(),
            NOW,
        );
        assert_eq!(
            result,
            Err(CoreError::InvalidAssignee { user_id: 9, role })
        );
    }
}

#[test]
fn test_assign_emits_two_notifications() {
    let ticket = create_test_ticket(1, TicketStatus::Open, None);
    let result: TransitionResult = apply(
        &ticket,
        Command::AssignTicket {
            assignee: create_test_engineer(5),
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(result.notifications.len(), 2);
    assert_eq!(result.notifications[0].recipient_id, 5);
    assert_eq!(result.notifications[0].kind, NotificationKind::AssignedToYou);
    assert_eq!(result.notifications[1].recipient_id, 100);
    assert_eq!(
        result.notifications[1].kind,
        NotificationKind::ReporterTicketAssigned {
            assignee_name: String::from("User 5")
        }
    );
}

#[test]
fn test_assign_resets_status_to_assigned() {
    let ticket = create_test_ticket(1, TicketStatus::PendingParts, Some(5));
    let result: TransitionResult = apply(
        &ticket,
        Command::AssignTicket {
            assignee: create_test_engineer(5),
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    let updated = result.new_ticket.unwrap();
    assert_eq!(updated.status, TicketStatus::Assigned);
    assert!(result.workload_adjustments.is_empty());
}

#[test]
fn test_assign_terminal_ticket_to_same_engineer_counts_again() {
    let ticket = create_test_ticket(1, TicketStatus::Resolved, Some(5));
    let result: TransitionResult = apply(
        &ticket,
        Command::AssignTicket {
            assignee: create_test_engineer(5),
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(
        result.workload_adjustments,
        vec![WorkloadAdjustment::increment(5)]
    );
}

#[test]
fn test_assign_terminal_ticket_does_not_release_previous() {
    let ticket = create_test_ticket(1, TicketStatus::Closed, Some(5));
    let result: TransitionResult = apply(
        &ticket,
        Command::AssignTicket {
            assignee: create_test_engineer(6),
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(
        result.workload_adjustments,
        vec![WorkloadAdjustment::increment(6)]
    );
}

#[test]
fn test_set_assigned_without_assignee_is_invalid_transition() {
    let ticket = create_test_ticket(1, TicketStatus::Open, None);
    let result = apply(
        &ticket,
        Command::SetStatus {
            status: TicketStatus::Assigned,
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    );
    assert!(matches!(
        result,
        Err(CoreError::InvalidTransition {
            from: TicketStatus::Open,
            to: TicketStatus::Assigned,
            ..
        })
    ));
}

#[test]
fn test_unrestricted_active_jump_allowed() {
    let ticket = create_test_ticket(1, TicketStatus::Open, None);
    let result: TransitionResult = apply(
        &ticket,
        Command::SetStatus {
            status: TicketStatus::PendingParts,
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(
        result.new_ticket.unwrap().status,
        TicketStatus::PendingParts
    );
    assert!(result.workload_adjustments.is_empty());
}

#[test]
fn test_terminal_to_terminal_has_no_workload_effect() {
    let ticket = create_test_ticket(1, TicketStatus::Resolved, Some(5));
    let result: TransitionResult = apply(
        &ticket,
        Command::SetStatus {
            status: TicketStatus::Closed,
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();
    assert!(result.workload_adjustments.is_empty());
}

#[test]
fn test_delete_active_assigned_releases_engineer() {
    let ticket = create_test_ticket(1, TicketStatus::InProgress, Some(5));
    let result: TransitionResult = apply(
        &ticket,
        Command::DeleteTicket,
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert!(result.new_ticket.is_none());
    assert_eq!(
        result.workload_adjustments,
        vec![WorkloadAdjustment::decrement(5)]
    );
    assert_eq!(result.audit_event.after.data, "none");
    assert_eq!(result.audit_event.ticket_id, Some(1));
}

#[test]
fn test_delete_terminal_ticket_leaves_workload() {
    let ticket = create_test_ticket(1, TicketStatus::Closed, Some(5));
    let result: TransitionResult = apply(
        &ticket,
        Command::DeleteTicket,
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();
    assert!(result.workload_adjustments.is_empty());
}

#[test]
fn test_audit_event_contains_before_and_after_state() {
    let ticket = create_test_ticket(3, TicketStatus::Open, None);
    let result: TransitionResult = apply(
        &ticket,
        Command::AssignTicket {
            assignee: create_test_engineer(5),
        },
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();

    assert_eq!(
        result.audit_event.before.data,
        "status=OPEN,assignee=none,priority=MEDIUM,breached=false"
    );
    assert_eq!(
        result.audit_event.after.data,
        "status=ASSIGNED,assignee=5,priority=MEDIUM,breached=false"
    );
    assert_eq!(result.audit_event.actor.id, "1");
    assert_eq!(result.audit_event.cause.id, "req-456");
}
