// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Duration, OffsetDateTime};
use zordon_hub::{TicketDraft, apply_create};
use zordon_hub_domain::{Priority, Role};

use super::helpers::{RecordingMailer, create_test_cause, file_ticket, setup, workload_of};
use crate::{
    AssignTicketRequest, TicketScope, UpdateEngineerRequest, assign_ticket, dashboard_stats,
    delete_ticket, get_audit_event, get_ticket, list_engineers, list_tickets, list_users, refresh_breaches,
    sync_workloads, ticket_audit_timeline, update_engineer,
};

#[test]
fn test_sync_reports_and_fixes_drift() {
    let mut f = setup();
    let mailer = RecordingMailer::default();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Zords offline", None);
    assign_ticket(
        &mut f.persistence,
        &mailer,
        &f.admin,
        ticket.ticket_id,
        &AssignTicketRequest {
            assignee_id: f.engineer.id,
        },
        create_test_cause(),
    )
    .unwrap();

    update_engineer(
        &mut f.persistence,
        &f.admin,
        f.engineer.id,
        &UpdateEngineerRequest {
            workload_score: Some(5),
            is_online: None,
        },
    )
    .unwrap();

    let first = sync_workloads(&mut f.persistence, &f.admin).unwrap();
    assert_eq!(first.corrections.len(), 1);
    assert_eq!(first.corrections[0].engineer_id, f.engineer.id);
    assert_eq!(first.corrections[0].old_score, 5);
    assert_eq!(first.corrections[0].new_score, 1);
    assert_eq!(workload_of(&mut f.persistence, &f.engineer), 1);

    let second = sync_workloads(&mut f.persistence, &f.admin).unwrap();
    assert!(second.corrections.is_empty());

    assert_eq!(
        sync_workloads(&mut f.persistence, &f.engineer)
            .unwrap_err()
            .kind(),
        "forbidden"
    );
}

#[test]
fn test_engineers_sorted_by_live_workload() {
    let mut f = setup();
    let mailer = RecordingMailer::default();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Zords offline", None);
    assign_ticket(
        &mut f.persistence,
        &mailer,
        &f.admin,
        ticket.ticket_id,
        &AssignTicketRequest {
            assignee_id: f.engineer.id,
        },
        create_test_cause(),
    )
    .unwrap();

    let engineers = list_engineers(&mut f.persistence, &f.admin).unwrap();
    let order: Vec<(&str, i64)> = engineers
        .iter()
        .map(|e| (e.user.name.as_str(), e.live_workload))
        .collect();
    assert_eq!(order, vec![("Trini Kwan", 0), ("Billy Cranston", 1)]);

    assert_eq!(
        list_engineers(&mut f.persistence, &f.reporter)
            .unwrap_err()
            .kind(),
        "forbidden"
    );
}

#[test]
fn test_users_listed_newest_first() {
    let mut f = setup();
    let users = list_users(&mut f.persistence, &f.admin).unwrap();
    assert_eq!(users.len(), 5);
    assert_eq!(users[0].name, "Trini Kwan");
    assert_eq!(users[4].role, Role::Admin);
}

#[test]
fn test_engineer_override_validation() {
    let mut f = setup();

    let updated = update_engineer(
        &mut f.persistence,
        &f.admin,
        f.engineer.id,
        &UpdateEngineerRequest {
            workload_score: None,
            is_online: Some(true),
        },
    )
    .unwrap();
    assert!(updated.is_online);

    let not_engineer = update_engineer(
        &mut f.persistence,
        &f.admin,
        f.reporter.id,
        &UpdateEngineerRequest::default(),
    )
    .unwrap_err();
    assert_eq!(not_engineer.kind(), "invalid_input");

    let negative = update_engineer(
        &mut f.persistence,
        &f.admin,
        f.engineer.id,
        &UpdateEngineerRequest {
            workload_score: Some(-1),
            is_online: None,
        },
    )
    .unwrap_err();
    assert_eq!(negative.kind(), "invalid_input");

    let missing = update_engineer(
        &mut f.persistence,
        &f.admin,
        999,
        &UpdateEngineerRequest::default(),
    )
    .unwrap_err();
    assert_eq!(missing.kind(), "not_found");
}

#[test]
fn test_dashboard_counts() {
    let mut f = setup();
    let mailer = RecordingMailer::default();
    let critical = file_ticket(&mut f.persistence, &f.reporter, "Zords offline", Some("CRITICAL"));
    file_ticket(&mut f.persistence, &f.other_reporter, "Alpha beeping", Some("LOW"));
    assign_ticket(
        &mut f.persistence,
        &mailer,
        &f.admin,
        critical.ticket_id,
        &AssignTicketRequest {
            assignee_id: f.engineer.id,
        },
        create_test_cause(),
    )
    .unwrap();

    let stats = dashboard_stats(&mut f.persistence, &f.admin).unwrap();
    assert_eq!(stats.total_users, 5);
    assert_eq!(stats.total_engineers, 2);
    assert_eq!(stats.total_tickets, 2);
    assert_eq!(stats.open_tickets, 1);
    assert_eq!(stats.assigned_tickets, 1);
    assert_eq!(stats.critical_active_tickets, 1);
    assert_eq!(stats.breached_tickets, 0);

    assert_eq!(
        dashboard_stats(&mut f.persistence, &f.engineer)
            .unwrap_err()
            .kind(),
        "forbidden"
    );
}

#[test]
fn test_audit_timeline_survives_delete() {
    let mut f = setup();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Wrong room", None);
    delete_ticket(&mut f.persistence, &f.reporter, ticket.ticket_id, create_test_cause())
        .unwrap();

    let timeline = ticket_audit_timeline(&mut f.persistence, &f.admin, ticket.ticket_id).unwrap();
    let actions: Vec<&str> = timeline.iter().map(|e| e.action_name.as_str()).collect();
    assert_eq!(actions, vec!["CreateTicket", "DeleteTicket"]);
    assert!(timeline.iter().all(|e| e.ticket_id == Some(ticket.ticket_id)));

    assert_eq!(
        ticket_audit_timeline(&mut f.persistence, &f.reporter, ticket.ticket_id)
            .unwrap_err()
            .kind(),
        "forbidden"
    );
}

#[test]
fn test_single_audit_event_lookup() {
    let mut f = setup();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Power coin cracked", None);
    let timeline = ticket_audit_timeline(&mut f.persistence, &f.admin, ticket.ticket_id).unwrap();
    let event_id = timeline[0].event_id.unwrap();

    let event = get_audit_event(&mut f.persistence, &f.admin, event_id).unwrap();
    assert_eq!(event, timeline[0]);
    assert_eq!(event.action_name, "CreateTicket");

    let missing = get_audit_event(&mut f.persistence, &f.admin, event_id + 1000).unwrap_err();
    assert_eq!(missing.kind(), "not_found");
    assert!(missing.to_string().contains("Audit event"));

    assert_eq!(
        get_audit_event(&mut f.persistence, &f.engineer, event_id)
            .unwrap_err()
            .kind(),
        "forbidden"
    );
}

#[test]
fn test_reads_flag_overdue_tickets_once() {
    let mut f = setup();
    let yesterday = OffsetDateTime::now_utc() - Duration::days(1);
    let overdue = apply_create(
        f.reporter.id,
        TicketDraft {
            title: String::from("Overdue zord repair"),
            priority: Some(Priority::Critical),
            ..TicketDraft::default()
        },
        f.reporter.to_audit_actor(),
        create_test_cause(),
        yesterday,
    )
    .unwrap();
    let stored = f.persistence.create_ticket(&overdue).unwrap();
    file_ticket(&mut f.persistence, &f.reporter, "Fresh ticket", None);

    let listed = list_tickets(&mut f.persistence, &f.reporter, TicketScope::Reported).unwrap();
    let flags: Vec<bool> = listed.iter().map(|t| t.breached).collect();
    assert_eq!(flags, vec![false, true]);
    assert!(listed[1].sla_status.starts_with("Breached by"));

    assert!(
        refresh_breaches(&mut f.persistence, OffsetDateTime::now_utc())
            .unwrap()
            .is_empty()
    );
    assert!(
        get_ticket(&mut f.persistence, &f.reporter, stored.ticket_id)
            .unwrap()
            .breached
    );
}
