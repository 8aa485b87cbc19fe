// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::HashMap;

use crate::tests::helpers::{
    NOW, create_test_actor, create_test_cause, create_test_engineer, create_test_ticket,
};
use crate::{Command, TransitionResult, adjusted_score, apply};
use zordon_hub_domain::{Ticket, TicketStatus};

fn step(ticket: &Ticket, command: Command, ledger: &mut HashMap<i64, i64>) -> Option<Ticket> {
    let result: TransitionResult = apply(
        ticket,
        command,
        create_test_actor(),
        create_test_cause(),
        NOW,
    )
    .unwrap();
    for adjustment in &result.workload_adjustments {
        let score = ledger.entry(adjustment.engineer_id).or_insert(0);
        *score = adjusted_score(*score, adjustment.delta);
    }
    result.new_ticket
}

#[test]
fn test_assign_then_reassign_moves_workload() {
    let mut ledger: HashMap<i64, i64> = HashMap::new();
    let ticket = create_test_ticket(1, TicketStatus::Open, None);

    let ticket = step(
        &ticket,
        Command::AssignTicket {
            assignee: create_test_engineer(11),
        },
        &mut ledger,
    )
    .unwrap();
    assert_eq!(ticket.status, TicketStatus::Assigned);
    assert_eq!(ledger[&11], 1);

    let ticket = step(
        &ticket,
        Command::AssignTicket {
            assignee: create_test_engineer(12),
        },
        &mut ledger,
    )
    .unwrap();
    assert_eq!(ticket.status, TicketStatus::Assigned);
    assert_eq!(ticket.assignee_id, Some(12));
    assert_eq!(ledger[&11], 0);
    assert_eq!(ledger[&12], 1);
}

#[test]
fn test_resolve_then_reopen_restores_workload() {
    let mut ledger: HashMap<i64, i64> = HashMap::from([(11, 3)]);
    let ticket = create_test_ticket(1, TicketStatus::InProgress, Some(11));

    let ticket = step(
        &ticket,
        Command::SetStatus {
            status: TicketStatus::Resolved,
        },
        &mut ledger,
    )
    .unwrap();
    assert_eq!(ledger[&11], 2);

    let ticket = step(
        &ticket,
        Command::SetStatus {
            status: TicketStatus::InProgress,
        },
        &mut ledger,
    )
    .unwrap();
    assert_eq!(ticket.status, TicketStatus::InProgress);
    assert_eq!(ledger[&11], 3);
}

#[test]
fn test_decrement_never_goes_negative() {
    let mut ledger: HashMap<i64, i64> = HashMap::new();
    let ticket = create_test_ticket(1, TicketStatus::InProgress, Some(11));

    step(&ticket, Command::DeleteTicket, &mut ledger);
    assert_eq!(ledger[&11], 0);
}

#[test]
fn test_due_date_survives_transitions() {
    let mut ledger: HashMap<i64, i64> = HashMap::new();
    let ticket = create_test_ticket(1, TicketStatus::Open, None);
    let due = ticket.due_date;

    let ticket = step(
        &ticket,
        Command::AssignTicket {
            assignee: create_test_engineer(11),
        },
        &mut ledger,
    )
    .unwrap();
    let ticket = step(
        &ticket,
        Command::SetStatus {
            status: TicketStatus::Closed,
        },
        &mut ledger,
    )
    .unwrap();

    assert_eq!(ticket.due_date, due);
    assert_eq!(ticket.reporter_id, 100);
}
