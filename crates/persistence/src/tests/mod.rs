// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::too_many_lines)]

mod comment_tests;
mod initialization_tests;
mod workload_tests;

use time::OffsetDateTime;
use zordon_hub::{
    Command, CreateResult, TicketDraft, TransitionResult, apply, apply_create,
};
use zordon_hub_audit::{Actor, Cause};
use zordon_hub_domain::{Department, Priority, Role, Ticket, TicketStatus, User};

use crate::{NewUserData, Persistence};

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn new_user_data(name: &str, email: &str, role: Role, department: Department) -> NewUserData {
    NewUserData {
        name: String::from(name),
        email: String::from(email),
        password: String::from("morphin-time"),
        role,
        department,
        skills: Vec::new(),
    }
}

pub fn create_user(persistence: &mut Persistence, name: &str, role: Role) -> User {
    let email: String = format!("{}@zordon.io", name.to_lowercase().replace(' ', "."));
    persistence
        .create_user(&new_user_data(name, &email, role, Department::Red))
        .expect("user should be created")
}

/// Fresh database with one reporter and two engineers.
pub fn setup() -> (Persistence, User, User, User) {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("in-memory database");
    let reporter: User = create_user(&mut persistence, "Jason Scott", Role::Ranger);
    let engineer_a: User = create_user(&mut persistence, "Billy Cranston", Role::Engineer);
    let engineer_b: User = create_user(&mut persistence, "Trini Kwan", Role::Engineer);
    (persistence, reporter, engineer_a, engineer_b)
}

pub fn create_ticket(
    persistence: &mut Persistence,
    reporter: &User,
    title: &str,
    priority: Priority,
) -> Ticket {
    let draft: TicketDraft = TicketDraft {
        title: String::from(title),
        priority: Some(priority),
        ..TicketDraft::default()
    };
    let result: CreateResult = apply_create(
        reporter.user_id,
        draft,
        Actor::user(reporter.user_id, reporter.role),
        create_test_cause(),
        OffsetDateTime::now_utc(),
    )
    .expect("draft should be valid");
    persistence
        .create_ticket(&result)
        .expect("ticket should be stored")
}

pub fn run_command(persistence: &mut Persistence, ticket: &Ticket, command: Command) -> Ticket {
    let result: TransitionResult = apply(
        ticket,
        command,
        Actor::user(1, Role::Admin),
        create_test_cause(),
        OffsetDateTime::now_utc(),
    )
    .expect("command should apply");
    persistence
        .persist_transition(&result)
        .expect("transition should persist");
    persistence
        .get_ticket(ticket.ticket_id)
        .expect("query should succeed")
        .unwrap_or_else(|| ticket.clone())
}

pub fn assign(persistence: &mut Persistence, ticket: &Ticket, engineer: &User) -> Ticket {
    run_command(
        persistence,
        ticket,
        Command::AssignTicket {
            assignee: engineer.clone(),
        },
    )
}

pub fn set_status(persistence: &mut Persistence, ticket: &Ticket, status: TicketStatus) -> Ticket {
    run_command(persistence, ticket, Command::SetStatus { status })
}

pub fn workload_of(persistence: &mut Persistence, user_id: i64) -> i64 {
    persistence
        .get_user(user_id)
        .expect("query should succeed")
        .expect("user should exist")
        .workload_score
}
