// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{OffsetDateTime, macros::datetime};
use zordon_hub_audit::{Actor, Cause};
use zordon_hub_domain::{Department, Priority, Role, Ticket, TicketStatus, User};

pub const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

pub fn create_test_actor() -> Actor {
    Actor::user(1, Role::Admin)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Admin request"))
}

pub fn create_test_user(user_id: i64, role: Role) -> User {
    User {
        user_id,
        name: format!("User {user_id}"),
        email: format!("user{user_id}@zordon.io"),
        role,
        department: Department::Red,
        is_online: true,
        workload_score: 0,
        skills: Vec::new(),
        created_at: NOW,
    }
}

pub fn create_test_engineer(user_id: i64) -> User {
    create_test_user(user_id, Role::Engineer)
}

pub fn create_test_ticket(ticket_id: i64, status: TicketStatus, assignee_id: Option<i64>) -> Ticket {
    Ticket {
        ticket_id,
        title: format!("Ticket {ticket_id}"),
        description: None,
        category: String::from("GENERAL"),
        priority: Priority::Medium,
        status,
        reporter_id: 100,
        assignee_id,
        due_date: Some(NOW + time::Duration::hours(24)),
        breached: false,
        deadline_notified: false,
        tags: Vec::new(),
        created_at: NOW,
        updated_at: NOW,
    }
}
