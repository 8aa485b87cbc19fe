// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Mutex;
use time::OffsetDateTime;
use zordon_hub_audit::Cause;
use zordon_hub_domain::{Department, Priority, Role, Ticket, TicketStatus};
use zordon_hub_persistence::{NewUserData, Persistence};

use crate::{
    AuthenticatedActor, Broadcaster, CommentEvent, CreateTicketRequest, MailError, MailReceipt,
    Mailer, OutgoingMail, TicketInfo, create_ticket,
};

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

/// A mailer that records what it sends and fails on chosen calls.
#[derive(Default)]
pub struct RecordingMailer {
    /// 1-based call numbers that fail.
    fail_on: Vec<usize>,
    calls: Mutex<usize>,
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_on: calls.to_vec(),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    fn send_mail(&self, mail: &OutgoingMail) -> Result<MailReceipt, MailError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if self.fail_on.contains(&call) {
            return Err(MailError::Unavailable(String::from("connection refused")));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(MailReceipt {
            message_id: format!("msg-{call}"),
        })
    }
}

/// A broadcaster that records every publish.
#[derive(Default)]
pub struct RecordingBroadcaster {
    events: Mutex<Vec<(String, CommentEvent)>>,
}

impl RecordingBroadcaster {
    pub fn events(&self) -> Vec<(String, CommentEvent)> {
        self.events.lock().unwrap().clone()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn publish(&self, channel: &str, event: &CommentEvent) {
        self.events
            .lock()
            .unwrap()
            .push((String::from(channel), event.clone()));
    }
}

pub fn register(persistence: &mut Persistence, name: &str, role: Role) -> AuthenticatedActor {
    let user = persistence
        .create_user(&NewUserData {
            name: String::from(name),
            email: format!("{}@zordon.test", name.to_lowercase().replace(' ', ".")),
            password: String::from("morphin-time"),
            role,
            department: Department::Red,
            skills: Vec::new(),
        })
        .unwrap();
    AuthenticatedActor::from_user(&user)
}

/// A database with one user of each kind plus spares.
pub struct Fixture {
    pub persistence: Persistence,
    pub admin: AuthenticatedActor,
    pub reporter: AuthenticatedActor,
    pub other_reporter: AuthenticatedActor,
    pub engineer: AuthenticatedActor,
    pub other_engineer: AuthenticatedActor,
}

pub fn setup() -> Fixture {
    let mut persistence = Persistence::new_in_memory().unwrap();
    let admin = register(&mut persistence, "Zordon", Role::Admin);
    let reporter = register(&mut persistence, "Jason Scott", Role::Ranger);
    let other_reporter = register(&mut persistence, "Kimberly Hart", Role::Ranger);
    let engineer = register(&mut persistence, "Billy Cranston", Role::Engineer);
    let other_engineer = register(&mut persistence, "Trini Kwan", Role::Engineer);
    Fixture {
        persistence,
        admin,
        reporter,
        other_reporter,
        engineer,
        other_engineer,
    }
}

pub fn file_ticket(
    persistence: &mut Persistence,
    reporter: &AuthenticatedActor,
    title: &str,
    priority: Option<&str>,
) -> TicketInfo {
    create_ticket(
        persistence,
        reporter,
        &CreateTicketRequest {
            title: String::from(title),
            priority: priority.map(String::from),
            ..CreateTicketRequest::default()
        },
        create_test_cause(),
    )
    .unwrap()
}

pub fn workload_of(persistence: &mut Persistence, actor: &AuthenticatedActor) -> i64 {
    persistence.get_user(actor.id).unwrap().unwrap().workload_score
}

pub fn actor(id: i64, role: Role) -> AuthenticatedActor {
    AuthenticatedActor {
        id,
        role,
        name: format!("user-{id}"),
        email: format!("user-{id}@zordon.test"),
        department: Department::Blue,
    }
}

/// An in-memory ticket for pure policy checks.
pub fn ticket(reporter_id: i64, assignee_id: Option<i64>, status: TicketStatus) -> Ticket {
    let now = OffsetDateTime::now_utc();
    Ticket {
        ticket_id: 7,
        title: String::from("Command center console flickers"),
        description: None,
        category: String::from("GENERAL"),
        priority: Priority::Medium,
        status,
        reporter_id,
        assignee_id,
        due_date: Some(now),
        breached: false,
        deadline_notified: false,
        tags: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}
