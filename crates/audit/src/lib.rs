// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

#[cfg(test)]
mod tests;

use zordon_hub_domain::Role;

/// Represents the entity performing an action.
///
/// An actor is either an authenticated user or the system itself
/// (for example the breach and deadline sweeps).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "ADMIN", "ENGINEER", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// Creates an actor for an authenticated user acting under `role`.
    #[must_use]
    pub fn user(user_id: i64, role: Role) -> Self {
        Self {
            id: user_id.to_string(),
            actor_type: role.as_str().to_string(),
        }
    }

    /// Creates the actor used for scheduled and maintenance work.
    #[must_use]
    pub fn system() -> Self {
        Self {
            id: String::from("system"),
            actor_type: String::from("system"),
        }
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID, sweep run).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`AssignTicket`", "`SetStatus`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A compact rendering of the ticket fields an action touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }

    /// Snapshot used when there is no prior (or no remaining) ticket state.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: String::from("none"),
        }
    }
}

/// An immutable audit event representing a ticket transition.
///
/// Every successful lifecycle change produces exactly one audit event.
/// Events are append-only and capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The state before and after the transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Assigned by persistence. `None` until the event is stored.
    pub event_id: Option<i64>,
    /// The ticket this event belongs to. `None` before a ticket id exists
    /// and for workspace-wide actions such as a workload sync.
    pub ticket_id: Option<i64>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new, unpersisted `AuditEvent`.
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        ticket_id: Option<i64>,
    ) -> Self {
        Self {
            event_id: None,
            ticket_id,
            actor,
            cause,
            action,
            before,
            after,
        }
    }

    /// Returns a copy of this event bound to `ticket_id`.
    ///
    /// Used when the ticket id is only known after the insert.
    #[must_use]
    pub fn for_ticket(mut self, ticket_id: i64) -> Self {
        self.ticket_id = Some(ticket_id);
        self
    }
}
