// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use zordon_hub_domain::{Department, Priority, Role, User};

use crate::error::PersistenceError;

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

/// Fields needed to register a user.
///
/// The password is plain text here and hashed before it is stored.
#[derive(Debug, Clone)]
pub struct NewUserData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub department: Department,
    pub skills: Vec<String>,
}

/// A user together with the stored password hash.
///
/// Only authentication code should ever see this.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Session information.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

/// Which tickets a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketFilter {
    /// Every ticket.
    All,
    /// Tickets whose reporter is the given user.
    ReportedBy(i64),
    /// Tickets whose assignee is the given user.
    AssignedTo(i64),
}

/// The subset of a user shown next to each comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAuthor {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub role: Role,
}

/// A comment with its author projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentWithAuthor {
    pub comment: zordon_hub_domain::Comment,
    pub author: CommentAuthor,
}

/// An engineer together with a workload computed from tickets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineerWorkload {
    pub engineer: User,
    /// Active assigned tickets right now, independent of the cached score.
    pub live_workload: i64,
}

/// Aggregate counts for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_engineers: i64,
    pub online_engineers: i64,
    pub total_tickets: i64,
    pub open_tickets: i64,
    pub assigned_tickets: i64,
    pub in_progress_tickets: i64,
    pub pending_parts_tickets: i64,
    /// RESOLVED plus CLOSED.
    pub resolved_tickets: i64,
    pub critical_active_tickets: i64,
    pub breached_tickets: i64,
    /// Active tickets per priority, every priority present.
    pub active_by_priority: Vec<(Priority, i64)>,
    /// Tickets per reporter department, departments with tickets only.
    pub tickets_by_department: Vec<(Department, i64)>,
}

/// Formats a timestamp for storage.
pub(crate) fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    Ok(value.format(&Rfc3339)?)
}

/// Parses a stored timestamp.
pub(crate) fn parse_timestamp(value: &str) -> Result<OffsetDateTime, PersistenceError> {
    Ok(OffsetDateTime::parse(value, &Rfc3339)?)
}

/// Parses a stored enum value using its `FromStr` implementation.
pub(crate) fn parse_stored<T>(value: &str) -> Result<T, PersistenceError>
where
    T: std::str::FromStr<Err = zordon_hub_domain::DomainError>,
{
    value
        .parse::<T>()
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}
