// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Category applied to tickets created without one.
pub const DEFAULT_CATEGORY: &str = "GENERAL";

/// The role a user holds in the helpdesk.
///
/// Roles are domain data: they are stored on the user record and drive
/// every access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Reports issues and follows up on their own tickets.
    #[default]
    Ranger,
    /// Receives assignments and resolves tickets.
    Engineer,
    /// Full read, assign and delete authority plus workload oversight.
    Admin,
}

impl Role {
    /// Returns the persisted string representation of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ranger => "RANGER",
            Self::Engineer => "ENGINEER",
            Self::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RANGER" => Ok(Self::Ranger),
            "ENGINEER" => Ok(Self::Engineer),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Team color a user belongs to. Cosmetic, used for grouping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Pink,
    Black,
}

impl Department {
    /// Returns the persisted string representation of this department.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Blue => "BLUE",
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Pink => "PINK",
            Self::Black => "BLACK",
        }
    }
}

impl FromStr for Department {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RED" => Ok(Self::Red),
            "BLUE" => Ok(Self::Blue),
            "GREEN" => Ok(Self::Green),
            "YELLOW" => Ok(Self::Yellow),
            "PINK" => Ok(Self::Pink),
            "BLACK" => Ok(Self::Black),
            _ => Err(DomainError::InvalidDepartment(s.to_string())),
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ticket priority. Determines the SLA resolution window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Returns the persisted string representation of this priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Returns the SLA resolution window for this priority, in hours.
    #[must_use]
    pub const fn sla_hours(&self) -> i64 {
        match self {
            Self::Critical => 4,
            Self::High => 8,
            Self::Medium => 24,
            Self::Low => 72,
        }
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(DomainError::InvalidPriority(s.to_string())),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ticket status.
///
/// OPEN, ASSIGNED, `IN_PROGRESS` and `PENDING_PARTS` are active;
/// RESOLVED and CLOSED are terminal. Terminal tickets may be reopened
/// into any active status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[default]
    Open,
    Assigned,
    InProgress,
    PendingParts,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// All six statuses in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Open,
        Self::Assigned,
        Self::InProgress,
        Self::PendingParts,
        Self::Resolved,
        Self::Closed,
    ];

    /// Statuses that count toward an engineer's workload.
    pub const ACTIVE: [Self; 4] = [
        Self::Open,
        Self::Assigned,
        Self::InProgress,
        Self::PendingParts,
    ];

    /// Returns the persisted string representation of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Assigned => "ASSIGNED",
            Self::InProgress => "IN_PROGRESS",
            Self::PendingParts => "PENDING_PARTS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }

    /// Returns true for RESOLVED and CLOSED.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    /// Returns true for every non-terminal status.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "ASSIGNED" => Ok(Self::Assigned),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "PENDING_PARTS" => Ok(Self::PendingParts),
            "RESOLVED" => Ok(Self::Resolved),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered user.
///
/// The password credential is deliberately absent: it never leaves the
/// persistence and authentication layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    /// Always stored lowercase.
    pub email: String,
    pub role: Role,
    pub department: Department,
    pub is_online: bool,
    /// Cached count of active assigned tickets. See the workload ledger.
    pub workload_score: i64,
    pub skills: Vec<String>,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Returns true if this user may be the assignee of a ticket.
    #[must_use]
    pub fn is_engineer(&self) -> bool {
        self.role == Role::Engineer
    }
}

/// A ticket that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub reporter_id: i64,
    pub due_date: OffsetDateTime,
    pub tags: Vec<String>,
    pub created_at: OffsetDateTime,
}

/// A persisted ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub ticket_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: Priority,
    pub status: TicketStatus,
    /// Set at creation, never changes.
    pub reporter_id: i64,
    pub assignee_id: Option<i64>,
    /// Fixed at creation from the priority's SLA window.
    pub due_date: Option<OffsetDateTime>,
    /// Flips false to true only.
    pub breached: bool,
    /// Guards against duplicate deadline reminders.
    pub deadline_notified: bool,
    pub tags: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Ticket {
    /// Returns true if this ticket currently counts toward `engineer_id`'s workload.
    #[must_use]
    pub fn counts_toward(&self, engineer_id: i64) -> bool {
        self.assignee_id == Some(engineer_id) && self.status.is_active()
    }

    /// Returns the real-time channel key for this ticket's room.
    #[must_use]
    pub fn channel_key(&self) -> String {
        format!("ticket_{}", self.ticket_id)
    }
}

/// A message in a ticket's discussion thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub comment_id: i64,
    pub ticket_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
