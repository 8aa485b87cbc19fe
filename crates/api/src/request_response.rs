// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Timestamps cross the boundary as RFC 3339 strings.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use zordon_hub::WorkloadCorrection;
use zordon_hub_audit::AuditEvent;
use zordon_hub_domain::{Department, Priority, Role, Ticket, TicketStatus, User, format_remaining};
use zordon_hub_persistence::{CommentWithAuthor, EngineerWorkload};

/// Formats a timestamp for a response body.
pub(crate) fn format_timestamp(value: OffsetDateTime) -> String {
    value
        .format(&Rfc3339)
        .unwrap_or_else(|_| value.unix_timestamp().to_string())
}

// ============================================================================
// Requests
// ============================================================================

/// API request to register a new account.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct SignupRequest {
    /// Display name.
    pub name: String,
    /// Email address, matched case-insensitively.
    pub email: String,
    /// Plain text password, hashed before storage.
    pub password: String,
    /// Requested role. ENGINEER is honored; anything else becomes RANGER.
    #[serde(default)]
    pub role: Option<String>,
    /// Team color, RED when absent.
    #[serde(default)]
    pub department: Option<String>,
    /// Free-form skills.
    #[serde(default)]
    pub skills: Vec<String>,
}

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plain text password.
    pub password: String,
}

/// API request to file a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize)]
pub struct CreateTicketRequest {
    /// Required title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Category, GENERAL when absent.
    #[serde(default)]
    pub category: Option<String>,
    /// Priority, MEDIUM when absent.
    #[serde(default)]
    pub priority: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// API request to change a ticket's status.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct UpdateStatusRequest {
    /// The target status.
    pub status: String,
}

/// API request to assign a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub struct AssignTicketRequest {
    /// The engineer to assign.
    pub assignee_id: i64,
}

/// API request to run the deadline reminder sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
pub struct DeadlineSweepRequest {
    /// Lookahead window in hours. 24 when absent.
    #[serde(default)]
    pub hours: Option<i64>,
}

/// API request to post or edit a comment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct CommentRequest {
    /// The comment text.
    pub content: String,
}

/// API request for an administrative engineer override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
pub struct UpdateEngineerRequest {
    /// New cached workload score.
    #[serde(default)]
    pub workload_score: Option<i64>,
    /// New online flag.
    #[serde(default)]
    pub is_online: Option<bool>,
}

// ============================================================================
// Capabilities
// ============================================================================

/// Represents whether a specific action is permitted.
///
/// This enum provides better type safety than raw booleans and serializes
/// to JSON as true/false for API compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl serde::Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> serde::Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let b = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(b))
    }
}

/// What the requesting identity may do with one ticket.
///
/// Advisory only. Every action is authorized again when it is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TicketCapabilities {
    /// Whether the identity can change the status.
    pub can_change_status: Capability,
    /// Whether the identity can assign or reassign.
    pub can_assign: Capability,
    /// Whether the identity can delete the ticket.
    pub can_delete: Capability,
    /// Whether the identity can read and post comments.
    pub can_comment: Capability,
}

// ============================================================================
// Responses
// ============================================================================

/// Public projection of a user. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Department,
    pub is_online: bool,
    pub workload_score: i64,
    pub skills: Vec<String>,
    pub created_at: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            department: user.department,
            is_online: user.is_online,
            workload_score: user.workload_score,
            skills: user.skills.clone(),
            created_at: format_timestamp(user.created_at),
        }
    }
}

/// API response for signup, login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuthResponse {
    /// Opaque bearer token.
    pub session_token: String,
    /// When the token stops being accepted.
    pub expires_at: String,
    /// The authenticated user.
    pub user: UserInfo,
}

/// A ticket as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TicketInfo {
    pub ticket_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub reporter_id: i64,
    pub assignee_id: Option<i64>,
    pub due_date: Option<String>,
    pub breached: bool,
    pub deadline_notified: bool,
    pub tags: Vec<String>,
    /// Human readable time left on the SLA, or how long it has been breached.
    pub sla_status: String,
    pub created_at: String,
    pub updated_at: String,
    /// What the requesting identity may do with this ticket.
    pub capabilities: TicketCapabilities,
}

impl TicketInfo {
    /// Builds the client view of a ticket.
    #[must_use]
    pub fn new(ticket: &Ticket, capabilities: TicketCapabilities, now: OffsetDateTime) -> Self {
        Self {
            ticket_id: ticket.ticket_id,
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            category: ticket.category.clone(),
            priority: ticket.priority,
            status: ticket.status,
            reporter_id: ticket.reporter_id,
            assignee_id: ticket.assignee_id,
            due_date: ticket.due_date.map(format_timestamp),
            breached: ticket.breached,
            deadline_notified: ticket.deadline_notified,
            tags: ticket.tags.clone(),
            sla_status: format_remaining(ticket.due_date, now),
            created_at: format_timestamp(ticket.created_at),
            updated_at: format_timestamp(ticket.updated_at),
            capabilities,
        }
    }
}

/// Result of sending one notification.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NotificationResult {
    /// The ticket the notification is about.
    pub ticket_id: i64,
    /// The intended recipient.
    pub recipient_id: i64,
    /// Whether the mail was accepted.
    pub success: bool,
    /// Upstream message id on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Failure description otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// API response for an assignment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssignTicketResponse {
    /// The ticket after assignment.
    pub ticket: TicketInfo,
    /// Per-recipient delivery results. Failures here do not undo the assignment.
    pub notifications: Vec<NotificationResult>,
}

/// API response for a ticket deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TicketDeletedResponse {
    /// The deleted ticket.
    pub ticket_id: i64,
    /// The audit event recording the deletion.
    pub event_id: i64,
}

/// API response for the deadline reminder sweep.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeadlineSweepResponse {
    /// The window that was applied, in hours.
    pub window_hours: i64,
    /// Number of tickets selected.
    pub candidates: usize,
    /// Number of reminders that went out.
    pub sent: usize,
    /// One entry per selected ticket, soonest due first.
    pub results: Vec<NotificationResult>,
}

/// Projection of a comment's author.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommentAuthorInfo {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub role: Role,
}

/// A comment as returned to clients and broadcast to rooms.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommentInfo {
    pub comment_id: i64,
    pub ticket_id: i64,
    pub content: String,
    pub author: CommentAuthorInfo,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&CommentWithAuthor> for CommentInfo {
    fn from(value: &CommentWithAuthor) -> Self {
        Self {
            comment_id: value.comment.comment_id,
            ticket_id: value.comment.ticket_id,
            content: value.comment.content.clone(),
            author: CommentAuthorInfo {
                user_id: value.author.user_id,
                name: value.author.name.clone(),
                email: value.author.email.clone(),
                department: value.author.department,
                role: value.author.role,
            },
            created_at: format_timestamp(value.comment.created_at),
            updated_at: format_timestamp(value.comment.updated_at),
        }
    }
}

/// Identifies a deleted comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommentDeletedInfo {
    pub comment_id: i64,
    pub ticket_id: i64,
}

/// An engineer with the workload computed from tickets.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EngineerInfo {
    #[serde(flatten)]
    pub user: UserInfo,
    /// Active assigned tickets right now.
    pub live_workload: i64,
}

impl From<&EngineerWorkload> for EngineerInfo {
    fn from(value: &EngineerWorkload) -> Self {
        Self {
            user: UserInfo::from(&value.engineer),
            live_workload: value.live_workload,
        }
    }
}

/// One engineer whose cached workload was corrected.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorkloadCorrectionInfo {
    pub engineer_id: i64,
    pub name: String,
    pub old_score: i64,
    pub new_score: i64,
}

impl From<&WorkloadCorrection> for WorkloadCorrectionInfo {
    fn from(value: &WorkloadCorrection) -> Self {
        Self {
            engineer_id: value.engineer_id,
            name: value.name.clone(),
            old_score: value.old_score,
            new_score: value.new_score,
        }
    }
}

/// API response for the workload reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WorkloadSyncResponse {
    /// Engineers whose cached score disagreed with their tickets.
    pub corrections: Vec<WorkloadCorrectionInfo>,
}

/// Count of active tickets at one priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: i64,
}

/// Count of tickets filed from one department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DepartmentCount {
    pub department: Department,
    pub count: i64,
}

/// API response for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DashboardStatsResponse {
    pub total_users: i64,
    pub total_engineers: i64,
    pub online_engineers: i64,
    pub total_tickets: i64,
    pub open_tickets: i64,
    pub assigned_tickets: i64,
    pub in_progress_tickets: i64,
    pub pending_parts_tickets: i64,
    pub resolved_tickets: i64,
    pub critical_active_tickets: i64,
    pub breached_tickets: i64,
    pub active_by_priority: Vec<PriorityCount>,
    pub tickets_by_department: Vec<DepartmentCount>,
}

/// Serializable representation of an `AuditEvent`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditEventInfo {
    pub event_id: Option<i64>,
    pub ticket_id: Option<i64>,
    pub actor_id: String,
    pub actor_type: String,
    pub cause_id: String,
    pub cause_description: String,
    pub action_name: String,
    pub action_details: Option<String>,
    pub before_snapshot: String,
    pub after_snapshot: String,
}

impl From<&AuditEvent> for AuditEventInfo {
    fn from(event: &AuditEvent) -> Self {
        Self {
            event_id: event.event_id,
            ticket_id: event.ticket_id,
            actor_id: event.actor.id.clone(),
            actor_type: event.actor.actor_type.clone(),
            cause_id: event.cause.id.clone(),
            cause_description: event.cause.description.clone(),
            action_name: event.action.name.clone(),
            action_details: event.action.details.clone(),
            before_snapshot: event.before.data.clone(),
            after_snapshot: event.after.data.clone(),
        }
    }
}
