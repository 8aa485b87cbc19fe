// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use zordon_hub_domain::{DomainError, Role, TicketStatus};

/// Errors that can occur during ticket transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The requested assignee cannot hold tickets.
    InvalidAssignee {
        /// The rejected user.
        user_id: i64,
        /// The role that user actually holds.
        role: Role,
    },
    /// The requested status change is not allowed in the ticket's current shape.
    InvalidTransition {
        from: TicketStatus,
        to: TicketStatus,
        reason: String,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::InvalidAssignee { user_id, role } => write!(
                f,
                "User {user_id} has role {role} and cannot be assigned tickets. Only engineers can"
            ),
            Self::InvalidTransition { from, to, reason } => {
                write!(f, "Cannot move ticket from {from} to {to}: {reason}")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
