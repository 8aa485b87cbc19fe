// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::sla::MAX_DEADLINE_WINDOW_HOURS;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Ticket title is empty or invalid.
    InvalidTitle(String),
    /// Comment content is empty or too long.
    InvalidContent(String),
    /// Priority value is not one of the known priorities.
    InvalidPriority(String),
    /// Status value is not one of the six ticket statuses.
    InvalidStatus(String),
    /// Role value is not one of the known roles.
    InvalidRole(String),
    /// Department value is not one of the known team colors.
    InvalidDepartment(String),
    /// User name is empty or invalid.
    InvalidName(String),
    /// Email address is empty or malformed.
    InvalidEmail(String),
    /// Deadline lookahead window must be positive.
    InvalidDeadlineWindow {
        /// The rejected window, in hours.
        hours: i64,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle(msg) => write!(f, "Invalid title: {msg}"),
            Self::InvalidContent(msg) => write!(f, "Invalid content: {msg}"),
            Self::InvalidPriority(value) => write!(f, "Invalid priority: '{value}'"),
            Self::InvalidStatus(value) => write!(f, "Invalid status: '{value}'"),
            Self::InvalidRole(value) => write!(f, "Invalid role: '{value}'"),
            Self::InvalidDepartment(value) => write!(f, "Invalid department: '{value}'"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {msg}"),
            Self::InvalidDeadlineWindow { hours } => {
                write!(
                    f,
                    "Invalid deadline window: {hours}h. Must be between 1 and {MAX_DEADLINE_WINDOW_HOURS}"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
