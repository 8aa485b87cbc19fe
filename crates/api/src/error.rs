// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use tracing::error;
use zordon_hub::CoreError;
use zordon_hub_domain::DomainError;
use zordon_hub_persistence::PersistenceError;

/// Generic message shown in place of internal failure details.
const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Who may perform this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// Every variant maps to one stable kind string, see [`ApiError::kind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No valid identity was presented.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The identity is valid but may not perform the action.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Who may perform this action.
        required_role: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The chosen assignee cannot hold tickets.
    InvalidAssignee {
        /// A human-readable description of the error.
        message: String,
    },
    /// The requested status change is not allowed.
    InvalidTransition {
        /// A human-readable description of the error.
        message: String,
    },
    /// The request collides with existing data.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An external collaborator failed.
    Upstream {
        /// A human-readable description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A generic description; details are only logged.
        message: String,
    },
}

impl ApiError {
    /// The stable machine-readable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed { .. } => "unauthenticated",
            Self::Unauthorized { .. } => "forbidden",
            Self::InvalidInput { .. } => "invalid_input",
            Self::ResourceNotFound { .. } => "not_found",
            Self::InvalidAssignee { .. } => "invalid_assignee",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Conflict { .. } => "conflict",
            Self::Upstream { .. } => "upstream",
            Self::Internal { .. } => "internal",
        }
    }

    pub(crate) fn ticket_not_found(ticket_id: i64) -> Self {
        Self::ResourceNotFound {
            resource_type: String::from("Ticket"),
            message: format!("Ticket {ticket_id} does not exist"),
        }
    }

    pub(crate) fn comment_not_found(comment_id: i64) -> Self {
        Self::ResourceNotFound {
            resource_type: String::from("Comment"),
            message: format!("Comment {comment_id} does not exist"),
        }
    }

    pub(crate) fn user_not_found(user_id: i64) -> Self {
        Self::ResourceNotFound {
            resource_type: String::from("User"),
            message: format!("User {user_id} does not exist"),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InvalidAssignee { message } => write!(f, "Invalid assignee: {message}"),
            Self::InvalidTransition { message } => write!(f, "Invalid transition: {message}"),
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Upstream { message } => write!(f, "Upstream failure: {message}"),
            Self::Internal { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: &str = match &err {
        DomainError::InvalidTitle(_) => "title",
        DomainError::InvalidContent(_) => "content",
        DomainError::InvalidPriority(_) => "priority",
        DomainError::InvalidStatus(_) => "status",
        DomainError::InvalidRole(_) => "role",
        DomainError::InvalidDepartment(_) => "department",
        DomainError::InvalidName(_) => "name",
        DomainError::InvalidEmail(_) => "email",
        DomainError::InvalidDeadlineWindow { .. } => "hours",
    };
    ApiError::InvalidInput {
        field: String::from(field),
        message: err.to_string(),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::InvalidAssignee { .. } => ApiError::InvalidAssignee {
            message: err.to_string(),
        },
        CoreError::InvalidTransition { .. } => ApiError::InvalidTransition {
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Lookup failures keep their meaning. Everything else is logged and
/// reported as a generic internal error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::DuplicateEmail(email) => ApiError::Conflict {
            message: format!("Email '{email}' is already registered"),
        },
        PersistenceError::TicketNotFound(id) => ApiError::ticket_not_found(id),
        PersistenceError::CommentNotFound(id) => ApiError::comment_not_found(id),
        PersistenceError::UserNotFound(id) => ApiError::user_not_found(id),
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        other => {
            error!(error = %other, "Persistence failure");
            ApiError::Internal {
                message: String::from(INTERNAL_ERROR_MESSAGE),
            }
        }
    }
}
