// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};
use zordon_hub_audit::Actor;
use zordon_hub_domain::{Comment, Department, Role, Ticket, TicketStatus, User};
use zordon_hub_persistence::{Persistence, PersistenceError, SessionData, UserCredentials};

use crate::error::AuthError;

/// An authenticated identity.
///
/// Resolved from a session before any handler runs. Handlers never see
/// credentials, only this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's id.
    pub id: i64,
    /// The role the user holds.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Normalized email.
    pub email: String,
    /// Team color.
    pub department: Department,
}

impl AuthenticatedActor {
    /// Builds an actor from a stored user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.user_id,
            role: user.role,
            name: user.name.clone(),
            email: user.email.clone(),
            department: user.department,
        }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::user(self.id, self.role)
    }

    /// Returns true if this actor holds the ADMIN role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    const fn is_assignee_of(&self, ticket: &Ticket) -> bool {
        matches!(ticket.assignee_id, Some(id) if id == self.id)
    }

    const fn is_reporter_of(&self, ticket: &Ticket) -> bool {
        ticket.reporter_id == self.id
    }
}

/// Authorization service for enforcing role-based access control.
///
/// Every check is a pure predicate over the actor and, where relevant, the
/// target ticket or comment. Existence is checked by callers before any of
/// these run, so a missing target reports as not found, not forbidden.
pub struct AuthorizationService;

impl AuthorizationService {
    fn deny(action: &str, required_role: &str) -> AuthError {
        warn!(action, "Authorization denied");
        AuthError::Unauthorized {
            action: String::from(action),
            required_role: String::from(required_role),
        }
    }

    fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(Self::deny(action, "ADMIN role"))
        }
    }

    /// Checks if an actor may file a ticket.
    ///
    /// Rangers and Admins may. Engineers may not.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is an Engineer.
    pub fn authorize_create_ticket(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Ranger => Ok(()),
            Role::Engineer => Err(Self::deny("create_ticket", "RANGER or ADMIN role")),
        }
    }

    /// Checks if an actor may list every ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_list_all_tickets(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "list_all_tickets")
    }

    /// Checks if an actor may list the tickets they reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is an Engineer.
    pub fn authorize_list_reported(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Ranger => Ok(()),
            Role::Engineer => Err(Self::deny("list_reported_tickets", "RANGER or ADMIN role")),
        }
    }

    /// Checks if an actor may list the tickets assigned to them.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a Ranger.
    pub fn authorize_list_assigned(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin | Role::Engineer => Ok(()),
            Role::Ranger => Err(Self::deny("list_assigned_tickets", "ENGINEER or ADMIN role")),
        }
    }

    /// Checks if an actor may read a ticket.
    ///
    /// Admins read everything, Engineers what they are assigned, Rangers
    /// what they reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has no relation to the ticket.
    pub fn authorize_read_ticket(
        actor: &AuthenticatedActor,
        ticket: &Ticket,
    ) -> Result<(), AuthError> {
        if Self::can_read_ticket(actor, ticket) {
            Ok(())
        } else {
            Err(Self::deny(
                "read_ticket",
                "ADMIN role, the assigned ENGINEER or the reporting RANGER",
            ))
        }
    }

    /// Checks if an actor may change a ticket's status.
    ///
    /// Admins may change any ticket. Engineers only the ones assigned to them.
    /// Rangers never.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not change this ticket's status.
    pub fn authorize_change_status(
        actor: &AuthenticatedActor,
        ticket: &Ticket,
    ) -> Result<(), AuthError> {
        if Self::can_change_status(actor, ticket) {
            Ok(())
        } else {
            Err(Self::deny(
                "change_status",
                "ADMIN role or the assigned ENGINEER",
            ))
        }
    }

    /// Checks if an actor may assign or reassign tickets.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_assign(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "assign_ticket")
    }

    /// Checks if an actor may delete a ticket.
    ///
    /// Admins may delete any ticket. A Ranger may delete their own ticket
    /// while it is still OPEN.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor may not delete this ticket.
    pub fn authorize_delete_ticket(
        actor: &AuthenticatedActor,
        ticket: &Ticket,
    ) -> Result<(), AuthError> {
        if Self::can_delete_ticket(actor, ticket) {
            Ok(())
        } else {
            Err(Self::deny(
                "delete_ticket",
                "ADMIN role, or the reporting RANGER while the ticket is OPEN",
            ))
        }
    }

    /// Checks if an actor may read a ticket's comments.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has no relation to the ticket.
    pub fn authorize_read_comments(
        actor: &AuthenticatedActor,
        ticket: &Ticket,
    ) -> Result<(), AuthError> {
        if Self::can_read_ticket(actor, ticket) {
            Ok(())
        } else {
            Err(Self::deny(
                "read_comments",
                "ADMIN role, the assigned ENGINEER or the reporting RANGER",
            ))
        }
    }

    /// Checks if an actor may post a comment on a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has no relation to the ticket.
    pub fn authorize_post_comment(
        actor: &AuthenticatedActor,
        ticket: &Ticket,
    ) -> Result<(), AuthError> {
        if Self::can_read_ticket(actor, ticket) {
            Ok(())
        } else {
            Err(Self::deny(
                "post_comment",
                "ADMIN role, the assigned ENGINEER or the reporting RANGER",
            ))
        }
    }

    /// Checks if an actor may edit a comment. Only its author may, whatever
    /// their role.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor did not write the comment.
    pub fn authorize_edit_comment(
        actor: &AuthenticatedActor,
        comment: &Comment,
    ) -> Result<(), AuthError> {
        if comment.author_id == actor.id {
            Ok(())
        } else {
            Err(Self::deny("edit_comment", "the comment's author"))
        }
    }

    /// Checks if an actor may delete a comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is neither the author nor an Admin.
    pub fn authorize_delete_comment(
        actor: &AuthenticatedActor,
        comment: &Comment,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || comment.author_id == actor.id {
            Ok(())
        } else {
            Err(Self::deny(
                "delete_comment",
                "ADMIN role or the comment's author",
            ))
        }
    }

    /// Checks if an actor may trigger the deadline reminder sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_deadline_sweep(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "notify_deadlines")
    }

    /// Checks if an actor may run the workload reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_sync_workloads(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "sync_workloads")
    }

    /// Checks if an actor may view or override engineer and user records.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_manage_users(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "manage_users")
    }

    /// Checks if an actor may view the dashboard aggregates.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_dashboard(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "dashboard_stats")
    }

    /// Checks if an actor may read a ticket's audit timeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_audit_timeline(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "audit_timeline")
    }

    pub(crate) fn can_read_ticket(actor: &AuthenticatedActor, ticket: &Ticket) -> bool {
        match actor.role {
            Role::Admin => true,
            Role::Engineer => actor.is_assignee_of(ticket),
            Role::Ranger => actor.is_reporter_of(ticket),
        }
    }

    pub(crate) fn can_change_status(actor: &AuthenticatedActor, ticket: &Ticket) -> bool {
        match actor.role {
            Role::Admin => true,
            Role::Engineer => actor.is_assignee_of(ticket),
            Role::Ranger => false,
        }
    }

    pub(crate) fn can_delete_ticket(actor: &AuthenticatedActor, ticket: &Ticket) -> bool {
        match actor.role {
            Role::Admin => true,
            Role::Engineer => false,
            Role::Ranger => actor.is_reporter_of(ticket) && ticket.status == TicketStatus::Open,
        }
    }
}

/// Authentication service for session-based authentication.
///
/// Passwords are bcrypt hashes held by persistence. Sessions are opaque
/// random tokens with a stored expiry.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Default session lifetime.
    pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::days(7);

    /// Authenticates a user by email and password and opens a session.
    ///
    /// Any sessions the user already holds are revoked first. The user is
    /// marked online.
    ///
    /// # Returns
    ///
    /// A tuple of (`session`, `authenticated_actor`, `user`)
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong or a session cannot be
    /// stored. The message does not reveal which part was wrong.
    pub fn login(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
        session_lifetime: Duration,
    ) -> Result<(SessionData, AuthenticatedActor, User), AuthError> {
        let credentials: UserCredentials = persistence
            .get_credentials_by_email(email)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(Self::invalid_credentials)?;

        let valid: bool = persistence
            .verify_password(password, &credentials.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !valid {
            warn!(user_id = credentials.user.user_id, "Password mismatch on login");
            return Err(Self::invalid_credentials());
        }

        let user: User = credentials.user;
        persistence
            .delete_sessions_for_user(user.user_id)
            .map_err(Self::map_persistence_error)?;
        let session: SessionData = Self::open_session(persistence, user.user_id, session_lifetime)?;
        persistence
            .set_user_online(user.user_id, true)
            .map_err(Self::map_persistence_error)?;
        let user: User = User {
            is_online: true,
            ..user
        };

        info!(user_id = user.user_id, role = %user.role, "User logged in");
        Ok((session, AuthenticatedActor::from_user(&user), user))
    }

    /// Opens a fresh session for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be stored.
    pub fn open_session(
        persistence: &mut Persistence,
        user_id: i64,
        session_lifetime: Duration,
    ) -> Result<SessionData, AuthError> {
        let session_token: String = Self::generate_session_token();
        let expires_at: OffsetDateTime = OffsetDateTime::now_utc() + session_lifetime;

        persistence
            .create_session(&session_token, user_id, expires_at)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to create session: {e}"),
            })?;

        persistence
            .get_session(&session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Session not found after creation"),
            })
    }

    /// Swaps a valid session token for a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the old session is invalid or expired.
    pub fn refresh(
        persistence: &mut Persistence,
        session_token: &str,
        session_lifetime: Duration,
    ) -> Result<(SessionData, AuthenticatedActor, User), AuthError> {
        let (actor, user): (AuthenticatedActor, User) =
            Self::validate_session(persistence, session_token)?;

        persistence
            .delete_session(session_token)
            .map_err(Self::map_persistence_error)?;
        let session: SessionData = Self::open_session(persistence, user.user_id, session_lifetime)?;

        debug!(user_id = user.user_id, "Session refreshed");
        Ok((session, actor, user))
    }

    /// Validates a session token and returns the authenticated actor.
    ///
    /// # Returns
    ///
    /// A tuple of (`authenticated_actor`, `user`)
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or its user
    /// no longer exists.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, User), AuthError> {
        let session: SessionData = persistence
            .get_session(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        if OffsetDateTime::now_utc() > session.expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: User = persistence
            .get_user(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        Ok((AuthenticatedActor::from_user(&user), user))
    }

    /// Logs out by deleting the session and marking its owner offline.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout fails.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), AuthError> {
        let session: Option<SessionData> = persistence
            .get_session(session_token)
            .map_err(Self::map_persistence_error)?;
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })?;

        if let Some(session) = session {
            persistence
                .set_user_online(session.user_id, false)
                .map_err(Self::map_persistence_error)?;
            info!(user_id = session.user_id, "User logged out");
        }

        Ok(())
    }

    /// Generates an opaque session token.
    fn generate_session_token() -> String {
        let timestamp: i128 = OffsetDateTime::now_utc().unix_timestamp_nanos();
        format!("session_{timestamp}_{}", rand::random::<u64>())
    }

    fn invalid_credentials() -> AuthError {
        AuthError::AuthenticationFailed {
            reason: String::from("Invalid email or password"),
        }
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
