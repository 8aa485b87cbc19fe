// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handlers.
//!
//! Each handler resolves its targets, checks the access policy, validates
//! input and only then mutates. Transport concerns live in the server.

use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};
use zordon_hub::{
    Command, CreateResult, TicketDraft, TransitionResult, WorkloadCorrection, apply, apply_create,
    select_newly_breached,
};
use zordon_hub_audit::{AuditEvent, Cause};
use zordon_hub_domain::{
    Department, Priority, Role, Ticket, TicketStatus, User, normalize_email, validate_user_name,
};
use zordon_hub_persistence::{
    DashboardStats, EngineerWorkload, NewUserData, Persistence, PersistenceError, SessionData,
    TicketFilter,
};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
use crate::capabilities::compute_ticket_capabilities;
use crate::error::{ApiError, translate_core_error, translate_domain_error};
use crate::notify::{Mailer, dispatch_notifications, run_deadline_sweep};
use crate::request_response::{
    AssignTicketRequest, AssignTicketResponse, AuditEventInfo, AuthResponse, CreateTicketRequest,
    DashboardStatsResponse, DeadlineSweepRequest, DeadlineSweepResponse, DepartmentCount,
    EngineerInfo, LoginRequest, NotificationResult, PriorityCount, SignupRequest,
    TicketDeletedResponse, TicketInfo, UpdateEngineerRequest, UpdateStatusRequest, UserInfo,
    WorkloadCorrectionInfo, WorkloadSyncResponse, format_timestamp,
};

/// Which ticket listing a caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
    /// Every ticket.
    All,
    /// Tickets the caller reported.
    Reported,
    /// Tickets assigned to the caller.
    Assigned,
}

fn auth_response(session: SessionData, user: &User) -> AuthResponse {
    AuthResponse {
        session_token: session.session_token,
        expires_at: format_timestamp(session.expires_at),
        user: UserInfo::from(user),
    }
}

fn ticket_info(actor: &AuthenticatedActor, ticket: &Ticket, now: OffsetDateTime) -> TicketInfo {
    TicketInfo::new(ticket, compute_ticket_capabilities(actor, ticket), now)
}

fn load_ticket(persistence: &mut Persistence, ticket_id: i64) -> Result<Ticket, ApiError> {
    persistence
        .get_ticket(ticket_id)?
        .ok_or_else(|| ApiError::ticket_not_found(ticket_id))
}

fn load_user(persistence: &mut Persistence, user_id: i64) -> Result<User, ApiError> {
    persistence
        .get_user(user_id)?
        .ok_or_else(|| ApiError::user_not_found(user_id))
}

fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = zordon_hub_domain::DomainError>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::parse::<T>)
        .transpose()
        .map_err(translate_domain_error)
}

// ============================================================================
// Identity
// ============================================================================

/// Registers an account and opens its first session.
///
/// Self-service signup may ask for ENGINEER. Any other requested role,
/// ADMIN included, yields RANGER.
///
/// # Errors
///
/// Returns an error if:
/// - The name, email, password or department is invalid
/// - The email is already registered
/// - The session cannot be opened
pub fn signup(
    persistence: &mut Persistence,
    request: &SignupRequest,
    session_lifetime: Duration,
) -> Result<AuthResponse, ApiError> {
    let name: String = validate_user_name(&request.name).map_err(translate_domain_error)?;
    let email: String = normalize_email(&request.email).map_err(translate_domain_error)?;
    if request.password.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("password"),
            message: String::from("Password must not be empty"),
        });
    }

    let role: Role = match parse_optional::<Role>(request.role.as_deref()) {
        Ok(Some(Role::Engineer)) => Role::Engineer,
        _ => Role::Ranger,
    };
    let department: Department =
        parse_optional::<Department>(request.department.as_deref())?.unwrap_or_default();

    let user: User = persistence.create_user(&NewUserData {
        name,
        email,
        password: request.password.clone(),
        role,
        department,
        skills: request.skills.clone(),
    })?;
    info!(user_id = user.user_id, role = %user.role, "User signed up");

    let session: SessionData =
        AuthenticationService::open_session(persistence, user.user_id, session_lifetime)?;
    Ok(auth_response(session, &user))
}

/// Logs in with email and password.
///
/// # Errors
///
/// Returns an error if the credentials are wrong.
pub fn login(
    persistence: &mut Persistence,
    request: &LoginRequest,
    session_lifetime: Duration,
) -> Result<AuthResponse, ApiError> {
    let (session, _actor, user): (SessionData, AuthenticatedActor, User) =
        AuthenticationService::login(
            persistence,
            &request.email,
            &request.password,
            session_lifetime,
        )?;
    Ok(auth_response(session, &user))
}

/// Exchanges a valid session token for a fresh one.
///
/// # Errors
///
/// Returns an error if the token is unknown or expired.
pub fn refresh(
    persistence: &mut Persistence,
    session_token: &str,
    session_lifetime: Duration,
) -> Result<AuthResponse, ApiError> {
    let (session, _actor, user): (SessionData, AuthenticatedActor, User) =
        AuthenticationService::refresh(persistence, session_token, session_lifetime)?;
    Ok(auth_response(session, &user))
}

/// Ends a session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, session_token)?;
    Ok(())
}

/// Returns the current user's record.
///
/// # Errors
///
/// Returns an error if the user no longer exists.
pub fn whoami(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<UserInfo, ApiError> {
    let user: User = load_user(persistence, actor.id)?;
    Ok(UserInfo::from(&user))
}

/// Ensures an ADMIN account exists for `email`.
///
/// This is the only way an ADMIN comes to exist. An existing account with
/// that email is left as it is.
///
/// # Errors
///
/// Returns an error if the email is invalid or the account cannot be created.
pub fn bootstrap_admin(
    persistence: &mut Persistence,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let email: String = normalize_email(email).map_err(translate_domain_error)?;
    if let Some(existing) = persistence.get_credentials_by_email(&email)? {
        if existing.user.role != Role::Admin {
            warn!(
                user_id = existing.user.user_id,
                role = %existing.user.role,
                "Bootstrap admin email belongs to a non-admin account"
            );
        }
        return Ok(existing.user);
    }

    if password.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("password"),
            message: String::from("Password must not be empty"),
        });
    }

    let user: User = persistence.create_user(&NewUserData {
        name: String::from("Zordon"),
        email,
        password: String::from(password),
        role: Role::Admin,
        department: Department::default(),
        skills: Vec::new(),
    })?;
    info!(user_id = user.user_id, "Bootstrap admin created");
    Ok(user)
}

// ============================================================================
// Tickets
// ============================================================================

/// Flags every active ticket whose due date has passed.
///
/// Runs on each ticket read path. Already flagged tickets are skipped, so
/// repeating it writes nothing.
///
/// # Errors
///
/// Returns an error if the query or the update fails.
pub fn refresh_breaches(
    persistence: &mut Persistence,
    now: OffsetDateTime,
) -> Result<Vec<i64>, ApiError> {
    let candidates: Vec<Ticket> = persistence.list_unbreached_active()?;
    let newly_breached: Vec<i64> = select_newly_breached(&candidates, now);
    Ok(persistence.mark_breached(&newly_breached)?)
}

/// Files a new ticket.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is an Engineer
/// - The title is empty or the priority unknown
/// - The ticket cannot be stored
pub fn create_ticket(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &CreateTicketRequest,
    cause: Cause,
) -> Result<TicketInfo, ApiError> {
    AuthorizationService::authorize_create_ticket(actor)?;

    let draft: TicketDraft = TicketDraft {
        title: request.title.clone(),
        description: request.description.clone(),
        category: request.category.clone(),
        priority: parse_optional::<Priority>(request.priority.as_deref())?,
        tags: request.tags.clone(),
    };

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let result: CreateResult =
        apply_create(actor.id, draft, actor.to_audit_actor(), cause, now)
            .map_err(translate_core_error)?;
    let ticket: Ticket = persistence.create_ticket(&result)?;

    info!(
        ticket_id = ticket.ticket_id,
        reporter_id = actor.id,
        priority = %ticket.priority,
        "Ticket created"
    );
    Ok(ticket_info(actor, &ticket, now))
}

/// Lists tickets for one of the three views.
///
/// # Errors
///
/// Returns an error if the actor may not use that view or the query fails.
pub fn list_tickets(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    scope: TicketScope,
) -> Result<Vec<TicketInfo>, ApiError> {
    let filter: TicketFilter = match scope {
        TicketScope::All => {
            AuthorizationService::authorize_list_all_tickets(actor)?;
            TicketFilter::All
        }
        TicketScope::Reported => {
            AuthorizationService::authorize_list_reported(actor)?;
            TicketFilter::ReportedBy(actor.id)
        }
        TicketScope::Assigned => {
            AuthorizationService::authorize_list_assigned(actor)?;
            TicketFilter::AssignedTo(actor.id)
        }
    };

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    refresh_breaches(persistence, now)?;
    let tickets: Vec<Ticket> = persistence.list_tickets(filter)?;
    debug!(?scope, count = tickets.len(), "Listed tickets");

    Ok(tickets
        .iter()
        .map(|ticket| ticket_info(actor, ticket, now))
        .collect())
}

/// Reads one ticket.
///
/// # Errors
///
/// Returns an error if the ticket does not exist or the actor may not read it.
pub fn get_ticket(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    ticket_id: i64,
) -> Result<TicketInfo, ApiError> {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    refresh_breaches(persistence, now)?;

    let ticket: Ticket = load_ticket(persistence, ticket_id)?;
    AuthorizationService::authorize_read_ticket(actor, &ticket)?;
    Ok(ticket_info(actor, &ticket, now))
}

/// Moves a ticket to a new status.
///
/// # Errors
///
/// Returns an error if:
/// - The ticket does not exist
/// - The actor may not change this ticket's status
/// - The status is unknown, or ASSIGNED is requested with no assignee
pub fn update_status(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    ticket_id: i64,
    request: &UpdateStatusRequest,
    cause: Cause,
) -> Result<TicketInfo, ApiError> {
    let ticket: Ticket = load_ticket(persistence, ticket_id)?;
    AuthorizationService::authorize_change_status(actor, &ticket)?;
    let status: TicketStatus = request.status.parse().map_err(translate_domain_error)?;

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let result: TransitionResult = apply(
        &ticket,
        Command::SetStatus { status },
        actor.to_audit_actor(),
        cause,
        now,
    )
    .map_err(translate_core_error)?;
    persistence.persist_transition(&result)?;

    info!(
        ticket_id,
        from = %ticket.status,
        to = %status,
        actor_id = actor.id,
        "Ticket status changed"
    );
    let updated: Ticket = load_ticket(persistence, ticket_id)?;
    Ok(ticket_info(actor, &updated, now))
}

/// Assigns or reassigns a ticket and notifies the assignee and reporter.
///
/// Notification failures are reported in the response and never undo the
/// assignment.
///
/// # Errors
///
/// Returns an error if:
/// - The ticket or the assignee does not exist
/// - The actor is not an Admin
/// - The assignee is not an Engineer
pub fn assign_ticket(
    persistence: &mut Persistence,
    mailer: &dyn Mailer,
    actor: &AuthenticatedActor,
    ticket_id: i64,
    request: &AssignTicketRequest,
    cause: Cause,
) -> Result<AssignTicketResponse, ApiError> {
    let ticket: Ticket = load_ticket(persistence, ticket_id)?;
    AuthorizationService::authorize_assign(actor)?;
    let assignee: User = load_user(persistence, request.assignee_id)?;

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let result: TransitionResult = apply(
        &ticket,
        Command::AssignTicket { assignee },
        actor.to_audit_actor(),
        cause,
        now,
    )
    .map_err(translate_core_error)?;
    persistence.persist_transition(&result)?;

    info!(
        ticket_id,
        assignee_id = request.assignee_id,
        previous_assignee = ?ticket.assignee_id,
        "Ticket assigned"
    );

    let notifications: Vec<NotificationResult> =
        dispatch_notifications(persistence, mailer, &result.notifications, now);
    let updated: Ticket = load_ticket(persistence, ticket_id)?;

    Ok(AssignTicketResponse {
        ticket: ticket_info(actor, &updated, now),
        notifications,
    })
}

/// Deletes a ticket. Its comments and audit history remain.
///
/// # Errors
///
/// Returns an error if the ticket does not exist or the actor may not delete it.
pub fn delete_ticket(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    ticket_id: i64,
    cause: Cause,
) -> Result<TicketDeletedResponse, ApiError> {
    let ticket: Ticket = load_ticket(persistence, ticket_id)?;
    AuthorizationService::authorize_delete_ticket(actor, &ticket)?;

    let result: TransitionResult = apply(
        &ticket,
        Command::DeleteTicket,
        actor.to_audit_actor(),
        cause,
        OffsetDateTime::now_utc(),
    )
    .map_err(translate_core_error)?;
    let event_id: i64 = persistence.persist_transition(&result)?;

    info!(ticket_id, actor_id = actor.id, "Ticket deleted");
    Ok(TicketDeletedResponse {
        ticket_id,
        event_id,
    })
}

/// Runs the deadline reminder sweep.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the window is invalid.
pub fn notify_deadlines(
    persistence: &mut Persistence,
    mailer: &dyn Mailer,
    actor: &AuthenticatedActor,
    request: &DeadlineSweepRequest,
) -> Result<DeadlineSweepResponse, ApiError> {
    AuthorizationService::authorize_deadline_sweep(actor)?;
    run_deadline_sweep(
        persistence,
        mailer,
        request.hours,
        OffsetDateTime::now_utc(),
    )
}

/// Returns a ticket's audit history, oldest first.
///
/// Deleted tickets keep their history, so the ticket need not exist.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the query fails.
pub fn ticket_audit_timeline(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    ticket_id: i64,
) -> Result<Vec<AuditEventInfo>, ApiError> {
    AuthorizationService::authorize_audit_timeline(actor)?;
    let events: Vec<AuditEvent> = persistence.get_ticket_timeline(ticket_id)?;
    Ok(events.iter().map(AuditEventInfo::from).collect())
}

/// Returns a single audit event by id.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the event does not exist.
pub fn get_audit_event(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    event_id: i64,
) -> Result<AuditEventInfo, ApiError> {
    AuthorizationService::authorize_audit_timeline(actor)?;
    let event: AuditEvent = persistence
        .get_audit_event(event_id)
        .map_err(|e| match e {
            PersistenceError::NotFound(_) => ApiError::ResourceNotFound {
                resource_type: String::from("AuditEvent"),
                message: format!("Audit event {event_id} does not exist"),
            },
            other => ApiError::from(other),
        })?;
    Ok(AuditEventInfo::from(&event))
}

// ============================================================================
// Administration
// ============================================================================

/// Recomputes every engineer's cached workload from their tickets.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the update fails.
pub fn sync_workloads(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<WorkloadSyncResponse, ApiError> {
    AuthorizationService::authorize_sync_workloads(actor)?;
    let corrections: Vec<WorkloadCorrection> = persistence.sync_workloads()?;
    Ok(WorkloadSyncResponse {
        corrections: corrections.iter().map(WorkloadCorrectionInfo::from).collect(),
    })
}

/// Lists engineers, lightest live workload first.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the query fails.
pub fn list_engineers(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Vec<EngineerInfo>, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;
    let engineers: Vec<EngineerWorkload> = persistence.list_engineer_workloads()?;
    Ok(engineers.iter().map(EngineerInfo::from).collect())
}

/// Lists every user, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the query fails.
pub fn list_users(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<Vec<UserInfo>, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;
    let users: Vec<User> = persistence.list_users()?;
    Ok(users.iter().map(UserInfo::from).collect())
}

/// Overrides an engineer's cached workload and/or online flag.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The user does not exist or is not an Engineer
/// - The workload score is negative
pub fn update_engineer(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    user_id: i64,
    request: &UpdateEngineerRequest,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::authorize_manage_users(actor)?;
    let target: User = load_user(persistence, user_id)?;
    if !target.is_engineer() {
        return Err(ApiError::InvalidInput {
            field: String::from("user_id"),
            message: format!("User {user_id} is not an engineer"),
        });
    }
    if let Some(score) = request.workload_score
        && score < 0
    {
        return Err(ApiError::InvalidInput {
            field: String::from("workload_score"),
            message: String::from("Workload score must not be negative"),
        });
    }

    let updated: User =
        persistence.override_engineer(user_id, request.workload_score, request.is_online)?;
    Ok(UserInfo::from(&updated))
}

/// Returns the dashboard aggregates.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the query fails.
pub fn dashboard_stats(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
) -> Result<DashboardStatsResponse, ApiError> {
    AuthorizationService::authorize_dashboard(actor)?;
    refresh_breaches(persistence, OffsetDateTime::now_utc())?;
    let stats: DashboardStats = persistence.dashboard_stats()?;

    Ok(DashboardStatsResponse {
        total_users: stats.total_users,
        total_engineers: stats.total_engineers,
        online_engineers: stats.online_engineers,
        total_tickets: stats.total_tickets,
        open_tickets: stats.open_tickets,
        assigned_tickets: stats.assigned_tickets,
        in_progress_tickets: stats.in_progress_tickets,
        pending_parts_tickets: stats.pending_parts_tickets,
        resolved_tickets: stats.resolved_tickets,
        critical_active_tickets: stats.critical_active_tickets,
        breached_tickets: stats.breached_tickets,
        active_by_priority: stats
            .active_by_priority
            .iter()
            .map(|&(priority, count)| PriorityCount { priority, count })
            .collect(),
        tickets_by_department: stats
            .tickets_by_department
            .iter()
            .map(|&(department, count)| DepartmentCount { department, count })
            .collect(),
    })
}
