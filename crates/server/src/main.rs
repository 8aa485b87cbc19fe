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
#![allow(clippy::multiple_crate_versions)]

mod live;
mod mailer;
mod session;


use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{error, info};
use zordon_hub_api::{
    ApiError, AssignTicketRequest, AssignTicketResponse, AuditEventInfo, AuthResponse,
    AuthenticatedActor, CommentDeletedInfo, CommentInfo, CommentRequest, CreateTicketRequest,
    DashboardStatsResponse, DeadlineSweepRequest, DeadlineSweepResponse, EngineerInfo,
    LoginRequest, Mailer, SignupRequest, TicketDeletedResponse, TicketInfo, TicketScope,
    UpdateEngineerRequest, UpdateStatusRequest, UserInfo, WorkloadSyncResponse,
};
use zordon_hub_audit::Cause;
use zordon_hub_persistence::Persistence;

use crate::live::{TicketRooms, live_rooms_handler};
use crate::mailer::TracingMailer;
use crate::session::{BearerToken, SessionUser};

/// Zordon Hub - helpdesk server with SLA tracking and workload balancing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "ZORDON_DATABASE")]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, env = "ZORDON_PORT", default_value_t = 8000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, env = "ZORDON_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// How long a session stays valid, in days
    #[arg(long, env = "ZORDON_SESSION_DAYS", default_value_t = 7)]
    session_days: i64,

    /// Email of an administrator account to create at startup if missing
    #[arg(long, env = "ZORDON_ADMIN_EMAIL", requires = "admin_password")]
    admin_email: Option<String>,

    /// Password for the bootstrap administrator account
    #[arg(long, env = "ZORDON_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer, one connection behind an async mutex.
    persistence: Arc<Mutex<Persistence>>,
    /// Real-time comment rooms.
    rooms: Arc<TicketRooms>,
    /// Outbound mail transport.
    mailer: Arc<dyn Mailer>,
    /// Lifetime of newly opened sessions.
    session_lifetime: Duration,
}

impl FromRef<AppState> for Arc<TicketRooms> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.rooms)
    }
}

/// Uniform success body.
#[derive(Debug, Serialize)]
struct Envelope<T> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

type ApiJson<T> = Json<Envelope<T>>;

fn envelope<T: Serialize>(message: &str, data: T) -> ApiJson<T> {
    Json(Envelope {
        success: true,
        message: String::from(message),
        data: Some(data),
    })
}

fn empty_envelope(message: &str) -> ApiJson<()> {
    Json(Envelope {
        success: true,
        message: String::from(message),
        data: None,
    })
}

/// Uniform error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    /// Stable machine-readable error kind.
    kind: &'static str,
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The stable error kind.
    kind: &'static str,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorBody> = Json(ErrorBody {
            success: false,
            kind: self.kind,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } | ApiError::InvalidAssignee { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidTransition { .. } | ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Builds the audit cause for a request.
fn request_cause(action: &str, actor: &AuthenticatedActor) -> Cause {
    Cause::new(
        format!(
            "api-{action}-{}",
            OffsetDateTime::now_utc().unix_timestamp_nanos()
        ),
        format!("{action} requested by user {} via API", actor.id),
    )
}

// ============================================================================
// Identity
// ============================================================================

/// Handler for POST `/user/signup`.
async fn handle_signup(
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, ApiJson<AuthResponse>), HttpError> {
    info!("Handling signup request");

    let mut persistence = app_state.persistence.lock().await;
    let response: AuthResponse =
        zordon_hub_api::signup(&mut persistence, &request, app_state.session_lifetime)?;
    drop(persistence);

    Ok((StatusCode::CREATED, envelope("Account created", response)))
}

/// Handler for POST `/user/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<ApiJson<AuthResponse>, HttpError> {
    info!("Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: AuthResponse =
        zordon_hub_api::login(&mut persistence, &request, app_state.session_lifetime)?;
    drop(persistence);

    Ok(envelope("Logged in", response))
}

/// Handler for POST `/user/refresh`.
async fn handle_refresh(
    AxumState(app_state): AxumState<AppState>,
    BearerToken(token): BearerToken,
) -> Result<ApiJson<AuthResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AuthResponse =
        zordon_hub_api::refresh(&mut persistence, &token, app_state.session_lifetime)?;
    drop(persistence);

    Ok(envelope("Session refreshed", response))
}

/// Handler for POST `/user/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, token): SessionUser,
) -> Result<ApiJson<()>, HttpError> {
    info!(user_id = actor.id, "Handling logout request");

    let mut persistence = app_state.persistence.lock().await;
    zordon_hub_api::logout(&mut persistence, &token)?;
    drop(persistence);

    Ok(empty_envelope("Logged out"))
}

/// Handler for GET `/user/me`.
async fn handle_me(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<ApiJson<UserInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let user: UserInfo = zordon_hub_api::whoami(&mut persistence, &actor)?;
    drop(persistence);

    Ok(envelope("Current user", user))
}

// ============================================================================
// Administration
// ============================================================================

/// Handler for GET `/user/engineers`.
async fn handle_list_engineers(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<ApiJson<Vec<EngineerInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let engineers: Vec<EngineerInfo> = zordon_hub_api::list_engineers(&mut persistence, &actor)?;
    drop(persistence);

    Ok(envelope("Engineers", engineers))
}

/// Handler for PATCH `/user/engineers/{id}`.
async fn handle_update_engineer(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(user_id): Path<i64>,
    Json(request): Json<UpdateEngineerRequest>,
) -> Result<ApiJson<UserInfo>, HttpError> {
    info!(user_id, actor_id = actor.id, "Handling update_engineer request");

    let mut persistence = app_state.persistence.lock().await;
    let user: UserInfo =
        zordon_hub_api::update_engineer(&mut persistence, &actor, user_id, &request)?;
    drop(persistence);

    Ok(envelope("Engineer updated", user))
}

/// Handler for GET `/user/users`.
async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<ApiJson<Vec<UserInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let users: Vec<UserInfo> = zordon_hub_api::list_users(&mut persistence, &actor)?;
    drop(persistence);

    Ok(envelope("Users", users))
}

/// Handler for GET `/user/dashboard-stats`.
async fn handle_dashboard_stats(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<ApiJson<DashboardStatsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let stats: DashboardStatsResponse = zordon_hub_api::dashboard_stats(&mut persistence, &actor)?;
    drop(persistence);

    Ok(envelope("Dashboard statistics", stats))
}

/// Handler for POST `/user/sync-workloads`.
async fn handle_sync_workloads(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<ApiJson<WorkloadSyncResponse>, HttpError> {
    info!(actor_id = actor.id, "Handling sync_workloads request");

    let mut persistence = app_state.persistence.lock().await;
    let response: WorkloadSyncResponse = zordon_hub_api::sync_workloads(&mut persistence, &actor)?;
    drop(persistence);

    let message: String = format!("{} workload(s) corrected", response.corrections.len());
    Ok(envelope(&message, response))
}

// ============================================================================
// Tickets
// ============================================================================

/// Handler for POST `/tickets`.
async fn handle_create_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Json(request): Json<CreateTicketRequest>,
) -> Result<(StatusCode, ApiJson<TicketInfo>), HttpError> {
    info!(actor_id = actor.id, "Handling create_ticket request");

    let cause: Cause = request_cause("create_ticket", &actor);
    let mut persistence = app_state.persistence.lock().await;
    let ticket: TicketInfo =
        zordon_hub_api::create_ticket(&mut persistence, &actor, &request, cause)?;
    drop(persistence);

    Ok((StatusCode::CREATED, envelope("Ticket created", ticket)))
}

async fn list_scope(
    app_state: &AppState,
    actor: &AuthenticatedActor,
    scope: TicketScope,
) -> Result<ApiJson<Vec<TicketInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let tickets: Vec<TicketInfo> = zordon_hub_api::list_tickets(&mut persistence, actor, scope)?;
    drop(persistence);

    Ok(envelope("Tickets", tickets))
}

/// Handler for GET `/tickets`.
async fn handle_list_tickets(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<ApiJson<Vec<TicketInfo>>, HttpError> {
    list_scope(&app_state, &actor, TicketScope::All).await
}

/// Handler for GET `/tickets/my-tickets`.
async fn handle_my_tickets(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<ApiJson<Vec<TicketInfo>>, HttpError> {
    list_scope(&app_state, &actor, TicketScope::Reported).await
}

/// Handler for GET `/tickets/assigned`.
async fn handle_assigned_tickets(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<ApiJson<Vec<TicketInfo>>, HttpError> {
    list_scope(&app_state, &actor, TicketScope::Assigned).await
}

/// Handler for GET `/tickets/{id}`.
async fn handle_get_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(ticket_id): Path<i64>,
) -> Result<ApiJson<TicketInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let ticket: TicketInfo = zordon_hub_api::get_ticket(&mut persistence, &actor, ticket_id)?;
    drop(persistence);

    Ok(envelope("Ticket", ticket))
}

/// Handler for PATCH `/tickets/{id}/status`.
async fn handle_update_status(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(ticket_id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<ApiJson<TicketInfo>, HttpError> {
    info!(ticket_id, actor_id = actor.id, "Handling update_status request");

    let cause: Cause = request_cause("update_status", &actor);
    let mut persistence = app_state.persistence.lock().await;
    let ticket: TicketInfo =
        zordon_hub_api::update_status(&mut persistence, &actor, ticket_id, &request, cause)?;
    drop(persistence);

    Ok(envelope("Status updated", ticket))
}

/// Handler for PATCH `/tickets/{id}/assign`.
async fn handle_assign_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(ticket_id): Path<i64>,
    Json(request): Json<AssignTicketRequest>,
) -> Result<ApiJson<AssignTicketResponse>, HttpError> {
    info!(ticket_id, actor_id = actor.id, "Handling assign_ticket request");

    let cause: Cause = request_cause("assign_ticket", &actor);
    let mut persistence = app_state.persistence.lock().await;
    let response: AssignTicketResponse = zordon_hub_api::assign_ticket(
        &mut persistence,
        app_state.mailer.as_ref(),
        &actor,
        ticket_id,
        &request,
        cause,
    )?;
    drop(persistence);

    Ok(envelope("Ticket assigned", response))
}

/// Handler for DELETE `/tickets/{id}`.
async fn handle_delete_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(ticket_id): Path<i64>,
) -> Result<ApiJson<TicketDeletedResponse>, HttpError> {
    info!(ticket_id, actor_id = actor.id, "Handling delete_ticket request");

    let cause: Cause = request_cause("delete_ticket", &actor);
    let mut persistence = app_state.persistence.lock().await;
    let response: TicketDeletedResponse =
        zordon_hub_api::delete_ticket(&mut persistence, &actor, ticket_id, cause)?;
    drop(persistence);

    Ok(envelope("Ticket deleted", response))
}

/// Handler for POST `/tickets/notify-deadlines`.
///
/// Takes the window from a JSON body `{"hours": n}` or from `?hours=`. The
/// body wins when both are given.
async fn handle_notify_deadlines(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Query(query): Query<DeadlineSweepRequest>,
    body: Option<Json<DeadlineSweepRequest>>,
) -> Result<ApiJson<DeadlineSweepResponse>, HttpError> {
    let request: DeadlineSweepRequest = DeadlineSweepRequest {
        hours: body.and_then(|Json(body)| body.hours).or(query.hours),
    };
    info!(actor_id = actor.id, hours = ?request.hours, "Handling notify_deadlines request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DeadlineSweepResponse = zordon_hub_api::notify_deadlines(
        &mut persistence,
        app_state.mailer.as_ref(),
        &actor,
        &request,
    )?;
    drop(persistence);

    let message: String = format!(
        "Sent {} of {} deadline reminder(s)",
        response.sent, response.candidates
    );
    Ok(envelope(&message, response))
}

/// Handler for GET `/tickets/{id}/audit`.
async fn handle_ticket_audit(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(ticket_id): Path<i64>,
) -> Result<ApiJson<Vec<AuditEventInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let events: Vec<AuditEventInfo> =
        zordon_hub_api::ticket_audit_timeline(&mut persistence, &actor, ticket_id)?;
    drop(persistence);

    Ok(envelope("Audit timeline", events))
}

/// Handler for GET `/audit/events/{event_id}`.
async fn handle_get_audit_event(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(event_id): Path<i64>,
) -> Result<ApiJson<AuditEventInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let event: AuditEventInfo = zordon_hub_api::get_audit_event(&mut persistence, &actor, event_id)?;
    drop(persistence);

    Ok(envelope("Audit event", event))
}

// ============================================================================
// Comments
// ============================================================================

/// Handler for GET `/tickets/{id}/comments`.
async fn handle_list_comments(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(ticket_id): Path<i64>,
) -> Result<ApiJson<Vec<CommentInfo>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let comments: Vec<CommentInfo> =
        zordon_hub_api::list_comments(&mut persistence, &actor, ticket_id)?;
    drop(persistence);

    Ok(envelope("Comments", comments))
}

/// Handler for POST `/tickets/{id}/comments`.
async fn handle_create_comment(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(ticket_id): Path<i64>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, ApiJson<CommentInfo>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let comment: CommentInfo = zordon_hub_api::create_comment(
        &mut persistence,
        app_state.rooms.as_ref(),
        &actor,
        ticket_id,
        &request.content,
    )?;
    drop(persistence);

    Ok((StatusCode::CREATED, envelope("Comment posted", comment)))
}

/// Handler for PATCH `/comments/{id}`.
async fn handle_edit_comment(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(comment_id): Path<i64>,
    Json(request): Json<CommentRequest>,
) -> Result<ApiJson<CommentInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let comment: CommentInfo = zordon_hub_api::edit_comment(
        &mut persistence,
        app_state.rooms.as_ref(),
        &actor,
        comment_id,
        &request.content,
    )?;
    drop(persistence);

    Ok(envelope("Comment updated", comment))
}

/// Handler for DELETE `/comments/{id}`.
async fn handle_delete_comment(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(comment_id): Path<i64>,
) -> Result<ApiJson<CommentDeletedInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let deleted: CommentDeletedInfo = zordon_hub_api::delete_comment(
        &mut persistence,
        app_state.rooms.as_ref(),
        &actor,
        comment_id,
    )?;
    drop(persistence);

    Ok(envelope("Comment deleted", deleted))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    let api: Router<AppState> = Router::new()
        .route("/user/signup", post(handle_signup))
        .route("/user/login", post(handle_login))
        .route("/user/refresh", post(handle_refresh))
        .route("/user/logout", post(handle_logout))
        .route("/user/me", get(handle_me))
        .route("/user/engineers", get(handle_list_engineers))
        .route("/user/engineers/{id}", patch(handle_update_engineer))
        .route("/user/users", get(handle_list_users))
        .route("/user/dashboard-stats", get(handle_dashboard_stats))
        .route("/user/sync-workloads", post(handle_sync_workloads))
        .route(
            "/tickets",
            post(handle_create_ticket).get(handle_list_tickets),
        )
        .route("/tickets/my-tickets", get(handle_my_tickets))
        .route("/tickets/assigned", get(handle_assigned_tickets))
        .route("/tickets/notify-deadlines", post(handle_notify_deadlines))
        .route(
            "/tickets/{id}",
            get(handle_get_ticket).delete(handle_delete_ticket),
        )
        .route("/tickets/{id}/status", patch(handle_update_status))
        .route("/tickets/{id}/assign", patch(handle_assign_ticket))
        .route("/tickets/{id}/audit", get(handle_ticket_audit))
        .route("/audit/events/{event_id}", get(handle_get_audit_event))
        .route(
            "/tickets/{id}/comments",
            get(handle_list_comments).post(handle_create_comment),
        )
        .route(
            "/comments/{id}",
            patch(handle_edit_comment).delete(handle_delete_comment),
        )
        .route("/ws", get(live_rooms_handler));

    Router::new()
        .nest("/api/v1", api)
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Zordon Hub");

    if args.session_days <= 0 {
        return Err("--session-days must be positive".into());
    }

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let expired: usize = persistence.delete_expired_sessions()?;
    if expired > 0 {
        info!(expired, "Removed expired sessions");
    }

    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        match zordon_hub_api::bootstrap_admin(&mut persistence, email, password) {
            Ok(admin) => info!(user_id = admin.user_id, "Administrator account ready"),
            Err(e) => {
                error!(error = %e, "Failed to prepare administrator account");
                return Err(e.into());
            }
        }
    }

    let user_count: i64 = persistence.count_users()?;
    info!(user_count, "Database ready");

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        rooms: Arc::new(TicketRooms::new()),
        mailer: Arc::new(TracingMailer::new()),
        session_lifetime: Duration::days(args.session_days),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
