// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for Zordon Hub.
//!
//! Handlers here own the order every request follows: resolve the target,
//! check the access policy, validate input, mutate through the core and
//! persistence layers, then run side effects. Side effects (mail, room
//! broadcasts) go through the injected [`Mailer`] and [`Broadcaster`]
//! traits and never undo a committed mutation.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod capabilities;
mod comments;
mod error;
mod handlers;
mod notify;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use capabilities::compute_ticket_capabilities;
pub use comments::{
    Broadcaster, CommentEvent, create_comment, delete_comment, edit_comment, list_comments,
    ticket_channel,
};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    TicketScope, assign_ticket, bootstrap_admin, create_ticket, dashboard_stats, delete_ticket,
    get_audit_event, get_ticket, list_engineers, list_tickets, list_users, login, logout, notify_deadlines,
    refresh, refresh_breaches, signup, sync_workloads, ticket_audit_timeline, update_engineer,
    update_status, whoami,
};
pub use notify::{
    MailError, MailReceipt, Mailer, OutgoingMail, compose_mail, dispatch_notifications,
    run_deadline_sweep,
};
pub use request_response::{
    AssignTicketRequest, AssignTicketResponse, AuditEventInfo, AuthResponse, Capability,
    CommentAuthorInfo, CommentDeletedInfo, CommentInfo, CommentRequest, CreateTicketRequest,
    DashboardStatsResponse, DeadlineSweepRequest, DeadlineSweepResponse, DepartmentCount,
    EngineerInfo, LoginRequest, NotificationResult, PriorityCount, SignupRequest,
    TicketCapabilities, TicketDeletedResponse, TicketInfo, UpdateEngineerRequest,
    UpdateStatusRequest, UserInfo, WorkloadCorrectionInfo, WorkloadSyncResponse,
};
