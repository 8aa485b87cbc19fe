// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket lifecycle engine for Zordon Hub.
//!
//! Commands are applied to a ticket as pure transitions. A transition
//! returns the new ticket, the workload adjustments it implies, the
//! notifications to send and one audit event. Nothing here touches
//! storage, and the clock is always passed in.

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

mod apply;
mod command;
mod error;
mod state;
mod sweep;
mod workload;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply, apply_create};
pub use command::{Command, TicketDraft};
pub use error::CoreError;
pub use state::{
    CreateResult, NotificationKind, NotificationRequest, TransitionResult, WorkloadAdjustment,
    ticket_snapshot,
};
pub use sweep::{
    breach_audit_event, is_deadline_candidate, select_deadline_candidates,
    select_newly_breached,
};
pub use workload::{
    WorkloadCorrection, adjusted_score, count_active_assignments, reconcile_workloads,
};
