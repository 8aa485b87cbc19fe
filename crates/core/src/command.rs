// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use zordon_hub_domain::{Priority, TicketStatus, User};

/// The caller-supplied fields of a ticket about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketDraft {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `GENERAL` when absent or blank.
    pub category: Option<String>,
    /// Defaults to MEDIUM when absent.
    pub priority: Option<Priority>,
    pub tags: Vec<String>,
}

/// A command represents user or system intent against an existing ticket.
///
/// Commands are the only way to request lifecycle changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Assign (or reassign) the ticket.
    AssignTicket {
        /// The resolved target user. Must hold the ENGINEER role.
        assignee: User,
    },
    /// Move the ticket to a new status.
    SetStatus {
        /// The requested status.
        status: TicketStatus,
    },
    /// Remove the ticket.
    DeleteTicket,
}

impl Command {
    /// Returns the audit action name for this command.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::AssignTicket { .. } => "AssignTicket",
            Self::SetStatus { .. } => "SetStatus",
            Self::DeleteTicket => "DeleteTicket",
        }
    }
}
