// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket mutations.
//!
//! Every function here is meant to run inside the transaction opened by
//! the `Persistence` adapter so the ticket write, the workload
//! adjustments and the audit event commit together.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, info};
use zordon_hub::{TransitionResult, breach_audit_event};
use zordon_hub_domain::NewTicket;

use crate::backend::PersistenceBackend;
use crate::data_models::format_timestamp;
use crate::diesel_schema::tickets;
use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::mutations::users::adjust_workload;

/// Inserts a new ticket.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn insert_ticket(
    conn: &mut SqliteConnection,
    ticket: &NewTicket,
) -> Result<i64, PersistenceError> {
    let created_at: String = format_timestamp(ticket.created_at)?;

    diesel::insert_into(tickets::table)
        .values((
            tickets::title.eq(&ticket.title),
            tickets::description.eq(ticket.description.as_deref()),
            tickets::category.eq(&ticket.category),
            tickets::priority.eq(ticket.priority.as_str()),
            tickets::status.eq(ticket.status.as_str()),
            tickets::reporter_id.eq(ticket.reporter_id),
            tickets::due_date.eq(Some(format_timestamp(ticket.due_date)?)),
            tickets::tags_json.eq(serde_json::to_string(&ticket.tags)?),
            tickets::created_at.eq(&created_at),
            tickets::updated_at.eq(&created_at),
        ))
        .execute(conn)?;

    let ticket_id: i64 = conn.get_last_insert_rowid()?;
    info!(ticket_id, priority = %ticket.priority, "Ticket created");
    Ok(ticket_id)
}

/// Applies a transition: the ticket write, then each workload adjustment
/// as an atomic increment, then the audit event.
///
/// # Errors
///
/// Returns an error if the ticket no longer exists or any write fails.
pub fn apply_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let rows_affected: usize = match &result.new_ticket {
        Some(ticket) => diesel::update(tickets::table)
            .filter(tickets::ticket_id.eq(result.ticket_id))
            .set((
                tickets::status.eq(ticket.status.as_str()),
                tickets::assignee_id.eq(ticket.assignee_id),
                tickets::updated_at.eq(format_timestamp(ticket.updated_at)?),
            ))
            .execute(conn)?,
        None => diesel::delete(tickets::table)
            .filter(tickets::ticket_id.eq(result.ticket_id))
            .execute(conn)?,
    };

    if rows_affected == 0 {
        return Err(PersistenceError::TicketNotFound(result.ticket_id));
    }

    for adjustment in &result.workload_adjustments {
        adjust_workload(conn, adjustment.engineer_id, adjustment.delta)?;
    }

    let event_id: i64 = persist_audit_event(conn, &result.audit_event, now)?;
    info!(
        ticket_id = result.ticket_id,
        event_id,
        action = %result.audit_event.action.name,
        adjustments = result.workload_adjustments.len(),
        "Ticket transition persisted"
    );
    Ok(event_id)
}

/// Flags the given tickets as breached.
///
/// The update only matches rows still at `breached = 0`, so reapplying it
/// is a no-op. An audit event is recorded for each ticket actually flipped.
///
/// # Returns
///
/// The ids of the tickets this call flipped.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn mark_breached(
    conn: &mut SqliteConnection,
    ticket_ids: &[i64],
    now: OffsetDateTime,
) -> Result<Vec<i64>, PersistenceError> {
    let mut flipped: Vec<i64> = Vec::new();
    for &ticket_id in ticket_ids {
        let rows_affected: usize = diesel::update(tickets::table)
            .filter(tickets::ticket_id.eq(ticket_id))
            .filter(tickets::breached.eq(0))
            .set(tickets::breached.eq(1))
            .execute(conn)?;
        if rows_affected == 1 {
            persist_audit_event(conn, &breach_audit_event(ticket_id, now), now)?;
            flipped.push(ticket_id);
        }
    }

    if !flipped.is_empty() {
        info!(count = flipped.len(), "Marked tickets as breached");
    }
    Ok(flipped)
}

/// Records that a deadline reminder was sent for a ticket.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn mark_deadline_notified(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<(), PersistenceError> {
    debug!(ticket_id, "Marking deadline reminder as sent");

    diesel::update(tickets::table)
        .filter(tickets::ticket_id.eq(ticket_id))
        .set(tickets::deadline_notified.eq(1))
        .execute(conn)?;
    Ok(())
}
