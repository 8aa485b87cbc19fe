// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ticket queries.

use std::collections::HashMap;

use diesel::SqliteConnection;
use diesel::dsl::count_star;
use diesel::prelude::*;
use tracing::debug;
use zordon_hub_domain::{Ticket, TicketStatus};

use crate::data_models::{TicketFilter, parse_stored, parse_timestamp};
use crate::diesel_schema::tickets;
use crate::error::PersistenceError;

/// Diesel Queryable struct for ticket rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = tickets)]
pub(crate) struct TicketRow {
    ticket_id: i64,
    title: String,
    description: Option<String>,
    category: String,
    priority: String,
    status: String,
    reporter_id: i64,
    assignee_id: Option<i64>,
    due_date: Option<String>,
    breached: i32,
    deadline_notified: i32,
    tags_json: String,
    created_at: String,
    updated_at: String,
}

impl TicketRow {
    pub(crate) fn into_ticket(self) -> Result<Ticket, PersistenceError> {
        Ok(Ticket {
            ticket_id: self.ticket_id,
            title: self.title,
            description: self.description,
            category: self.category,
            priority: parse_stored(&self.priority)?,
            status: parse_stored(&self.status)?,
            reporter_id: self.reporter_id,
            assignee_id: self.assignee_id,
            due_date: self.due_date.as_deref().map(parse_timestamp).transpose()?,
            breached: self.breached != 0,
            deadline_notified: self.deadline_notified != 0,
            tags: serde_json::from_str(&self.tags_json)?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// The stored names of every active status.
pub(crate) fn active_status_names() -> Vec<&'static str> {
    TicketStatus::ACTIVE.iter().map(TicketStatus::as_str).collect()
}

/// Retrieves a ticket by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the ticket is not found.
pub fn get_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Option<Ticket>, PersistenceError> {
    debug!(ticket_id, "Looking up ticket");

    let result: Result<TicketRow, diesel::result::Error> = tickets::table
        .filter(tickets::ticket_id.eq(ticket_id))
        .select(TicketRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into_ticket()?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists tickets matching `filter`, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tickets(
    conn: &mut SqliteConnection,
    filter: TicketFilter,
) -> Result<Vec<Ticket>, PersistenceError> {
    debug!(?filter, "Listing tickets");

    let mut query = tickets::table.select(TicketRow::as_select()).into_boxed();
    query = match filter {
        TicketFilter::All => query,
        TicketFilter::ReportedBy(user_id) => query.filter(tickets::reporter_id.eq(user_id)),
        TicketFilter::AssignedTo(user_id) => query.filter(tickets::assignee_id.eq(user_id)),
    };

    query
        .order(tickets::ticket_id.desc())
        .load::<TicketRow>(conn)?
        .into_iter()
        .map(TicketRow::into_ticket)
        .collect()
}

/// Lists active tickets not yet flagged as breached.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_unbreached_active(conn: &mut SqliteConnection) -> Result<Vec<Ticket>, PersistenceError> {
    tickets::table
        .filter(tickets::status.eq_any(active_status_names()))
        .filter(tickets::breached.eq(0))
        .order(tickets::ticket_id.asc())
        .select(TicketRow::as_select())
        .load::<TicketRow>(conn)?
        .into_iter()
        .map(TicketRow::into_ticket)
        .collect()
}

/// Lists the tickets a deadline sweep has to look at: active, assigned
/// and not yet reminded.
///
/// The due-date window itself is applied by the caller.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_deadline_pool(conn: &mut SqliteConnection) -> Result<Vec<Ticket>, PersistenceError> {
    tickets::table
        .filter(tickets::status.eq_any(active_status_names()))
        .filter(tickets::assignee_id.is_not_null())
        .filter(tickets::deadline_notified.eq(0))
        .order(tickets::ticket_id.asc())
        .select(TicketRow::as_select())
        .load::<TicketRow>(conn)?
        .into_iter()
        .map(TicketRow::into_ticket)
        .collect()
}

/// Counts active assigned tickets per assignee.
///
/// This is the authoritative workload the cached scores reconcile to.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_active_by_assignee(
    conn: &mut SqliteConnection,
) -> Result<HashMap<i64, i64>, PersistenceError> {
    let rows: Vec<(Option<i64>, i64)> = tickets::table
        .filter(tickets::status.eq_any(active_status_names()))
        .filter(tickets::assignee_id.is_not_null())
        .group_by(tickets::assignee_id)
        .select((tickets::assignee_id, count_star()))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .filter_map(|(assignee_id, count)| assignee_id.map(|id| (id, count)))
        .collect())
}
