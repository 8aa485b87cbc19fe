// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Aggregate queries for the admin dashboard.

use diesel::SqliteConnection;
use diesel::dsl::count_star;
use diesel::prelude::*;
use zordon_hub_domain::{Department, Priority, Role, TicketStatus};

use crate::data_models::{DashboardStats, parse_stored};
use crate::diesel_schema::{tickets, users};
use crate::error::PersistenceError;
use crate::queries::tickets::active_status_names;

fn count_tickets_in(
    conn: &mut SqliteConnection,
    statuses: &[TicketStatus],
) -> Result<i64, PersistenceError> {
    let names: Vec<&'static str> = statuses.iter().map(TicketStatus::as_str).collect();
    Ok(tickets::table
        .filter(tickets::status.eq_any(names))
        .count()
        .get_result(conn)?)
}

/// Computes the dashboard aggregates in one pass over the store.
///
/// # Errors
///
/// Returns an error if any query fails or a stored value cannot be parsed.
pub fn get_dashboard_stats(conn: &mut SqliteConnection) -> Result<DashboardStats, PersistenceError> {
    let total_users: i64 = users::table.count().get_result(conn)?;
    let total_engineers: i64 = users::table
        .filter(users::role.eq(Role::Engineer.as_str()))
        .count()
        .get_result(conn)?;
    let online_engineers: i64 = users::table
        .filter(users::role.eq(Role::Engineer.as_str()))
        .filter(users::is_online.eq(1))
        .count()
        .get_result(conn)?;

    let total_tickets: i64 = tickets::table.count().get_result(conn)?;
    let open_tickets: i64 = count_tickets_in(conn, &[TicketStatus::Open])?;
    let assigned_tickets: i64 = count_tickets_in(conn, &[TicketStatus::Assigned])?;
    let in_progress_tickets: i64 = count_tickets_in(conn, &[TicketStatus::InProgress])?;
    let pending_parts_tickets: i64 = count_tickets_in(conn, &[TicketStatus::PendingParts])?;
    let resolved_tickets: i64 =
        count_tickets_in(conn, &[TicketStatus::Resolved, TicketStatus::Closed])?;

    let critical_active_tickets: i64 = tickets::table
        .filter(tickets::status.eq_any(active_status_names()))
        .filter(tickets::priority.eq(Priority::Critical.as_str()))
        .count()
        .get_result(conn)?;
    let breached_tickets: i64 = tickets::table
        .filter(tickets::breached.eq(1))
        .count()
        .get_result(conn)?;

    let priority_rows: Vec<(String, i64)> = tickets::table
        .filter(tickets::status.eq_any(active_status_names()))
        .group_by(tickets::priority)
        .select((tickets::priority, count_star()))
        .load(conn)?;
    let mut active_by_priority: Vec<(Priority, i64)> =
        Priority::ALL.iter().map(|p| (*p, 0)).collect();
    for (priority, count) in priority_rows {
        let priority: Priority = parse_stored(&priority)?;
        if let Some(slot) = active_by_priority.iter_mut().find(|(p, _)| *p == priority) {
            slot.1 = count;
        }
    }

    let department_rows: Vec<(String, i64)> = tickets::table
        .inner_join(users::table.on(users::user_id.eq(tickets::reporter_id)))
        .group_by(users::department)
        .select((users::department, count_star()))
        .order(users::department.asc())
        .load(conn)?;
    let tickets_by_department: Vec<(Department, i64)> = department_rows
        .into_iter()
        .map(|(department, count)| Ok((parse_stored(&department)?, count)))
        .collect::<Result<_, PersistenceError>>()?;

    Ok(DashboardStats {
        total_users,
        total_engineers,
        online_engineers,
        total_tickets,
        open_tickets,
        assigned_tickets,
        in_progress_tickets,
        pending_parts_tickets,
        resolved_tickets,
        critical_active_tickets,
        breached_tickets,
        active_by_priority,
        tickets_by_department,
    })
}
