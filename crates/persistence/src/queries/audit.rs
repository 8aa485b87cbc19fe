// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use zordon_hub_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};

use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Diesel Queryable struct for audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventRow {
    event_id: i64,
    ticket_id: Option<i64>,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
}

impl AuditEventRow {
    fn into_event(self) -> Result<AuditEvent, PersistenceError> {
        let actor_data: ActorData = serde_json::from_str(&self.actor_json)?;
        let cause_data: CauseData = serde_json::from_str(&self.cause_json)?;
        let action_data: ActionData = serde_json::from_str(&self.action_json)?;
        let before_data: StateSnapshotData = serde_json::from_str(&self.before_snapshot_json)?;
        let after_data: StateSnapshotData = serde_json::from_str(&self.after_snapshot_json)?;

        let mut event: AuditEvent = AuditEvent::new(
            Actor::new(actor_data.id, actor_data.actor_type),
            Cause::new(cause_data.id, cause_data.description),
            Action::new(action_data.name, action_data.details),
            StateSnapshot::new(before_data.data),
            StateSnapshot::new(after_data.data),
            self.ticket_id,
        );
        event.event_id = Some(self.event_id);
        Ok(event)
    }
}

/// Retrieves the audit timeline of a ticket, oldest first.
///
/// Events outlive their ticket, so this works for deleted tickets too.
///
/// # Errors
///
/// Returns an error if the query fails or a stored event cannot be deserialized.
pub fn get_ticket_timeline(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    audit_events::table
        .filter(audit_events::ticket_id.eq(ticket_id))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load::<AuditEventRow>(conn)?
        .into_iter()
        .map(AuditEventRow::into_event)
        .collect()
}

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns an error if the event is not found or cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let result = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first::<AuditEventRow>(conn);

    match result {
        Ok(row) => row.into_event(),
        Err(diesel::result::Error::NotFound) => Err(PersistenceError::NotFound(format!(
            "Audit event {event_id}"
        ))),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
