// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for Zordon Hub.
//!
//! Users, sessions, tickets, comments and the audit trail are stored in
//! `SQLite` through Diesel. Migrations are embedded and run on open.
//!
//! ## Consistency
//!
//! - Ticket transitions commit the ticket write, the workload
//!   adjustments and the audit event in one transaction.
//! - Workload adjustments are SQL-side increments, never
//!   read-modify-write.
//! - Breach marking only matches rows still unflagged, so repeating it
//!   is harmless.
//!
//! ## Testing
//!
//! `new_in_memory()` hands every caller its own shared in-memory
//! database and a minimal bcrypt cost so tests stay fast.

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

use diesel::{Connection, SqliteConnection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tracing::info;
use zordon_hub::{
    CreateResult, TransitionResult, WorkloadCorrection, reconcile_workloads,
};
use zordon_hub_audit::AuditEvent;
use zordon_hub_domain::{Comment, Role, Ticket, User};

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// bcrypt cost for in-memory databases, the lowest the algorithm accepts.
const IN_MEMORY_HASH_COST: u32 = 4;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    CommentAuthor, CommentWithAuthor, DashboardStats, EngineerWorkload, NewUserData,
    SessionData, TicketFilter, UserCredentials,
};
pub use error::PersistenceError;

use backend::PersistenceBackend;

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
    password_hash_cost: u32,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn,
            password_hash_cost: IN_MEMORY_HASH_COST,
        })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn,
            password_hash_cost: bcrypt::DEFAULT_COST,
        })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Registers a user and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` if the email is taken, or a database error.
    pub fn create_user(&mut self, data: &NewUserData) -> Result<User, PersistenceError> {
        let cost: u32 = self.password_hash_cost;
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let user_id: i64 = self.conn.transaction::<_, PersistenceError, _>(|conn| {
            mutations::users::create_user(conn, data, cost, now)
        })?;
        self.get_user(user_id)?
            .ok_or(PersistenceError::UserNotFound(user_id))
    }

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_user(&mut self, user_id: i64) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// Retrieves a user and password hash by email, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_credentials_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<UserCredentials>, PersistenceError> {
        queries::users::get_credentials_by_email(&mut self.conn, email)
    }

    /// Verifies a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if password verification fails.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        queries::users::verify_password(password, password_hash)
    }

    /// Lists all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_users(&mut self) -> Result<Vec<User>, PersistenceError> {
        queries::users::list_users(&mut self.conn)
    }

    /// Counts registered users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn)
    }

    /// Lists engineers with a workload computed from tickets, lightest
    /// load first, then by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_engineer_workloads(&mut self) -> Result<Vec<EngineerWorkload>, PersistenceError> {
        let engineers: Vec<User> =
            queries::users::list_users_with_role(&mut self.conn, Role::Engineer)?;
        let counts: HashMap<i64, i64> = queries::tickets::count_active_by_assignee(&mut self.conn)?;

        let mut workloads: Vec<EngineerWorkload> = engineers
            .into_iter()
            .map(|engineer| EngineerWorkload {
                live_workload: counts.get(&engineer.user_id).copied().unwrap_or(0),
                engineer,
            })
            .collect();
        workloads.sort_by(|a, b| {
            a.live_workload
                .cmp(&b.live_workload)
                .then_with(|| a.engineer.name.cmp(&b.engineer.name))
        });
        Ok(workloads)
    }

    /// Sets a user's online flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub fn set_user_online(&mut self, user_id: i64, is_online: bool) -> Result<(), PersistenceError> {
        mutations::users::set_online(&mut self.conn, user_id, is_online)
    }

    /// Administrative override of an engineer's cached workload and/or
    /// online flag. Returns the updated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or an update fails.
    pub fn override_engineer(
        &mut self,
        user_id: i64,
        workload_score: Option<i64>,
        is_online: Option<bool>,
    ) -> Result<User, PersistenceError> {
        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            if let Some(score) = workload_score {
                mutations::users::set_workload_score(conn, user_id, score)?;
            }
            if let Some(online) = is_online {
                mutations::users::set_online(conn, user_id, online)?;
            }
            Ok(())
        })?;
        info!(user_id, ?workload_score, ?is_online, "Engineer overridden");
        self.get_user(user_id)?
            .ok_or(PersistenceError::UserNotFound(user_id))
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Creates a session for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_session(
            &mut self.conn,
            session_token,
            user_id,
            OffsetDateTime::now_utc(),
            expires_at,
        )
    }

    /// Retrieves a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_session(&mut self, session_token: &str) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_token(&mut self.conn, session_token)
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::users::delete_session(&mut self.conn, session_token)
    }

    /// Deletes every session a user holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_sessions_for_user(&mut self, user_id: i64) -> Result<usize, PersistenceError> {
        mutations::users::delete_sessions_for_user(&mut self.conn, user_id)
    }

    /// Deletes all expired sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or delete fails.
    pub fn delete_expired_sessions(&mut self) -> Result<usize, PersistenceError> {
        mutations::users::delete_expired_sessions(&mut self.conn, OffsetDateTime::now_utc())
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Persists a newly created ticket with its audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (for example an unknown reporter).
    pub fn create_ticket(&mut self, result: &CreateResult) -> Result<Ticket, PersistenceError> {
        let now: OffsetDateTime = result.new_ticket.created_at;
        let ticket_id: i64 = self.conn.transaction::<_, PersistenceError, _>(|conn| {
            let ticket_id: i64 = mutations::tickets::insert_ticket(conn, &result.new_ticket)?;
            let event: AuditEvent = result.audit_event.clone().for_ticket(ticket_id);
            mutations::audit::persist_audit_event(conn, &event, now)?;
            Ok(ticket_id)
        })?;
        self.get_ticket(ticket_id)?
            .ok_or(PersistenceError::TicketNotFound(ticket_id))
    }

    /// Retrieves a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_ticket(&mut self, ticket_id: i64) -> Result<Option<Ticket>, PersistenceError> {
        queries::tickets::get_ticket(&mut self.conn, ticket_id)
    }

    /// Lists tickets matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_tickets(&mut self, filter: TicketFilter) -> Result<Vec<Ticket>, PersistenceError> {
        queries::tickets::list_tickets(&mut self.conn, filter)
    }

    /// Persists a lifecycle transition atomically.
    ///
    /// # Returns
    ///
    /// The ID of the stored audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket is gone or any write fails. Nothing is
    /// written in that case.
    pub fn persist_transition(&mut self, result: &TransitionResult) -> Result<i64, PersistenceError> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            mutations::tickets::apply_transition(conn, result, now)
        })
    }

    /// Flags tickets as breached in one batch. Idempotent.
    ///
    /// # Returns
    ///
    /// The ids this call actually flipped.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub fn mark_breached(&mut self, ticket_ids: &[i64]) -> Result<Vec<i64>, PersistenceError> {
        if ticket_ids.is_empty() {
            return Ok(Vec::new());
        }
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        self.conn.transaction::<_, PersistenceError, _>(|conn| {
            mutations::tickets::mark_breached(conn, ticket_ids, now)
        })
    }

    /// Lists active tickets not yet flagged as breached.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_unbreached_active(&mut self) -> Result<Vec<Ticket>, PersistenceError> {
        queries::tickets::list_unbreached_active(&mut self.conn)
    }

    /// Lists active, assigned tickets that have not had a deadline reminder.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_deadline_pool(&mut self) -> Result<Vec<Ticket>, PersistenceError> {
        queries::tickets::list_deadline_pool(&mut self.conn)
    }

    /// Records that a deadline reminder went out for a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_deadline_notified(&mut self, ticket_id: i64) -> Result<(), PersistenceError> {
        mutations::tickets::mark_deadline_notified(&mut self.conn, ticket_id)
    }

    // ========================================================================
    // Workload ledger
    // ========================================================================

    /// Counts active assigned tickets per engineer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_active_assignments(&mut self) -> Result<HashMap<i64, i64>, PersistenceError> {
        queries::tickets::count_active_by_assignee(&mut self.conn)
    }

    /// Recomputes every engineer's workload from tickets, overwriting the
    /// cache. Returns the engineers whose cached value was wrong, with the
    /// value it had before.
    ///
    /// Running it twice in a row returns nothing the second time.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or update fails. Nothing is written then.
    pub fn sync_workloads(&mut self) -> Result<Vec<WorkloadCorrection>, PersistenceError> {
        let corrections: Vec<WorkloadCorrection> =
            self.conn.transaction::<_, PersistenceError, _>(|conn| {
                let engineers: Vec<User> =
                    queries::users::list_users_with_role(conn, Role::Engineer)?;
                let counts: HashMap<i64, i64> = queries::tickets::count_active_by_assignee(conn)?;
                let corrections: Vec<WorkloadCorrection> = reconcile_workloads(&engineers, &counts);
                for correction in &corrections {
                    mutations::users::set_workload_score(
                        conn,
                        correction.engineer_id,
                        correction.new_score,
                    )?;
                }
                Ok(corrections)
            })?;

        info!(corrections = corrections.len(), "Workload sync complete");
        Ok(corrections)
    }

    /// Computes the admin dashboard aggregates.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails.
    pub fn dashboard_stats(&mut self) -> Result<DashboardStats, PersistenceError> {
        queries::stats::get_dashboard_stats(&mut self.conn)
    }

    // ========================================================================
    // Comments
    // ========================================================================

    /// Stores a comment and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_comment(
        &mut self,
        ticket_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<Comment, PersistenceError> {
        let comment_id: i64 = mutations::comments::insert_comment(
            &mut self.conn,
            ticket_id,
            author_id,
            content,
            OffsetDateTime::now_utc(),
        )?;
        self.get_comment(comment_id)?
            .ok_or(PersistenceError::CommentNotFound(comment_id))
    }

    /// Retrieves a comment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_comment(&mut self, comment_id: i64) -> Result<Option<Comment>, PersistenceError> {
        queries::comments::get_comment(&mut self.conn, comment_id)
    }

    /// Retrieves one comment with its author projection.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_comment_with_author(
        &mut self,
        comment_id: i64,
    ) -> Result<Option<CommentWithAuthor>, PersistenceError> {
        queries::comments::get_comment_with_author(&mut self.conn, comment_id)
    }

    /// Lists a ticket's comments oldest first with author projections.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_comments(
        &mut self,
        ticket_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, PersistenceError> {
        queries::comments::list_comments_for_ticket(&mut self.conn, ticket_id)
    }

    /// Replaces a comment's content and returns the updated comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment does not exist or the update fails.
    pub fn update_comment(
        &mut self,
        comment_id: i64,
        content: &str,
    ) -> Result<Comment, PersistenceError> {
        mutations::comments::update_comment(
            &mut self.conn,
            comment_id,
            content,
            OffsetDateTime::now_utc(),
        )?;
        self.get_comment(comment_id)?
            .ok_or(PersistenceError::CommentNotFound(comment_id))
    }

    /// Deletes a comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment does not exist or the delete fails.
    pub fn delete_comment(&mut self, comment_id: i64) -> Result<(), PersistenceError> {
        mutations::comments::delete_comment(&mut self.conn, comment_id)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Retrieves a ticket's audit timeline, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or an event cannot be deserialized.
    pub fn get_ticket_timeline(&mut self, ticket_id: i64) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::get_ticket_timeline(&mut self.conn, ticket_id)
    }

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }
}
