// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User, workload and session mutations.

use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{NewUserData, format_timestamp, parse_timestamp};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

/// Creates a new user.
///
/// The email must already be normalized. The password is hashed with
/// bcrypt at `hash_cost` before it is stored.
///
/// # Errors
///
/// Returns an error if the email is taken, hashing fails or the insert fails.
pub fn create_user(
    conn: &mut SqliteConnection,
    data: &NewUserData,
    hash_cost: u32,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    info!(
        "Creating user with email: {}, role: {}",
        data.email, data.role
    );

    let existing: i64 = users::table
        .filter(users::email.eq(&data.email))
        .count()
        .get_result(conn)?;
    if existing > 0 {
        return Err(PersistenceError::DuplicateEmail(data.email.clone()));
    }

    let password_hash: String = bcrypt::hash(&data.password, hash_cost)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;
    let skills_json: String = serde_json::to_string(&data.skills)?;

    diesel::insert_into(users::table)
        .values((
            users::name.eq(&data.name),
            users::email.eq(&data.email),
            users::password_hash.eq(&password_hash),
            users::role.eq(data.role.as_str()),
            users::department.eq(data.department.as_str()),
            users::skills_json.eq(&skills_json),
            users::created_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;

    info!(user_id, "User created successfully");
    Ok(user_id)
}

/// Atomically applies `delta` to a user's cached workload score.
///
/// The arithmetic happens in SQL so concurrent adjustments against the
/// same engineer never lose an update. The score never goes below zero.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn adjust_workload(
    conn: &mut SqliteConnection,
    user_id: i64,
    delta: i64,
) -> Result<(), PersistenceError> {
    debug!(user_id, delta, "Adjusting workload score");

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(
            users::workload_score.eq(sql::<BigInt>("MAX(workload_score + ")
                .bind::<BigInt, _>(delta)
                .sql(", 0)")),
        )
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::UserNotFound(user_id));
    }
    Ok(())
}

/// Overwrites a user's cached workload score.
///
/// # Errors
///
/// Returns an error if the user does not exist or the update fails.
pub fn set_workload_score(
    conn: &mut SqliteConnection,
    user_id: i64,
    score: i64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::workload_score.eq(score.max(0)))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::UserNotFound(user_id));
    }
    Ok(())
}

/// Sets a user's online flag.
///
/// # Errors
///
/// Returns an error if the user does not exist or the update fails.
pub fn set_online(
    conn: &mut SqliteConnection,
    user_id: i64,
    is_online: bool,
) -> Result<(), PersistenceError> {
    debug!(user_id, is_online, "Updating online flag");

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::is_online.eq(i32::from(is_online)))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::UserNotFound(user_id));
    }
    Ok(())
}

/// Creates a new session for a user.
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut SqliteConnection,
    session_token: &str,
    user_id: i64,
    now: OffsetDateTime,
    expires_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    debug!(user_id, "Creating session");

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(format_timestamp(now)?),
            sessions::expires_at.eq(format_timestamp(expires_at)?),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;
    debug!(session_id, user_id, "Session created");
    Ok(session_id)
}

/// Deletes a session by token.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<(), PersistenceError> {
    debug!("Deleting session by token");

    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}

/// Deletes every session a user holds.
///
/// Login rotates credentials by calling this before issuing a new token.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_sessions_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<usize, PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::user_id.eq(user_id))
        .execute(conn)?;

    debug!(user_id, rows_affected, "Deleted sessions for user");
    Ok(rows_affected)
}

/// Deletes all sessions that expired before `now`.
///
/// # Errors
///
/// Returns an error if the query or delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let rows: Vec<(i64, String)> = sessions::table
        .select((sessions::session_id, sessions::expires_at))
        .load(conn)?;

    let mut expired: Vec<i64> = Vec::new();
    for (session_id, expires_at) in rows {
        if parse_timestamp(&expires_at)? <= now {
            expired.push(session_id);
        }
    }

    if expired.is_empty() {
        return Ok(0);
    }

    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::session_id.eq_any(&expired))
        .execute(conn)?;

    info!("Deleted {} expired sessions", rows_affected);
    Ok(rows_affected)
}
