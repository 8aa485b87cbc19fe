// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use zordon_hub_domain::{Role, User};

use crate::data_models::{SessionData, UserCredentials, parse_stored, parse_timestamp};
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

/// Diesel Queryable struct for user rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub(crate) struct UserRow {
    user_id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    department: String,
    is_online: i32,
    workload_score: i64,
    skills_json: String,
    created_at: String,
}

impl UserRow {
    pub(crate) fn into_credentials(self) -> Result<UserCredentials, PersistenceError> {
        let user: User = User {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            role: parse_stored(&self.role)?,
            department: parse_stored(&self.department)?,
            is_online: self.is_online != 0,
            workload_score: self.workload_score,
            skills: serde_json::from_str(&self.skills_json)?,
            created_at: parse_timestamp(&self.created_at)?,
        };
        Ok(UserCredentials {
            user,
            password_hash: self.password_hash,
        })
    }

    pub(crate) fn into_user(self) -> Result<User, PersistenceError> {
        Ok(self.into_credentials()?.user)
    }
}

/// Diesel Queryable struct for session rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    user_id: i64,
    created_at: String,
    expires_at: String,
}

/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user_by_id(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<User>, PersistenceError> {
    debug!(user_id, "Looking up user by ID");

    let result: Result<UserRow, diesel::result::Error> = users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into_user()?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Retrieves a user and password hash by email.
///
/// The email is normalized to lowercase for case-insensitive lookup.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no user has this email.
pub fn get_credentials_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<UserCredentials>, PersistenceError> {
    let normalized_email: String = email.trim().to_lowercase();

    debug!("Looking up user by email: {}", normalized_email);

    let result: Result<UserRow, diesel::result::Error> = users::table
        .filter(users::email.eq(&normalized_email))
        .select(UserRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into_credentials()?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists all users, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut SqliteConnection) -> Result<Vec<User>, PersistenceError> {
    users::table
        .order(users::user_id.desc())
        .select(UserRow::as_select())
        .load::<UserRow>(conn)?
        .into_iter()
        .map(UserRow::into_user)
        .collect()
}

/// Lists users holding `role`, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users_with_role(
    conn: &mut SqliteConnection,
    role: Role,
) -> Result<Vec<User>, PersistenceError> {
    users::table
        .filter(users::role.eq(role.as_str()))
        .order(users::user_id.asc())
        .select(UserRow::as_select())
        .load::<UserRow>(conn)?
        .into_iter()
        .map(UserRow::into_user)
        .collect()
}

/// Counts all users.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(users::table.count().get_result(conn)?)
}

/// Retrieves a session by token.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the session is not found.
pub fn get_session_by_token(
    conn: &mut SqliteConnection,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    debug!("Looking up session by token");

    let result: Result<SessionRow, diesel::result::Error> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(SessionData {
            session_id: row.session_id,
            session_token: row.session_token,
            user_id: row.user_id,
            created_at: parse_timestamp(&row.created_at)?,
            expires_at: parse_timestamp(&row.expires_at)?,
        })),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Verifies a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if the hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
