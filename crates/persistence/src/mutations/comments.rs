// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Comment mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::format_timestamp;
use crate::diesel_schema::comments;
use crate::error::PersistenceError;

/// Inserts a comment. Content must already be normalized.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_comment(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    author_id: i64,
    content: &str,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let timestamp: String = format_timestamp(now)?;

    diesel::insert_into(comments::table)
        .values((
            comments::ticket_id.eq(ticket_id),
            comments::author_id.eq(author_id),
            comments::content.eq(content),
            comments::created_at.eq(&timestamp),
            comments::updated_at.eq(&timestamp),
        ))
        .execute(conn)?;

    let comment_id: i64 = conn.get_last_insert_rowid()?;
    debug!(comment_id, ticket_id, author_id, "Comment created");
    Ok(comment_id)
}

/// Replaces a comment's content.
///
/// # Errors
///
/// Returns an error if the comment does not exist or the update fails.
pub fn update_comment(
    conn: &mut SqliteConnection,
    comment_id: i64,
    content: &str,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(comments::table)
        .filter(comments::comment_id.eq(comment_id))
        .set((
            comments::content.eq(content),
            comments::updated_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::CommentNotFound(comment_id));
    }
    Ok(())
}

/// Deletes a comment.
///
/// # Errors
///
/// Returns an error if the comment does not exist or the delete fails.
pub fn delete_comment(conn: &mut SqliteConnection, comment_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(comments::table)
        .filter(comments::comment_id.eq(comment_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::CommentNotFound(comment_id));
    }
    debug!(comment_id, "Comment deleted");
    Ok(())
}
