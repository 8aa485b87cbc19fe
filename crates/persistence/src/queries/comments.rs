// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Comment queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;
use zordon_hub_domain::Comment;

use crate::data_models::{CommentAuthor, CommentWithAuthor, parse_stored, parse_timestamp};
use crate::diesel_schema::{comments, users};
use crate::error::PersistenceError;

/// Diesel Queryable struct for comment rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = comments)]
pub(crate) struct CommentRow {
    comment_id: i64,
    ticket_id: i64,
    author_id: i64,
    content: String,
    created_at: String,
    updated_at: String,
}

impl CommentRow {
    pub(crate) fn into_comment(self) -> Result<Comment, PersistenceError> {
        Ok(Comment {
            comment_id: self.comment_id,
            ticket_id: self.ticket_id,
            author_id: self.author_id,
            content: self.content,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// The author columns shown alongside a comment.
#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct AuthorRow {
    user_id: i64,
    name: String,
    email: String,
    department: String,
    role: String,
}

/// Retrieves a comment by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the comment is not found.
pub fn get_comment(
    conn: &mut SqliteConnection,
    comment_id: i64,
) -> Result<Option<Comment>, PersistenceError> {
    let result: Result<CommentRow, diesel::result::Error> = comments::table
        .filter(comments::comment_id.eq(comment_id))
        .select(CommentRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(row.into_comment()?)),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

impl AuthorRow {
    fn into_author(self) -> Result<CommentAuthor, PersistenceError> {
        Ok(CommentAuthor {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            department: parse_stored(&self.department)?,
            role: parse_stored(&self.role)?,
        })
    }
}

/// Retrieves one comment with its author projection.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the comment is not found.
pub fn get_comment_with_author(
    conn: &mut SqliteConnection,
    comment_id: i64,
) -> Result<Option<CommentWithAuthor>, PersistenceError> {
    let result: Result<(CommentRow, AuthorRow), diesel::result::Error> = comments::table
        .inner_join(users::table)
        .filter(comments::comment_id.eq(comment_id))
        .select((CommentRow::as_select(), AuthorRow::as_select()))
        .first(conn);

    match result {
        Ok((row, author)) => Ok(Some(CommentWithAuthor {
            comment: row.into_comment()?,
            author: author.into_author()?,
        })),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}

/// Lists a ticket's comments oldest first, each with its author projection.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_comments_for_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Vec<CommentWithAuthor>, PersistenceError> {
    debug!(ticket_id, "Listing comments");

    let rows: Vec<(CommentRow, AuthorRow)> = comments::table
        .inner_join(users::table)
        .filter(comments::ticket_id.eq(ticket_id))
        .order(comments::comment_id.asc())
        .select((CommentRow::as_select(), AuthorRow::as_select()))
        .load(conn)?;

    rows.into_iter()
        .map(|(row, author)| {
            Ok(CommentWithAuthor {
                comment: row.into_comment()?,
                author: author.into_author()?,
            })
        })
        .collect()
}
