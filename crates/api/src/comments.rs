// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-ticket discussion threads with real-time fan-out.
//!
//! Every write is persisted first and then published to the ticket's room
//! through an injected [`Broadcaster`]. Publishing is fire and forget: a
//! room with no listeners is not an error.

use tracing::{debug, info};
use zordon_hub_domain::{Comment, Ticket, normalize_comment_content};
use zordon_hub_persistence::{CommentWithAuthor, Persistence};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{CommentDeletedInfo, CommentInfo};

/// An event pushed to a ticket room.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CommentEvent {
    /// A comment was posted.
    NewComment(CommentInfo),
    /// A comment's content changed.
    CommentUpdated(CommentInfo),
    /// A comment was removed.
    CommentDeleted(CommentDeletedInfo),
}

impl CommentEvent {
    /// Returns the wire name of this event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewComment(_) => "new_comment",
            Self::CommentUpdated(_) => "comment_updated",
            Self::CommentDeleted(_) => "comment_deleted",
        }
    }
}

/// Publishes events to named rooms.
pub trait Broadcaster: Send + Sync {
    /// Delivers `event` to every current subscriber of `channel`.
    fn publish(&self, channel: &str, event: &CommentEvent);
}

/// Returns the room key for a ticket id.
#[must_use]
pub fn ticket_channel(ticket_id: i64) -> String {
    format!("ticket_{ticket_id}")
}

fn load_ticket(persistence: &mut Persistence, ticket_id: i64) -> Result<Ticket, ApiError> {
    persistence
        .get_ticket(ticket_id)?
        .ok_or_else(|| ApiError::ticket_not_found(ticket_id))
}

fn load_comment(persistence: &mut Persistence, comment_id: i64) -> Result<Comment, ApiError> {
    persistence
        .get_comment(comment_id)?
        .ok_or_else(|| ApiError::comment_not_found(comment_id))
}

/// Projects a stored comment with its author for clients.
fn comment_info(persistence: &mut Persistence, comment: &Comment) -> Result<CommentInfo, ApiError> {
    persistence
        .get_comment_with_author(comment.comment_id)?
        .as_ref()
        .map(CommentInfo::from)
        .ok_or_else(|| ApiError::comment_not_found(comment.comment_id))
}

/// Lists a ticket's comments, oldest first.
///
/// # Errors
///
/// Returns an error if the ticket does not exist or the actor may not read it.
pub fn list_comments(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    ticket_id: i64,
) -> Result<Vec<CommentInfo>, ApiError> {
    let ticket: Ticket = load_ticket(persistence, ticket_id)?;
    AuthorizationService::authorize_read_comments(actor, &ticket)?;

    let comments: Vec<CommentWithAuthor> = persistence.list_comments(ticket.ticket_id)?;
    debug!(ticket_id, count = comments.len(), "Listed comments");
    Ok(comments.iter().map(CommentInfo::from).collect())
}

/// Posts a comment and announces it to the ticket's room.
///
/// # Errors
///
/// Returns an error if the ticket does not exist, the actor may not
/// comment on it, or the content is empty after trimming.
pub fn create_comment(
    persistence: &mut Persistence,
    broadcaster: &dyn Broadcaster,
    actor: &AuthenticatedActor,
    ticket_id: i64,
    content: &str,
) -> Result<CommentInfo, ApiError> {
    let ticket: Ticket = load_ticket(persistence, ticket_id)?;
    AuthorizationService::authorize_post_comment(actor, &ticket)?;
    let content: String = normalize_comment_content(content).map_err(translate_domain_error)?;

    let comment: Comment = persistence.create_comment(ticket.ticket_id, actor.id, &content)?;
    let info: CommentInfo = comment_info(persistence, &comment)?;
    info!(
        comment_id = comment.comment_id,
        ticket_id,
        author_id = actor.id,
        "Comment posted"
    );

    broadcaster.publish(&ticket.channel_key(), &CommentEvent::NewComment(info.clone()));
    Ok(info)
}

/// Replaces a comment's content. Only the author may.
///
/// # Errors
///
/// Returns an error if the comment does not exist, the actor is not its
/// author, or the content is empty after trimming.
pub fn edit_comment(
    persistence: &mut Persistence,
    broadcaster: &dyn Broadcaster,
    actor: &AuthenticatedActor,
    comment_id: i64,
    content: &str,
) -> Result<CommentInfo, ApiError> {
    let comment: Comment = load_comment(persistence, comment_id)?;
    AuthorizationService::authorize_edit_comment(actor, &comment)?;
    let content: String = normalize_comment_content(content).map_err(translate_domain_error)?;

    let updated: Comment = persistence.update_comment(comment_id, &content)?;
    let info: CommentInfo = comment_info(persistence, &updated)?;
    info!(comment_id, ticket_id = updated.ticket_id, "Comment edited");

    broadcaster.publish(
        &ticket_channel(updated.ticket_id),
        &CommentEvent::CommentUpdated(info.clone()),
    );
    Ok(info)
}

/// Removes a comment. The author or an Admin may.
///
/// Comments whose ticket was deleted can still be removed; the event goes
/// to the room the ticket used to have.
///
/// # Errors
///
/// Returns an error if the comment does not exist or the actor may not
/// delete it.
pub fn delete_comment(
    persistence: &mut Persistence,
    broadcaster: &dyn Broadcaster,
    actor: &AuthenticatedActor,
    comment_id: i64,
) -> Result<CommentDeletedInfo, ApiError> {
    let comment: Comment = load_comment(persistence, comment_id)?;
    AuthorizationService::authorize_delete_comment(actor, &comment)?;

    persistence.delete_comment(comment_id)?;
    info!(
        comment_id,
        ticket_id = comment.ticket_id,
        actor_id = actor.id,
        "Comment deleted"
    );

    let deleted: CommentDeletedInfo = CommentDeletedInfo {
        comment_id,
        ticket_id: comment.ticket_id,
    };
    broadcaster.publish(
        &ticket_channel(comment.ticket_id),
        &CommentEvent::CommentDeleted(deleted),
    );
    Ok(deleted)
}
