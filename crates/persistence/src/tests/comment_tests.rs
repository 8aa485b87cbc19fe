// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use zordon_hub::Command;
use zordon_hub_domain::{Priority, Role};

use super::{create_ticket, run_command, setup};
use crate::PersistenceError;

#[test]
fn test_comments_listed_oldest_first_with_author() {
    let (mut persistence, reporter, engineer, _) = setup();
    let ticket = create_ticket(&mut persistence, &reporter, "Alarm", Priority::High);

    let first = persistence
        .create_comment(ticket.ticket_id, reporter.user_id, "It keeps beeping")
        .unwrap();
    let second = persistence
        .create_comment(ticket.ticket_id, engineer.user_id, "On my way")
        .unwrap();

    let comments = persistence.list_comments(ticket.ticket_id).unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].comment.comment_id, first.comment_id);
    assert_eq!(comments[1].comment.comment_id, second.comment_id);
    assert_eq!(comments[1].author.name, engineer.name);
    assert_eq!(comments[1].author.role, Role::Engineer);
}

#[test]
fn test_single_comment_with_author() {
    let (mut persistence, reporter, engineer, _) = setup();
    let ticket = create_ticket(&mut persistence, &reporter, "Alarm", Priority::High);
    persistence
        .create_comment(ticket.ticket_id, reporter.user_id, "It keeps beeping")
        .unwrap();
    let reply = persistence
        .create_comment(ticket.ticket_id, engineer.user_id, "On my way")
        .unwrap();

    let found = persistence
        .get_comment_with_author(reply.comment_id)
        .unwrap()
        .unwrap();
    assert_eq!(found.comment, reply);
    assert_eq!(found.author.user_id, engineer.user_id);
    assert_eq!(found.author.email, engineer.email);
    assert_eq!(found.author.role, Role::Engineer);

    assert!(persistence.get_comment_with_author(404).unwrap().is_none());
}

#[test]
fn test_update_comment_changes_content() {
    let (mut persistence, reporter, _, _) = setup();
    let ticket = create_ticket(&mut persistence, &reporter, "Typo", Priority::Low);
    let comment = persistence
        .create_comment(ticket.ticket_id, reporter.user_id, "teh zord")
        .unwrap();

    let updated = persistence
        .update_comment(comment.comment_id, "the zord")
        .unwrap();
    assert_eq!(updated.content, "the zord");
    assert_eq!(updated.created_at, comment.created_at);
    assert!(updated.updated_at >= comment.updated_at);
}

#[test]
fn test_missing_comment_errors() {
    let (mut persistence, _, _, _) = setup();
    assert!(persistence.get_comment(404).unwrap().is_none());
    assert!(matches!(
        persistence.update_comment(404, "x"),
        Err(PersistenceError::CommentNotFound(404))
    ));
    assert!(matches!(
        persistence.delete_comment(404),
        Err(PersistenceError::CommentNotFound(404))
    ));
}

#[test]
fn test_delete_comment_removes_it() {
    let (mut persistence, reporter, _, _) = setup();
    let ticket = create_ticket(&mut persistence, &reporter, "Noise", Priority::Low);
    let comment = persistence
        .create_comment(ticket.ticket_id, reporter.user_id, "hello")
        .unwrap();

    persistence.delete_comment(comment.comment_id).unwrap();
    assert!(persistence.list_comments(ticket.ticket_id).unwrap().is_empty());
}

#[test]
fn test_comments_survive_ticket_deletion() {
    let (mut persistence, reporter, _, _) = setup();
    let ticket = create_ticket(&mut persistence, &reporter, "Doomed", Priority::Low);
    persistence
        .create_comment(ticket.ticket_id, reporter.user_id, "still here")
        .unwrap();

    run_command(&mut persistence, &ticket, Command::DeleteTicket);

    let orphans = persistence.list_comments(ticket.ticket_id).unwrap();
    assert_eq!(orphans.len(), 1);
}
