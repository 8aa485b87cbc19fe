// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use zordon_hub_domain::Department;

use super::helpers::{RecordingBroadcaster, create_test_cause, file_ticket, setup};
use crate::{
    CommentDeletedInfo, CommentEvent, create_comment, delete_comment, delete_ticket,
    edit_comment, list_comments,
};

#[test]
fn test_post_comment_broadcasts_to_ticket_room() {
    let mut f = setup();
    let rooms = RecordingBroadcaster::default();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Zords offline", None);

    let comment = create_comment(
        &mut f.persistence,
        &rooms,
        &f.reporter,
        ticket.ticket_id,
        "  It went dark at noon  ",
    )
    .unwrap();

    assert_eq!(comment.content, "It went dark at noon");
    assert_eq!(comment.author.name, "Jason Scott");
    assert_eq!(comment.author.department, Department::Red);

    let events = rooms.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, format!("ticket_{}", ticket.ticket_id));
    assert_eq!(events[0].1, CommentEvent::NewComment(comment));
}

#[test]
fn test_comments_list_oldest_first() {
    let mut f = setup();
    let rooms = RecordingBroadcaster::default();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Zords offline", None);

    create_comment(&mut f.persistence, &rooms, &f.reporter, ticket.ticket_id, "first").unwrap();
    create_comment(&mut f.persistence, &rooms, &f.admin, ticket.ticket_id, "second").unwrap();

    let listed = list_comments(&mut f.persistence, &f.reporter, ticket.ticket_id).unwrap();
    let contents: Vec<&str> = listed.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second"]);
    assert_eq!(listed[1].author.user_id, f.admin.id);
}

#[test]
fn test_blank_comment_is_rejected_without_broadcast() {
    let mut f = setup();
    let rooms = RecordingBroadcaster::default();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Zords offline", None);

    let err = create_comment(&mut f.persistence, &rooms, &f.reporter, ticket.ticket_id, "  \n ")
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_input");
    assert!(rooms.events().is_empty());
}

#[test]
fn test_unrelated_users_cannot_read_or_post() {
    let mut f = setup();
    let rooms = RecordingBroadcaster::default();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Zords offline", None);

    assert_eq!(
        create_comment(&mut f.persistence, &rooms, &f.other_reporter, ticket.ticket_id, "hi")
            .unwrap_err()
            .kind(),
        "forbidden"
    );
    assert_eq!(
        list_comments(&mut f.persistence, &f.engineer, ticket.ticket_id)
            .unwrap_err()
            .kind(),
        "forbidden"
    );
    assert_eq!(
        create_comment(&mut f.persistence, &rooms, &f.reporter, 999, "hi")
            .unwrap_err()
            .kind(),
        "not_found"
    );
}

#[test]
fn test_only_author_edits() {
    let mut f = setup();
    let rooms = RecordingBroadcaster::default();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Zords offline", None);
    let comment =
        create_comment(&mut f.persistence, &rooms, &f.reporter, ticket.ticket_id, "typo")
            .unwrap();

    let err = edit_comment(&mut f.persistence, &rooms, &f.admin, comment.comment_id, "fixed")
        .unwrap_err();
    assert_eq!(err.kind(), "forbidden");

    let edited = edit_comment(
        &mut f.persistence,
        &rooms,
        &f.reporter,
        comment.comment_id,
        "fixed",
    )
    .unwrap();
    assert_eq!(edited.content, "fixed");

    let events = rooms.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].1, CommentEvent::CommentUpdated(edited));
}

#[test]
fn test_admin_deletes_any_comment() {
    let mut f = setup();
    let rooms = RecordingBroadcaster::default();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Zords offline", None);
    let comment =
        create_comment(&mut f.persistence, &rooms, &f.reporter, ticket.ticket_id, "spam")
            .unwrap();

    assert_eq!(
        delete_comment(&mut f.persistence, &rooms, &f.other_reporter, comment.comment_id)
            .unwrap_err()
            .kind(),
        "forbidden"
    );

    let deleted =
        delete_comment(&mut f.persistence, &rooms, &f.admin, comment.comment_id).unwrap();
    assert_eq!(
        deleted,
        CommentDeletedInfo {
            comment_id: comment.comment_id,
            ticket_id: ticket.ticket_id,
        }
    );
    assert_eq!(
        rooms.events().last().map(|(_, e)| e.name()),
        Some("comment_deleted")
    );
    assert_eq!(
        delete_comment(&mut f.persistence, &rooms, &f.admin, comment.comment_id)
            .unwrap_err()
            .kind(),
        "not_found"
    );
}

#[test]
fn test_comments_outlive_their_ticket() {
    let mut f = setup();
    let rooms = RecordingBroadcaster::default();
    let ticket = file_ticket(&mut f.persistence, &f.reporter, "Zords offline", None);
    let comment =
        create_comment(&mut f.persistence, &rooms, &f.reporter, ticket.ticket_id, "bye")
            .unwrap();

    delete_ticket(&mut f.persistence, &f.reporter, ticket.ticket_id, create_test_cause())
        .unwrap();
    assert_eq!(
        list_comments(&mut f.persistence, &f.reporter, ticket.ticket_id)
            .unwrap_err()
            .kind(),
        "not_found"
    );

    delete_comment(&mut f.persistence, &rooms, &f.reporter, comment.comment_id).unwrap();
    let (channel, _) = rooms.events().pop().unwrap();
    assert_eq!(channel, format!("ticket_{}", ticket.ticket_id));
}

#[test]
fn test_event_wire_shape() {
    let event = CommentEvent::CommentDeleted(CommentDeletedInfo {
        comment_id: 3,
        ticket_id: 9,
    });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "comment_deleted",
            "data": { "comment_id": 3, "ticket_id": 9 }
        })
    );
}
