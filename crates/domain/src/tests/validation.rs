// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    DomainError, MAX_COMMENT_LENGTH, MAX_DEADLINE_WINDOW_HOURS, normalize_comment_content, normalize_email, normalize_tags,
    validate_deadline_window, validate_title, validate_user_name,
};

#[test]
fn test_title_is_trimmed() {
    assert_eq!(validate_title("  Megazord offline \n").unwrap(), "Megazord offline");
}

#[test]
fn test_blank_title_rejected() {
    assert!(matches!(
        validate_title("   "),
        Err(DomainError::InvalidTitle(_))
    ));
}

#[test]
fn test_comment_bounds() {
    assert!(matches!(
        normalize_comment_content(" \t "),
        Err(DomainError::InvalidContent(_))
    ));

    let at_limit: String = "a".repeat(MAX_COMMENT_LENGTH);
    assert_eq!(normalize_comment_content(&at_limit).unwrap().len(), 2000);

    let over: String = "a".repeat(MAX_COMMENT_LENGTH + 1);
    assert!(matches!(
        normalize_comment_content(&over),
        Err(DomainError::InvalidContent(_))
    ));
}

#[test]
fn test_comment_length_measured_after_trim() {
    let padded: String = format!("   {}   ", "b".repeat(MAX_COMMENT_LENGTH));
    assert_eq!(
        normalize_comment_content(&padded).unwrap(),
        "b".repeat(MAX_COMMENT_LENGTH)
    );
}

#[test]
fn test_email_is_lowercased() {
    assert_eq!(
        normalize_email(" Alpha@Zordon.IO ").unwrap(),
        "alpha@zordon.io"
    );
    assert!(normalize_email("").is_err());
    assert!(normalize_email("no-at-sign").is_err());
    assert!(normalize_email("@zordon.io").is_err());
}

#[test]
fn test_user_name_required() {
    assert_eq!(validate_user_name(" Trini ").unwrap(), "Trini");
    assert!(matches!(
        validate_user_name(""),
        Err(DomainError::InvalidName(_))
    ));
}

#[test]
fn test_tags_deduplicated_in_order() {
    let tags: Vec<String> = vec![
        String::from(" hardware "),
        String::from(""),
        String::from("network"),
        String::from("hardware"),
    ];
    assert_eq!(
        normalize_tags(&tags),
        vec![String::from("hardware"), String::from("network")]
    );
}

#[test]
fn test_deadline_window_must_be_positive() {
    assert!(validate_deadline_window(24).is_ok());
    assert_eq!(
        validate_deadline_window(0),
        Err(DomainError::InvalidDeadlineWindow { hours: 0 })
    );
    assert!(validate_deadline_window(-3).is_err());
}

#[test]
fn test_deadline_window_has_upper_bound() {
    assert!(validate_deadline_window(MAX_DEADLINE_WINDOW_HOURS).is_ok());
    assert_eq!(
        validate_deadline_window(MAX_DEADLINE_WINDOW_HOURS + 1),
        Err(DomainError::InvalidDeadlineWindow {
            hours: MAX_DEADLINE_WINDOW_HOURS + 1
        })
    );
    assert_eq!(
        validate_deadline_window(i64::MAX),
        Err(DomainError::InvalidDeadlineWindow { hours: i64::MAX })
    );
}
