// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::sla::MAX_DEADLINE_WINDOW_HOURS;

/// Maximum length of a comment after trimming, in characters.
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// Validates and trims a ticket title.
///
/// # Errors
///
/// Returns `DomainError::InvalidTitle` if the title is empty after trimming.
pub fn validate_title(title: &str) -> Result<String, DomainError> {
    let trimmed: &str = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidTitle(String::from(
            "Title is required",
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims comment content and enforces its length bounds.
///
/// # Errors
///
/// Returns `DomainError::InvalidContent` if the trimmed content is empty
/// or longer than [`MAX_COMMENT_LENGTH`] characters.
pub fn normalize_comment_content(content: &str) -> Result<String, DomainError> {
    let trimmed: &str = content.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidContent(String::from(
            "Comment content cannot be empty",
        )));
    }

    let length: usize = trimmed.chars().count();
    if length > MAX_COMMENT_LENGTH {
        return Err(DomainError::InvalidContent(format!(
            "Comment is {length} characters. Maximum is {MAX_COMMENT_LENGTH}"
        )));
    }

    Ok(trimmed.to_string())
}

/// Validates a display name.
///
/// # Errors
///
/// Returns `DomainError::InvalidName` if the name is empty after trimming.
pub fn validate_user_name(name: &str) -> Result<String, DomainError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }
    Ok(trimmed.to_string())
}

/// Lowercases and trims an email address.
///
/// Only a minimal shape check is done: one `@` with text on both sides.
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` if the address is empty or malformed.
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let normalized: String = email.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(DomainError::InvalidEmail(String::from(
            "Email cannot be empty",
        )));
    }

    match normalized.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(normalized)
        }
        _ => Err(DomainError::InvalidEmail(format!(
            "'{normalized}' is not a valid address"
        ))),
    }
}

/// Trims tags, drops empties and removes duplicates while keeping order.
#[must_use]
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed: &str = tag.trim();
        if trimmed.is_empty() || normalized.iter().any(|existing| existing == trimmed) {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

/// Validates the deadline reminder lookahead.
///
/// # Errors
///
/// Returns `DomainError::InvalidDeadlineWindow` if `hours` is not positive
/// or exceeds [`MAX_DEADLINE_WINDOW_HOURS`].
pub const fn validate_deadline_window(hours: i64) -> Result<(), DomainError> {
    if hours <= 0 || hours > MAX_DEADLINE_WINDOW_HOURS {
        return Err(DomainError::InvalidDeadlineWindow { hours });
    }
    Ok(())
}
