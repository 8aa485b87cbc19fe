// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod error;
mod sla;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::DomainError;
pub use sla::{
    DEFAULT_DEADLINE_WINDOW_HOURS, MAX_DEADLINE_WINDOW_HOURS, calculate_due_date, calculate_due_date_for, format_remaining,
    is_breached, time_remaining,
};
pub use types::{
    Comment, Department, NewTicket, Priority, Role, Ticket, TicketStatus, User,
    DEFAULT_CATEGORY,
};
pub use validation::{
    MAX_COMMENT_LENGTH, normalize_comment_content, normalize_email, normalize_tags,
    validate_deadline_window, validate_title, validate_user_name,
};
