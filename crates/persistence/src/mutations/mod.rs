// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! ## Module Organization
//!
//! - `users`: User records, atomic workload adjustments, sessions
//! - `tickets`: Ticket inserts, transitions, breach and reminder flags
//! - `comments`: Comment inserts, edits and deletes
//! - `audit`: Audit event persistence

pub mod audit;
pub mod comments;
pub mod tickets;
pub mod users;
