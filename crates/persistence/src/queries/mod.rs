// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `users`: Users, credentials and sessions
//! - `tickets`: Tickets, sweep pools and grouped workload counts
//! - `comments`: Comment threads with author projections
//! - `audit`: Per-ticket audit timelines
//! - `stats`: Dashboard aggregates

pub mod audit;
pub mod comments;
pub mod stats;
pub mod tickets;
pub mod users;
