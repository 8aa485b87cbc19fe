// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Workload ledger reconciliation.
//!
//! The cached `workload_score` is adjusted incrementally by every
//! transition. These functions recompute it from tickets alone and report
//! where the cache drifted.

use std::collections::HashMap;

use zordon_hub_domain::{Ticket, User};

/// An engineer whose cached score disagreed with the recomputed count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadCorrection {
    pub engineer_id: i64,
    pub name: String,
    pub old_score: i64,
    pub new_score: i64,
}

/// Counts active assigned tickets per assignee.
#[must_use]
pub fn count_active_assignments(tickets: &[Ticket]) -> HashMap<i64, i64> {
    let mut counts: HashMap<i64, i64> = HashMap::new();
    for ticket in tickets.iter().filter(|t| t.status.is_active()) {
        if let Some(assignee_id) = ticket.assignee_id {
            *counts.entry(assignee_id).or_insert(0) += 1;
        }
    }
    counts
}

/// Compares every engineer's cached score against `active_counts`.
///
/// Non-engineers are ignored. An engineer missing from `active_counts`
/// has a true score of zero. The result is ordered by engineer id.
#[must_use]
pub fn reconcile_workloads(
    users: &[User],
    active_counts: &HashMap<i64, i64>,
) -> Vec<WorkloadCorrection> {
    let mut corrections: Vec<WorkloadCorrection> = users
        .iter()
        .filter(|u| u.is_engineer())
        .filter_map(|engineer| {
            let actual: i64 = active_counts
                .get(&engineer.user_id)
                .copied()
                .unwrap_or(0);
            (actual != engineer.workload_score).then(|| WorkloadCorrection {
                engineer_id: engineer.user_id,
                name: engineer.name.clone(),
                old_score: engineer.workload_score,
                new_score: actual,
            })
        })
        .collect();
    corrections.sort_by_key(|c| c.engineer_id);
    corrections
}

/// Applies a signed adjustment to a cached score, never going below zero.
#[must_use]
pub const fn adjusted_score(current: i64, delta: i64) -> i64 {
    let next: i64 = current.saturating_add(delta);
    if next < 0 { 0 } else { next }
}
