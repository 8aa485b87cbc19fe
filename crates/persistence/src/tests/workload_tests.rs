// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use zordon_hub_domain::{Priority, Role, TicketStatus};

use super::{assign, create_ticket, create_user, set_status, setup, workload_of};
use crate::mutations::users::adjust_workload;

#[test]
fn test_adjust_workload_clamps_at_zero() {
    let (mut persistence, _, engineer, _) = setup();

    adjust_workload(&mut persistence.conn, engineer.user_id, -1).unwrap();
    assert_eq!(workload_of(&mut persistence, engineer.user_id), 0);

    adjust_workload(&mut persistence.conn, engineer.user_id, 3).unwrap();
    adjust_workload(&mut persistence.conn, engineer.user_id, -5).unwrap();
    assert_eq!(workload_of(&mut persistence, engineer.user_id), 0);
}

#[test]
fn test_count_active_assignments_ignores_terminal() {
    let (mut persistence, reporter, engineer_a, engineer_b) = setup();
    let t1 = create_ticket(&mut persistence, &reporter, "One", Priority::Low);
    let t2 = create_ticket(&mut persistence, &reporter, "Two", Priority::Low);
    let t3 = create_ticket(&mut persistence, &reporter, "Three", Priority::Low);
    assign(&mut persistence, &t1, &engineer_a);
    assign(&mut persistence, &t2, &engineer_a);
    let t3 = assign(&mut persistence, &t3, &engineer_b);
    set_status(&mut persistence, &t3, TicketStatus::Closed);

    let counts = persistence.count_active_assignments().unwrap();
    assert_eq!(counts.get(&engineer_a.user_id), Some(&2));
    assert_eq!(counts.get(&engineer_b.user_id), None);
}

#[test]
fn test_sync_corrects_stale_cache_then_is_a_no_op() {
    let (mut persistence, reporter, engineer_a, engineer_b) = setup();
    let ticket = create_ticket(&mut persistence, &reporter, "Drift", Priority::Medium);
    assign(&mut persistence, &ticket, &engineer_a);

    persistence
        .override_engineer(engineer_a.user_id, Some(5), None)
        .unwrap();
    persistence
        .override_engineer(engineer_b.user_id, Some(2), None)
        .unwrap();

    let corrections = persistence.sync_workloads().unwrap();
    assert_eq!(corrections.len(), 2);
    assert_eq!(corrections[0].engineer_id, engineer_a.user_id);
    assert_eq!(corrections[0].old_score, 5);
    assert_eq!(corrections[0].new_score, 1);
    assert_eq!(corrections[1].engineer_id, engineer_b.user_id);
    assert_eq!(corrections[1].new_score, 0);

    assert_eq!(workload_of(&mut persistence, engineer_a.user_id), 1);
    assert_eq!(workload_of(&mut persistence, engineer_b.user_id), 0);

    assert!(persistence.sync_workloads().unwrap().is_empty());
}

#[test]
fn test_sync_ignores_non_engineers() {
    let (mut persistence, _, _, _) = setup();
    let admin = create_user(&mut persistence, "Zordon", Role::Admin);

    assert!(persistence.sync_workloads().unwrap().is_empty());
    assert_eq!(workload_of(&mut persistence, admin.user_id), 0);
}

#[test]
fn test_incremental_ledger_agrees_with_sync() {
    let (mut persistence, reporter, engineer_a, engineer_b) = setup();
    let t1 = create_ticket(&mut persistence, &reporter, "A", Priority::Low);
    let t2 = create_ticket(&mut persistence, &reporter, "B", Priority::High);

    let t1 = assign(&mut persistence, &t1, &engineer_a);
    let t2 = assign(&mut persistence, &t2, &engineer_a);
    let t1 = assign(&mut persistence, &t1, &engineer_b);
    let t2 = set_status(&mut persistence, &t2, TicketStatus::Resolved);
    set_status(&mut persistence, &t2, TicketStatus::InProgress);
    set_status(&mut persistence, &t1, TicketStatus::PendingParts);

    assert!(
        persistence.sync_workloads().unwrap().is_empty(),
        "incremental adjustments should match a full recount"
    );
}

#[test]
fn test_engineer_workloads_sorted_lightest_first() {
    let (mut persistence, reporter, engineer_a, engineer_b) = setup();
    let ticket = create_ticket(&mut persistence, &reporter, "Busy", Priority::Low);
    assign(&mut persistence, &ticket, &engineer_a);

    let workloads = persistence.list_engineer_workloads().unwrap();
    let names: Vec<&str> = workloads.iter().map(|w| w.engineer.name.as_str()).collect();
    assert_eq!(names, vec![engineer_b.name.as_str(), engineer_a.name.as_str()]);
    assert_eq!(workloads[1].live_workload, 1);
}
