// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.
//!
//! Every other test module opens its own in-memory database, so migrations
//! and foreign key enforcement are exercised throughout. These tests pin
//! down isolation and the pragma check explicitly.

use zordon_hub_domain::Role;

use super::create_user;
use crate::Persistence;
use crate::error::PersistenceError;

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = Persistence::new_in_memory().unwrap();
    let mut db2 = Persistence::new_in_memory().unwrap();

    create_user(&mut db1, "Zack Taylor", Role::Ranger);

    assert_eq!(db1.count_users().unwrap(), 1, "db1 should have 1 user");
    assert_eq!(db2.count_users().unwrap(), 0, "db2 should be isolated");
}

#[test]
fn test_foreign_key_enforcement_is_enabled() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_file_backed_database_persists_across_reopen() {
    let path = std::env::temp_dir().join(format!(
        "zordon_hub_init_test_{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        create_user(&mut persistence, "Kimberly Hart", Role::Ranger);
    }

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    assert_eq!(reopened.count_users().unwrap(), 1);

    drop(reopened);
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(path.with_extension("db-wal"));
    let _ = std::fs::remove_file(path.with_extension("db-shm"));
}
