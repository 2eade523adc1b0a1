// Integration tests for the versioned snapshot store

use proptest::prelude::*;
use serde_json::{json, Value};
use sheetkeep_core::errors::ExErrorKind;
use sheetkeep_core::model::{ExpectedVersion, PutOutcome, SnapshotPayload};
use sheetkeep_store::{Database, SnapshotStore};
use std::sync::Arc;
use tempfile::TempDir;

const LIMIT: usize = 2 * 1024 * 1024;

fn setup() -> (TempDir, SnapshotStore) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path().join("store.db")).unwrap();
    (dir, SnapshotStore::new(Arc::new(db)))
}

fn payload(data: Value) -> SnapshotPayload {
    SnapshotPayload::from_value(&data, LIMIT).unwrap()
}

#[test]
fn test_get_missing_key_is_none() {
    let (_dir, store) = setup();
    assert_eq!(store.get("nope").unwrap(), None);
}

#[test]
fn test_first_put_creates_version_one() {
    // Given: No row for sheet-a
    let (_dir, store) = setup();

    // When: A save arrives carrying a stale client version
    let outcome = store
        .put("sheet-a", &payload(json!({"A1": 1})), ExpectedVersion::Exact(7))
        .unwrap();

    // Then: The client version is ignored and the row starts at 1
    assert_eq!(outcome, PutOutcome::Created { version: 1 });
    let row = store.get("sheet-a").unwrap().unwrap();
    assert_eq!(row.version, 1);
    assert_eq!(row.data_json, r#"{"A1":1}"#);
    assert!(!row.updated_at.is_empty());
}

#[test]
fn test_matching_lock_bumps_version() {
    let (_dir, store) = setup();
    store
        .put("sheet-a", &payload(json!({"A1": 1})), ExpectedVersion::Unchecked)
        .unwrap();

    let outcome = store
        .put("sheet-a", &payload(json!({"A1": 2})), ExpectedVersion::Exact(1))
        .unwrap();

    assert_eq!(outcome, PutOutcome::Updated { version: 2 });
    let row = store.get("sheet-a").unwrap().unwrap();
    assert_eq!(row.version, 2);
    assert_eq!(row.data_json, r#"{"A1":2}"#);
}

#[test]
fn test_stale_lock_conflicts_without_mutation() {
    // Given: sheet-a at version 2
    let (_dir, store) = setup();
    store
        .put("sheet-a", &payload(json!({"v": 1})), ExpectedVersion::Unchecked)
        .unwrap();
    store
        .put("sheet-a", &payload(json!({"v": 2})), ExpectedVersion::Exact(1))
        .unwrap();
    let before = store.get("sheet-a").unwrap().unwrap();

    // When: A writer still holding version 1 saves
    let outcome = store
        .put("sheet-a", &payload(json!({"v": 3})), ExpectedVersion::Exact(1))
        .unwrap();

    // Then: It is told the current version and nothing changes
    assert_eq!(outcome, PutOutcome::Conflict { current_version: 2 });
    assert_eq!(store.get("sheet-a").unwrap().unwrap(), before);
}

#[test]
fn test_unmatchable_lock_always_conflicts_on_existing_row() {
    let (_dir, store) = setup();
    store
        .put("sheet-a", &payload(json!({})), ExpectedVersion::Unchecked)
        .unwrap();

    let outcome = store
        .put("sheet-a", &payload(json!({})), ExpectedVersion::Unmatchable)
        .unwrap();
    assert_eq!(outcome, PutOutcome::Conflict { current_version: 1 });
}

#[test]
fn test_unchecked_write_forces_overwrite() {
    let (_dir, store) = setup();
    for _ in 0..3 {
        store
            .put("sheet-b", &payload(json!({"x": true})), ExpectedVersion::Unchecked)
            .unwrap();
    }

    let outcome = store
        .put("sheet-b", &payload(json!({"x": false})), ExpectedVersion::Unchecked)
        .unwrap();
    assert_eq!(outcome, PutOutcome::Updated { version: 4 });
}

#[test]
fn test_keys_are_independent_and_literal() {
    let (_dir, store) = setup();
    store
        .put("sheet-a", &payload(json!({"a": 1})), ExpectedVersion::Unchecked)
        .unwrap();
    store
        .put(" sheet-a ", &payload(json!({"b": 1})), ExpectedVersion::Unchecked)
        .unwrap();

    assert_eq!(store.get("sheet-a").unwrap().unwrap().data_json, r#"{"a":1}"#);
    assert_eq!(store.get(" sheet-a ").unwrap().unwrap().data_json, r#"{"b":1}"#);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_delete_is_idempotent() {
    let (_dir, store) = setup();
    store
        .put("sheet-a", &payload(json!({})), ExpectedVersion::Unchecked)
        .unwrap();

    assert!(store.delete("sheet-a").unwrap());
    assert!(!store.delete("sheet-a").unwrap());
    assert!(!store.delete("never-existed").unwrap());
    assert_eq!(store.get("sheet-a").unwrap(), None);
}

#[test]
fn test_recreate_after_delete_restarts_at_one() {
    let (_dir, store) = setup();
    store
        .put("sheet-a", &payload(json!({})), ExpectedVersion::Unchecked)
        .unwrap();
    store
        .put("sheet-a", &payload(json!({})), ExpectedVersion::Unchecked)
        .unwrap();
    store.delete("sheet-a").unwrap();

    let outcome = store
        .put("sheet-a", &payload(json!({})), ExpectedVersion::Exact(2))
        .unwrap();
    assert_eq!(outcome, PutOutcome::Created { version: 1 });
}

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.db");
    {
        let store = SnapshotStore::new(Arc::new(Database::open(&path).unwrap()));
        store
            .put("sheet-a", &payload(json!({"kept": [1, 2]})), ExpectedVersion::Unchecked)
            .unwrap();
    }

    let store = SnapshotStore::new(Arc::new(Database::open(&path).unwrap()));
    let row = store.get("sheet-a").unwrap().unwrap();
    assert_eq!(row.version, 1);
    assert_eq!(row.data_json, r#"{"kept":[1,2]}"#);
}

#[test]
fn test_corrupt_version_surfaces_as_persistence_error() {
    let dir = TempDir::new().unwrap();
    let db = Arc::new(Database::open(dir.path().join("store.db")).unwrap());
    let store = SnapshotStore::new(Arc::clone(&db));
    store
        .put("sheet-a", &payload(json!({})), ExpectedVersion::Unchecked)
        .unwrap();

    // Drop the CHECK by rebuilding the table, then plant a negative version
    db.with_connection(|conn| {
        conn.execute_batch(
            "ALTER TABLE workbook_snapshots RENAME TO ws_old;
             CREATE TABLE workbook_snapshots (workbook_key TEXT PRIMARY KEY, version INTEGER, data_json TEXT, updated_at TEXT);
             INSERT INTO workbook_snapshots VALUES ('sheet-a', -3, '{}', 'x');
             DROP TABLE ws_old;",
        )
        .map_err(sheetkeep_store::errors::from_rusqlite)
    })
    .unwrap();

    let err = store
        .put("sheet-a", &payload(json!({})), ExpectedVersion::Unchecked)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(err.op(), Some("snapshot_put"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Every accepted write advances the version by exactly one
    #[test]
    fn prop_versions_are_monotonic(locks in proptest::collection::vec(proptest::option::of(1u64..6), 1..12)) {
        let (_dir, store) = setup();
        let mut current: Option<u64> = None;

        for lock in locks {
            let expected = ExpectedVersion::from_client(lock);
            let outcome = store.put("p1", &payload(json!({"n": 0})), expected).unwrap();

            match (current, outcome) {
                (None, PutOutcome::Created { version }) => {
                    prop_assert_eq!(version, 1);
                    current = Some(1);
                }
                (Some(v), PutOutcome::Updated { version }) => {
                    prop_assert!(lock.is_none() || lock == Some(v));
                    prop_assert_eq!(version, v + 1);
                    current = Some(version);
                }
                (Some(v), PutOutcome::Conflict { current_version }) => {
                    prop_assert_eq!(current_version, v);
                    prop_assert!(lock.is_some() && lock != Some(v));
                }
                (state, outcome) => {
                    prop_assert!(false, "unexpected {:?} from state {:?}", outcome, state);
                }
            }

            let stored = store.get("p1").unwrap().map(|row| row.version as u64);
            prop_assert_eq!(stored, current);
        }
    }
}
