// Integration tests for the migration runner

use rusqlite::Connection;
use sheetkeep_store::migrations::{apply_migrations, applied_migrations};

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = setup_test_db();

    // When: Migrations are applied
    let result = apply_migrations(&mut conn);

    // Then: All migrations succeed
    assert!(result.is_ok(), "Migrations should succeed: {:?}", result.err());

    // And: Every expected table exists (sqlite_sequence comes from AUTOINCREMENT)
    let tables = get_table_names(&conn);
    let expected_tables = [
        "schema_version",
        "llm_configs",
        "conversations",
        "conversation_messages",
        "system_prompts",
        "app_settings",
        "workbook_snapshots",
        "sqlite_sequence",
    ];
    assert_eq!(tables.len(), expected_tables.len(), "tables: {:?}", tables);
    for expected in &expected_tables {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_migrations_are_idempotent() {
    // Given: A database with migrations applied
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    // When: They are applied again
    apply_migrations(&mut conn).unwrap();

    // Then: Each migration is recorded exactly once
    let applied = applied_migrations(&conn).unwrap();
    assert_eq!(applied, vec!["001_app_tables", "002_workbook_snapshots"]);
}

#[test]
fn test_snapshot_version_must_be_positive() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    let result = conn.execute(
        "INSERT INTO workbook_snapshots (workbook_key, version, data_json, updated_at)
         VALUES ('k', 0, '{}', 'now')",
        [],
    );
    assert!(result.is_err(), "version 0 must violate the CHECK constraint");
}

#[test]
fn test_messages_cascade_with_conversation() {
    let mut conn = setup_test_db();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    apply_migrations(&mut conn).unwrap();

    conn.execute(
        "INSERT INTO conversations (title, created_at, updated_at) VALUES ('t', 'a', 'a')",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO conversation_messages (conversation_id, role, content, created_at)
         VALUES (?1, 'user', 'hi', 'a')",
        [id],
    )
    .unwrap();

    conn.execute("DELETE FROM conversations WHERE id = ?1", [id])
        .unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM conversation_messages", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(remaining, 0);
}
