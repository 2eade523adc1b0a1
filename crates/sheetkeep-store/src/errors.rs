//! Error helpers for sheetkeep-store
//!
//! Wraps sheetkeep-core ExError with store-specific constructors

use sheetkeep_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// An applied migration whose recorded checksum differs from the embedded SQL
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: recorded {}, embedded {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Database error tagged with the operation that hit it
pub fn sqlite_error(op: &str, err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(op)
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// True when a statement failed on a UNIQUE constraint
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_unique_violation_detected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn test_sqlite_error_carries_op() {
        let err = sqlite_error("snapshot_get", rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(err.op(), Some("snapshot_get"));
    }
}
