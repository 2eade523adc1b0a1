//! Versioned snapshot store

#![allow(clippy::result_large_err)]

use crate::db::Database;
use crate::errors::{sqlite_error, Result};
use rusqlite::{OptionalExtension, TransactionBehavior};
use sheetkeep_core::errors::{ExError, ExErrorKind};
use sheetkeep_core::model::{now_timestamp, ExpectedVersion, PutOutcome, SnapshotPayload};
use std::sync::Arc;

/// A snapshot row exactly as stored; `data_json` is not interpreted here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
    pub workbook_key: String,
    pub version: i64,
    pub data_json: String,
    pub updated_at: String,
}

/// Durable mapping from workbook key to its latest blob and version
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    db: Arc<Database>,
}

impl SnapshotStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Current row for `key`, or `None` if no snapshot exists
    ///
    /// Keys are matched literally.
    pub fn get(&self, key: &str) -> Result<Option<StoredSnapshot>> {
        self.db.with_connection(|conn| {
            conn.query_row(
                "SELECT workbook_key, version, data_json, updated_at
                 FROM workbook_snapshots
                 WHERE workbook_key = ?1",
                [key],
                |row| {
                    Ok(StoredSnapshot {
                        workbook_key: row.get(0)?,
                        version: row.get(1)?,
                        data_json: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(|e| sqlite_error("snapshot_get", e).with_entity_id(key))
        })
    }

    /// Versioned upsert
    ///
    /// - no row: insert at version 1, `expected` is ignored
    /// - row present and `expected` does not permit its version: `Conflict`,
    ///   nothing written
    /// - otherwise: replace the blob and bump the version by one
    ///
    /// The read and the write run inside one `BEGIN IMMEDIATE` transaction,
    /// and the update is additionally conditioned on the version it read.
    pub fn put(
        &self,
        key: &str,
        payload: &SnapshotPayload,
        expected: ExpectedVersion,
    ) -> Result<PutOutcome> {
        self.db.with_connection(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| sqlite_error("snapshot_put", e).with_entity_id(key))?;

            let current: Option<i64> = tx
                .query_row(
                    "SELECT version FROM workbook_snapshots WHERE workbook_key = ?1",
                    [key],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| sqlite_error("snapshot_put", e).with_entity_id(key))?;

            let now = now_timestamp();

            let outcome = match current {
                None => {
                    tx.execute(
                        "INSERT INTO workbook_snapshots (workbook_key, version, data_json, updated_at)
                         VALUES (?1, 1, ?2, ?3)",
                        rusqlite::params![key, payload.as_json(), now],
                    )
                    .map_err(|e| sqlite_error("snapshot_put", e).with_entity_id(key))?;
                    PutOutcome::Created { version: 1 }
                }
                Some(stored) => {
                    let current_version = u64::try_from(stored).map_err(|_| {
                        ExError::new(ExErrorKind::Persistence)
                            .with_op("snapshot_put")
                            .with_entity_id(key)
                            .with_message(format!("stored version {} is negative", stored))
                    })?;

                    if !expected.permits(current_version) {
                        tracing::debug!(
                            workbook_key = %key,
                            current_version,
                            expected = ?expected,
                            "Snapshot write rejected: version conflict"
                        );
                        return Ok(PutOutcome::Conflict { current_version });
                    }

                    let next_version = current_version + 1;
                    let changed = tx
                        .execute(
                            "UPDATE workbook_snapshots
                             SET data_json = ?1, version = ?2, updated_at = ?3
                             WHERE workbook_key = ?4 AND version = ?5",
                            rusqlite::params![
                                payload.as_json(),
                                next_version as i64,
                                now,
                                key,
                                stored
                            ],
                        )
                        .map_err(|e| sqlite_error("snapshot_put", e).with_entity_id(key))?;

                    if changed != 1 {
                        return Err(ExError::new(ExErrorKind::Concurrency)
                            .with_op("snapshot_put")
                            .with_entity_id(key)
                            .with_message(format!(
                                "row changed under write lock (expected version {})",
                                current_version
                            )));
                    }
                    PutOutcome::Updated {
                        version: next_version,
                    }
                }
            };

            tx.commit()
                .map_err(|e| sqlite_error("snapshot_put", e).with_entity_id(key))?;

            tracing::debug!(
                workbook_key = %key,
                size_bytes = payload.len(),
                outcome = ?outcome,
                "Snapshot written"
            );

            Ok(outcome)
        })
    }

    /// Remove the row for `key`; returns whether one existed
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.db.with_connection(|conn| {
            let removed = conn
                .execute(
                    "DELETE FROM workbook_snapshots WHERE workbook_key = ?1",
                    [key],
                )
                .map_err(|e| sqlite_error("snapshot_delete", e).with_entity_id(key))?;
            Ok(removed > 0)
        })
    }

    /// Number of stored snapshots
    pub fn count(&self) -> Result<u64> {
        self.db.with_connection(|conn| {
            conn.query_row("SELECT COUNT(*) FROM workbook_snapshots", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as u64)
            .map_err(|e| sqlite_error("snapshot_count", e))
        })
    }
}
