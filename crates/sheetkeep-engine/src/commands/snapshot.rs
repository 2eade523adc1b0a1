//! Workbook snapshot save/load orchestration.
//!
//! ## Save pipeline (in order):
//! 1. Resolve the workbook key (falsy values select the default key)
//! 2. Validate the payload shape and serialized size (no storage access)
//! 3. Translate the client version into a lock token
//! 4. Compare-and-swap through the store
//!
//! Validation failures and version conflicts are ordinary outcomes, not
//! errors. Only storage failures surface as `Err`.

#![allow(clippy::result_large_err)]

use sheetkeep_core::errors::ExError;
use sheetkeep_core::model::snapshot::{resolve_workbook_key, DEFAULT_WORKBOOK_KEY};
use sheetkeep_core::model::{
    ExpectedVersion, PayloadError, PutOutcome, SnapshotPayload, WorkbookSnapshot,
    DEFAULT_MAX_SNAPSHOT_BYTES,
};
use sheetkeep_core::{log_op_end, log_op_error, log_op_start};
use sheetkeep_store::errors::Result;
use sheetkeep_store::SnapshotStore;
use serde_json::Value;

/// Limits applied to every save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPolicy {
    /// Ceiling on serialized `data` in bytes
    pub max_snapshot_bytes: usize,
    /// Key used when a request names no workbook
    pub default_key: String,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            max_snapshot_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
            default_key: DEFAULT_WORKBOOK_KEY.to_string(),
        }
    }
}

/// A save as submitted by a client, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub workbook_key: String,
    pub data: Value,
    pub expected: ExpectedVersion,
}

impl SaveRequest {
    /// Read `{ workbookKey?, data, version? }`
    ///
    /// A body that is not an object is read as `{}`. Only an unusable
    /// `workbookKey` (object or array) is an error; a bad `data` is left for
    /// [`SnapshotService::save`] to reject.
    pub fn from_json(body: &Value, default_key: &str) -> std::result::Result<Self, ExError> {
        let field = |name: &str| body.as_object().and_then(|o| o.get(name));

        Ok(Self {
            workbook_key: resolve_workbook_key(field("workbookKey"), default_key)?,
            data: field("data").cloned().unwrap_or(Value::Null),
            expected: ExpectedVersion::from_json(field("version")),
        })
    }
}

/// Result of a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No row existed; stored at version 1
    Created { workbook_key: String, version: u64 },
    /// An existing row was replaced
    Saved { workbook_key: String, version: u64 },
    /// The lock token did not match; nothing written
    Conflict {
        workbook_key: String,
        current_version: u64,
    },
    /// Payload refused before reaching storage
    Rejected(PayloadError),
}

impl SaveOutcome {
    fn label(&self) -> &'static str {
        match self {
            SaveOutcome::Created { .. } => "created",
            SaveOutcome::Saved { .. } => "saved",
            SaveOutcome::Conflict { .. } => "conflict",
            SaveOutcome::Rejected(_) => "rejected",
        }
    }
}

/// Snapshot operations over a store, with validation policy applied
#[derive(Debug, Clone)]
pub struct SnapshotService {
    store: SnapshotStore,
    policy: SnapshotPolicy,
}

impl SnapshotService {
    pub fn new(store: SnapshotStore, policy: SnapshotPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &SnapshotPolicy {
        &self.policy
    }

    pub fn default_key(&self) -> &str {
        &self.policy.default_key
    }

    /// Latest snapshot for `key`
    ///
    /// Absent and unreadable rows both yield `None`.
    pub fn fetch_latest(&self, key: &str) -> Result<Option<WorkbookSnapshot>> {
        log_op_start!("snapshot_latest", workbook_key = key);
        let start = std::time::Instant::now();

        let row = self.store.get(key).map_err(|e| {
            log_op_error!(
                "snapshot_latest",
                &e,
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        let snapshot = row.and_then(|row| {
            let version = row.version;
            let parsed = WorkbookSnapshot::from_stored(
                row.workbook_key,
                row.version,
                &row.data_json,
                row.updated_at,
            );
            if parsed.is_none() {
                tracing::warn!(
                    workbook_key = key,
                    version,
                    "Stored snapshot is unreadable; treating as absent"
                );
            }
            parsed
        });

        log_op_end!(
            "snapshot_latest",
            duration_ms = start.elapsed().as_millis() as u64,
            workbook_key = key,
            found = snapshot.is_some()
        );
        Ok(snapshot)
    }

    /// Validate and store a snapshot
    pub fn save(&self, request: SaveRequest) -> Result<SaveOutcome> {
        let key = request.workbook_key;
        log_op_start!(
            "snapshot_save",
            workbook_key = key.as_str(),
            locked = request.expected.is_lock()
        );
        let start = std::time::Instant::now();

        let payload =
            match SnapshotPayload::from_value(&request.data, self.policy.max_snapshot_bytes) {
                Ok(payload) => payload,
                Err(reason) => {
                    let outcome = SaveOutcome::Rejected(reason);
                    log_op_end!(
                        "snapshot_save",
                        duration_ms = start.elapsed().as_millis() as u64,
                        workbook_key = key.as_str(),
                        outcome = outcome.label()
                    );
                    return Ok(outcome);
                }
            };
        let size_bytes = payload.len() as u64;

        let put = self
            .store
            .put(&key, &payload, request.expected)
            .map_err(|e| {
                log_op_error!(
                    "snapshot_save",
                    &e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    workbook_key = key.as_str()
                );
                e
            })?;

        let version = match put {
            PutOutcome::Created { version } | PutOutcome::Updated { version } => version,
            PutOutcome::Conflict { current_version } => current_version,
        };
        let outcome = match put {
            PutOutcome::Created { version } => SaveOutcome::Created {
                workbook_key: key.clone(),
                version,
            },
            PutOutcome::Updated { version } => SaveOutcome::Saved {
                workbook_key: key.clone(),
                version,
            },
            PutOutcome::Conflict { current_version } => SaveOutcome::Conflict {
                workbook_key: key.clone(),
                current_version,
            },
        };

        log_op_end!(
            "snapshot_save",
            duration_ms = start.elapsed().as_millis() as u64,
            workbook_key = key.as_str(),
            outcome = outcome.label(),
            version = version,
            size_bytes = size_bytes
        );

        Ok(outcome)
    }

    /// Delete the snapshot for `key`; a missing key is not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        log_op_start!("snapshot_delete", workbook_key = key);
        let start = std::time::Instant::now();

        let existed = self.store.delete(key).map_err(|e| {
            log_op_error!(
                "snapshot_delete",
                &e,
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "snapshot_delete",
            duration_ms = start.elapsed().as_millis() as u64,
            workbook_key = key,
            existed = existed
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sheetkeep_core::errors::ExErrorKind;

    #[test]
    fn test_save_request_defaults() {
        let req = SaveRequest::from_json(&json!({"data": {}}), "default").unwrap();
        assert_eq!(req.workbook_key, "default");
        assert_eq!(req.expected, ExpectedVersion::Unchecked);
        assert_eq!(req.data, json!({}));
    }

    #[test]
    fn test_save_request_non_object_body_reads_as_empty() {
        let req = SaveRequest::from_json(&json!([1, 2]), "main").unwrap();
        assert_eq!(req.workbook_key, "main");
        assert_eq!(req.data, Value::Null);
    }

    #[test]
    fn test_save_request_coerces_key_and_version() {
        let req = SaveRequest::from_json(
            &json!({"workbookKey": 12, "data": {}, "version": "3"}),
            "default",
        )
        .unwrap();
        assert_eq!(req.workbook_key, "12");
        assert_eq!(req.expected, ExpectedVersion::Exact(3));

        let req =
            SaveRequest::from_json(&json!({"workbookKey": "", "version": 2.5}), "default").unwrap();
        assert_eq!(req.workbook_key, "default");
        assert_eq!(req.expected, ExpectedVersion::Unmatchable);
    }

    #[test]
    fn test_save_request_rejects_structured_key() {
        let err = SaveRequest::from_json(&json!({"workbookKey": {"a": 1}}), "default").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
        assert_eq!(err.message(), "invalid workbookKey");
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(SaveOutcome::Rejected(PayloadError::NotAnObject).label(), "rejected");
        assert_eq!(
            SaveOutcome::Conflict {
                workbook_key: "k".into(),
                current_version: 2
            }
            .label(),
            "conflict"
        );
    }
}
