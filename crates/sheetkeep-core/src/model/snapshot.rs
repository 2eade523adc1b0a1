//! Workbook snapshot model and write-path validation

use crate::errors::{ExError, ExErrorKind};
use crate::model::coerce::{is_falsy, json_number};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Key used when a caller does not name a workbook
pub const DEFAULT_WORKBOOK_KEY: &str = "default";

/// Ceiling on the serialized size of a snapshot's `data` (2 MiB)
pub const DEFAULT_MAX_SNAPSHOT_BYTES: usize = 2 * 1024 * 1024;

/// The latest persisted state of one workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookSnapshot {
    pub workbook_key: String,
    pub version: u64,
    pub data: Map<String, Value>,
    pub updated_at: String,
}

impl WorkbookSnapshot {
    /// Rebuild a snapshot from its stored columns.
    ///
    /// Returns `None` when the row is unusable: the blob is not JSON, is not
    /// a JSON object, or the version is not positive.
    pub fn from_stored(
        workbook_key: String,
        version: i64,
        data_json: &str,
        updated_at: String,
    ) -> Option<Self> {
        let version = u64::try_from(version).ok().filter(|v| *v >= 1)?;
        match serde_json::from_str::<Value>(data_json).ok()? {
            Value::Object(data) => Some(Self {
                workbook_key,
                version,
                data,
                updated_at,
            }),
            _ => None,
        }
    }
}

/// Optimistic lock token supplied with a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// No lock requested: the write goes through (last writer wins)
    Unchecked,
    /// Write only if the stored version equals this value
    Exact(u64),
    /// A positive token that no stored version can equal (e.g. `1.5`)
    Unmatchable,
}

impl ExpectedVersion {
    /// Interpret the `version` field of a save request
    ///
    /// Absent, zero, negative, non-finite or non-numeric values mean no
    /// lock. Positive whole numbers are exact locks.
    pub fn from_json(value: Option<&Value>) -> Self {
        match json_number(value) {
            Some(n) if n.is_finite() && n > 0.0 => {
                if n.fract() == 0.0 && n <= u64::MAX as f64 {
                    ExpectedVersion::Exact(n as u64)
                } else {
                    ExpectedVersion::Unmatchable
                }
            }
            _ => ExpectedVersion::Unchecked,
        }
    }

    /// Interpret an already typed client version (`0` means no lock)
    pub fn from_client(version: Option<u64>) -> Self {
        match version {
            Some(v) if v > 0 => ExpectedVersion::Exact(v),
            _ => ExpectedVersion::Unchecked,
        }
    }

    pub fn is_lock(&self) -> bool {
        !matches!(self, ExpectedVersion::Unchecked)
    }

    /// Whether a write may replace a row currently at `current`
    pub fn permits(&self, current: u64) -> bool {
        match self {
            ExpectedVersion::Unchecked => true,
            ExpectedVersion::Exact(v) => *v == current,
            ExpectedVersion::Unmatchable => false,
        }
    }
}

/// Reasons a snapshot payload is refused before it reaches storage
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("data required")]
    NotAnObject,

    #[error("data not serializable")]
    NotSerializable,

    #[error("workbook data too large (limit {})", format_limit(*limit))]
    TooLarge { size: usize, limit: usize },
}

impl From<PayloadError> for ExError {
    fn from(err: PayloadError) -> Self {
        let kind = match err {
            PayloadError::TooLarge { .. } => ExErrorKind::PayloadTooLarge,
            PayloadError::NotAnObject | PayloadError::NotSerializable => ExErrorKind::InvalidInput,
        };
        ExError::new(kind)
            .with_op("validate_snapshot_payload")
            .with_message(err.to_string())
    }
}

/// Render a byte ceiling the way it appears in error messages ("2MB")
pub fn format_limit(limit: usize) -> String {
    const MIB: usize = 1024 * 1024;
    const KIB: usize = 1024;
    if limit >= MIB && limit % MIB == 0 {
        format!("{}MB", limit / MIB)
    } else if limit >= KIB && limit % KIB == 0 {
        format!("{}KB", limit / KIB)
    } else {
        format!("{} bytes", limit)
    }
}

/// A validated, serialized snapshot body
///
/// Only constructible through [`SnapshotPayload::from_value`], so holding
/// one proves the data is a JSON object within the size ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPayload {
    json: String,
}

impl SnapshotPayload {
    pub fn from_value(data: &Value, max_bytes: usize) -> Result<Self, PayloadError> {
        if !data.is_object() {
            return Err(PayloadError::NotAnObject);
        }
        let json = serde_json::to_string(data).map_err(|_| PayloadError::NotSerializable)?;
        if json.len() > max_bytes {
            return Err(PayloadError::TooLarge {
                size: json.len(),
                limit: max_bytes,
            });
        }
        Ok(Self { json })
    }

    pub fn as_json(&self) -> &str {
        &self.json
    }

    /// Serialized size in UTF-8 bytes
    pub fn len(&self) -> usize {
        self.json.len()
    }

    pub fn is_empty(&self) -> bool {
        self.json.is_empty()
    }
}

/// Result of a versioned write at the store level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// No row existed; one was created at version 1
    Created { version: u64 },
    /// The existing row was replaced and bumped to `version`
    Updated { version: u64 },
    /// The lock token did not match; nothing was written
    Conflict { current_version: u64 },
}

/// Resolve the workbook key of a request body
///
/// Missing or falsy values (`null`, `""`, `0`, `false`) select the default
/// key; other scalars are used by their text. Objects and arrays are
/// rejected.
pub fn resolve_workbook_key(value: Option<&Value>, default_key: &str) -> Result<String, ExError> {
    if is_falsy(value) {
        return Ok(default_key.to_string());
    }
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(true)) => Ok("true".to_string()),
        _ => Err(ExError::invalid_input("resolve_workbook_key", "invalid workbookKey")),
    }
}

/// Resolve a workbook key passed as a query parameter
pub fn resolve_query_key(value: Option<&str>, default_key: &str) -> String {
    match value {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => default_key.to_string(),
    }
}
