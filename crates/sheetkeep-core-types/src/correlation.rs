//! Request correlation identifiers
//!
//! Every API request carries a `RequestId`, either taken from the incoming
//! `x-request-id` header or freshly generated, so that log lines and error
//! payloads produced while serving it can be tied together.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Header used to propagate a request id from the client
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Unique identifier for a single request or operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new RequestId using UUIDv7 (time ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Accept a caller supplied id if it is a well-formed UUID
    pub fn from_header_value(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(|id| Self(id.hyphenated().to_string()))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
