//! SheetKeep Core - domain model, errors and logging
//!
//! - Workbook snapshot model with optimistic-lock tokens and payload
//!   validation
//! - LLM config, system prompt and conversation records
//! - Structured error facility (`ExError`)
//! - Structured logging facility and operation macros

pub mod errors;
pub mod logging_facility;
pub mod model;

/// Re-exported so the logging macros can name schema constants
pub use sheetkeep_core_types as types;

pub use errors::{ExError, ExErrorKind, Result};
pub use model::{ExpectedVersion, PayloadError, PutOutcome, SnapshotPayload, WorkbookSnapshot};
