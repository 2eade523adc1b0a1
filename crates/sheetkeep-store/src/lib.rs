//! SheetKeep Store - SQLite persistence
//!
//! - `db`: connection setup, pooling and the lazily opened `DbHandle`
//! - `migrations`: embedded, checksummed schema migrations
//! - `snapshot`: versioned workbook snapshots with compare-and-swap writes
//! - `repo`: LLM configs, conversations, system prompts and settings

#![allow(clippy::result_large_err)]

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod snapshot;

pub use db::{Database, DbHandle};
pub use errors::Result;
pub use snapshot::{SnapshotStore, StoredSnapshot};
