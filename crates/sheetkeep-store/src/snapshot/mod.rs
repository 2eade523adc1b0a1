//! Workbook snapshot persistence
//!
//! ## Responsibilities
//!
//! - One row per workbook key (upsert, no history)
//! - Versioned writes: create at 1, +1 per accepted overwrite
//! - Optimistic concurrency via the caller's expected version
//! - Atomic read-compare-write per key
//!
//! ## Non-Responsibilities
//!
//! - Payload shape/size validation (`SnapshotPayload` in `sheetkeep-core`)
//! - Parsing stored blobs and request mapping (`sheetkeep-engine`)

pub mod store;

pub use store::{SnapshotStore, StoredSnapshot};
