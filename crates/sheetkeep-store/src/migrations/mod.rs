//! Migration framework
//!
//! - Embedded SQL migrations applied in order
//! - Idempotent application tracked in `schema_version`
//! - Checksums recorded on apply and verified on every later run

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
