//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! The store only emits `tracing::debug!()` for internal details.

#![allow(clippy::result_large_err)]

pub mod conversations;
pub mod llm_configs;
pub mod snapshot;
pub mod system_prompts;

use sheetkeep_core::{log_op_end, log_op_error, log_op_start};
use sheetkeep_store::errors::Result;

/// Run `f` between start/end log events for `op`
pub(crate) fn logged<T>(op: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    log_op_start!(op);
    let start = std::time::Instant::now();

    let result = f();
    match &result {
        Ok(_) => {
            log_op_end!(op, duration_ms = start.elapsed().as_millis() as u64);
        }
        Err(e) => {
            log_op_error!(op, e, duration_ms = start.elapsed().as_millis() as u64);
        }
    }
    result
}
