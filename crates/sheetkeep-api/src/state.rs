//! Shared handler state

#![allow(clippy::result_large_err)]

use crate::config::ServerConfig;
use crate::error::ApiError;
use sheetkeep_core::errors::{ExError, ExErrorKind};
use sheetkeep_engine::commands::snapshot::SnapshotService;
use sheetkeep_store::{Database, SnapshotStore};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub snapshots: SnapshotService,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: &ServerConfig) -> Self {
        let snapshots = SnapshotService::new(
            SnapshotStore::new(Arc::clone(&db)),
            config.snapshot_policy(),
        );
        Self {
            db,
            snapshots,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// Run blocking store work off the async executor
pub async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ExError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            ApiError(
                ExError::new(ExErrorKind::Internal)
                    .with_op("spawn_blocking")
                    .with_message(e.to_string()),
            )
        })?
        .map_err(ApiError)
}
