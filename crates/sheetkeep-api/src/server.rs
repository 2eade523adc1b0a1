//! Router assembly and the serve loop

#![allow(clippy::result_large_err)]

use crate::config::ServerConfig;
use crate::request_id::propagate_request_id;
use crate::routes::api_routes;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use sheetkeep_core::errors::{ExError, ExErrorKind};
use sheetkeep_store::DbHandle;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Full application: `/api` routes plus body limit, CORS, tracing and
/// request-id layers
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(propagate_request_id))
        .with_state(state)
}

/// Open the database, bind and serve until Ctrl-C
///
/// # Errors
///
/// `Persistence`/`Io` if the database cannot be opened, `Io` if the
/// address cannot be bound or the server fails.
pub async fn serve(config: ServerConfig) -> Result<(), ExError> {
    let handle = Arc::new(DbHandle::new(config.database_path.clone()));

    let opener = Arc::clone(&handle);
    let db = tokio::task::spawn_blocking(move || opener.get())
        .await
        .map_err(|e| {
            ExError::new(ExErrorKind::Internal)
                .with_op("open_database")
                .with_message(e.to_string())
        })??;

    let app = build_app(AppState::new(db, &config));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| io_error("bind", e))?;
    tracing::info!(
        address = %address,
        database = %config.database_path.display(),
        max_snapshot_bytes = config.max_snapshot_bytes,
        "Listening on http://{}/api",
        address
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| io_error("serve", e));

    handle.close();
    tracing::info!("Server stopped");
    served
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires; never resolves if the signal cannot be
/// installed, so the server keeps running until the process is killed
async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
}

fn io_error(op: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(op)
        .with_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_fires_on_signal() {
        let waited =
            tokio::time::timeout(Duration::from_millis(200), wait_for_shutdown(async { Ok(()) }))
                .await;
        assert!(waited.is_ok());
    }

    #[tokio::test]
    async fn test_failed_signal_install_keeps_serving() {
        let failing = async {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "signal handler unavailable",
            ))
        };
        let waited =
            tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(failing)).await;
        assert!(waited.is_err(), "shutdown must not fire when Ctrl-C is unavailable");
    }
}
