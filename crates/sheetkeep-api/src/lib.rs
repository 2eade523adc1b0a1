//! SheetKeep API - local HTTP server
//!
//! Exposes workbook snapshots, LLM configs, conversations, system prompts
//! and the active-prompt setting under `/api`. Handlers translate HTTP to
//! engine commands; blocking SQLite work runs on the blocking thread pool.

#![allow(clippy::result_large_err)]

pub mod config;
pub mod error;
pub mod extract;
pub mod request_id;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ConfigOverrides, ServerConfig};
pub use error::ApiError;
pub use server::{build_app, serve};
pub use state::AppState;
