//! `sheetkeep serve`

use clap::Args;
use sheetkeep_api::{ConfigOverrides, ServerConfig};
use sheetkeep_core::logging_facility::{self, Profile};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// SQLite database file (created if missing)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Ceiling on serialized snapshot data, in bytes
    #[arg(long)]
    pub max_snapshot_bytes: Option<usize>,

    /// Workbook key used when a request names none
    #[arg(long)]
    pub default_key: Option<String>,

    /// development, production or test
    #[arg(long)]
    pub log_profile: Option<Profile>,
}

pub fn execute(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load(args.config.as_deref())?.apply_overrides(ConfigOverrides {
        host: args.host,
        port: args.port,
        database_path: args.db,
        max_snapshot_bytes: args.max_snapshot_bytes,
        default_workbook_key: args.default_key,
        log_profile: args.log_profile,
    })?;

    logging_facility::init(config.log_profile);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(sheetkeep_api::serve(config))?;
    Ok(())
}
