//! `sheetkeep snapshot latest|save|delete`
//!
//! Works on the database file directly, without a running server.

use clap::{Args, Subcommand};
use serde_json::{json, Value};
use sheetkeep_api::{ConfigOverrides, ServerConfig};
use sheetkeep_core::logging_facility;
use sheetkeep_core::model::ExpectedVersion;
use sheetkeep_engine::commands::snapshot::{SaveOutcome, SaveRequest, SnapshotService};
use sheetkeep_store::{Database, SnapshotStore};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Print the latest snapshot as JSON (`null` if none)
    Latest(TargetArgs),
    /// Save the JSON object in a file
    Save(SaveArgs),
    /// Delete a snapshot (no error if missing)
    Delete(TargetArgs),
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Workbook key (defaults to the configured default key)
    #[arg(long)]
    pub key: Option<String>,

    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// File holding the workbook data object
    #[arg(long)]
    pub file: PathBuf,

    /// Version the data was based on; omit or 0 to overwrite unconditionally
    #[arg(long)]
    pub version: Option<u64>,

    #[command(flatten)]
    pub target: TargetArgs,
}

pub fn execute(args: SnapshotArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        SnapshotCommand::Latest(target) => execute_latest(target),
        SnapshotCommand::Save(save) => execute_save(save),
        SnapshotCommand::Delete(target) => execute_delete(target),
    }
}

fn open_service(target: &TargetArgs) -> Result<(SnapshotService, String), Box<dyn std::error::Error>> {
    let config = ServerConfig::load(None)?.apply_overrides(ConfigOverrides {
        database_path: target.db.clone(),
        ..ConfigOverrides::default()
    })?;
    logging_facility::init(config.log_profile);

    let db = Arc::new(Database::open(&config.database_path)?);
    let service = SnapshotService::new(SnapshotStore::new(db), config.snapshot_policy());
    let key = match &target.key {
        Some(key) if !key.is_empty() => key.clone(),
        _ => service.default_key().to_string(),
    };
    Ok((service, key))
}

fn execute_latest(target: TargetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (service, key) = open_service(&target)?;
    let snapshot = service.fetch_latest(&key)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn execute_save(args: SaveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (service, key) = open_service(&args.target)?;

    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("cannot read {}: {}", args.file.display(), e))?;
    let data: Value = serde_json::from_str(&text)
        .map_err(|e| format!("{} is not valid JSON: {}", args.file.display(), e))?;

    let outcome = service.save(SaveRequest {
        workbook_key: key,
        data,
        expected: ExpectedVersion::from_client(args.version),
    })?;

    match outcome {
        SaveOutcome::Created {
            workbook_key,
            version,
        } => {
            println!(
                "{}",
                json!({ "ok": true, "created": true, "workbookKey": workbook_key, "version": version })
            );
            Ok(())
        }
        SaveOutcome::Saved {
            workbook_key,
            version,
        } => {
            println!(
                "{}",
                json!({ "ok": true, "created": false, "workbookKey": workbook_key, "version": version })
            );
            Ok(())
        }
        SaveOutcome::Conflict {
            workbook_key,
            current_version,
        } => Err(format!(
            "version conflict on '{}' (current version {})",
            workbook_key, current_version
        )
        .into()),
        SaveOutcome::Rejected(reason) => Err(reason.into()),
    }
}

fn execute_delete(target: TargetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (service, key) = open_service(&target)?;
    service.remove(&key)?;
    println!("{}", json!({ "ok": true, "workbookKey": key }));
    Ok(())
}
