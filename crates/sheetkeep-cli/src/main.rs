//! SheetKeep CLI
//!
//! Runs the local API server and offers offline access to workbook
//! snapshots.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sheetkeep")]
#[command(about = "SheetKeep - local persistence for spreadsheet workbooks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP API until Ctrl-C
    Serve(commands::serve::ServeArgs),
    /// Read, write or delete workbook snapshots directly
    Snapshot(commands::snapshot::SnapshotArgs),
}

fn main() {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args),
        Commands::Snapshot(args) => commands::snapshot::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
