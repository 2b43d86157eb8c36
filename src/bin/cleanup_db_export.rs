//! # Cleanup DB Export - Entry Point
//!
//! Companion tool: rimuove i dump `.data.sql` rigenerabili da una directory
//! di export del database prima che il backup venga importato in un ambiente
//! di sviluppo. Un solo passaggio, nessuno stato, fallisce al primo errore.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use backup_minify::cleanup::cleanup_db_export;

#[derive(Parser)]
#[command(name = "cleanup-db-export")]
#[command(about = "Delete regeneratable .data.sql exports from a database dump directory")]
struct Args {
    /// Backup root containing the db/latest dump directory
    #[arg(long = "sourcePath")]
    source_path: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let source_path = args.source_path.ok_or_else(|| {
        anyhow::anyhow!("Please provide a valid source path using --sourcePath=<path>")
    })?;

    let deleted = cleanup_db_export(&source_path)?;
    info!("Done. Deleted {} files.", deleted);

    Ok(())
}
