use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;
use tracing::info;
use tracing_subscriber::EnvFilter;

use padded_csv_upload::config::load_upload_config;
use padded_csv_upload::ingestion::{CompositeObserver, FileObserver, IngestionObserver, TracingObserver};
use padded_csv_upload::sql::{SqlDialect, SqliteWriter};
use padded_csv_upload::upload::UploadOptions;

#[derive(Parser)]
#[command(name = "padded-csv-upload")]
#[command(about = "Upload banner-padded CSV files into one SQLite table")]
struct Args {
    /// Upload task definition (.yaml, .yml or .json)
    config: PathBuf,

    /// SQLite database file to write into (created if missing)
    #[arg(short, long)]
    database: PathBuf,

    /// Also append per-source events to this file
    #[arg(long)]
    event_log: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let task = load_upload_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    info!(config = %args.config.display(), table = %task.table, globs = task.sources.len(), "loaded upload task");

    let mut observers: Vec<Arc<dyn IngestionObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = &args.event_log {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    let options = UploadOptions {
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        ..Default::default()
    };

    let prepared = task.prepare(SqlDialect::Sqlite, options);

    let mut conn = Connection::open(&args.database)
        .with_context(|| format!("opening {}", args.database.display()))?;
    let report = prepared.run(SqliteWriter::begin(&mut conn)?)?;

    println!(
        "uploaded {} rows from {} files into {}",
        report.rows, report.sources, report.table
    );
    Ok(())
}
