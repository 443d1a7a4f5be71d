//! Two-phase upload of many padded CSV files into one table.
//!
//! - [`UploadCsv`] is the declarative task definition (usually deserialized from config).
//! - [`UploadCsv::prepare`] resolves everything that does not need the filesystem or the
//!   database, including the dialect's primary-key type, into an immutable [`PreparedUpload`].
//! - [`PreparedUpload::run`] reads every source, builds the combined table, and writes it
//!   through a [`TableWriter`], committing once.
//!
//! ```no_run
//! use rusqlite::Connection;
//!
//! use padded_csv_upload::padded::HeaderLength;
//! use padded_csv_upload::source::CsvSourceGlob;
//! use padded_csv_upload::sql::{SqlDialect, SqliteWriter, TableRef};
//! use padded_csv_upload::upload::{UploadCsv, UploadOptions};
//!
//! # fn main() -> Result<(), padded_csv_upload::UploadError> {
//! let task = UploadCsv {
//!     table: TableRef::new("sales"),
//!     sources: vec![CsvSourceGlob::new("exports/**/*.csv", HeaderLength::Auto)],
//!     index: Some("rowid".to_string()),
//!     ..Default::default()
//! };
//! let prepared = task.prepare(SqlDialect::Sqlite, UploadOptions::default());
//!
//! let mut conn = Connection::open("warehouse.db")?;
//! let report = prepared.run(SqliteWriter::begin(&mut conn)?)?;
//! println!("{} rows from {} files", report.rows, report.sources);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{UploadError, UploadResult};
use crate::ingestion::csv::{CsvReadOptions, read_csv};
use crate::ingestion::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use crate::source::{CsvSource, CsvSourceGlob};
use crate::sql::{RawColumnType, RawTypeOverrides, SqlDialect, TableRef, TableWriter};
use crate::types::{DataSet, DataType, Field, Value};

/// Declarative upload task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadCsv {
    /// Destination table.
    pub table: TableRef,
    /// Sources in the order their rows should appear.
    pub sources: Vec<CsvSourceGlob>,
    /// Name of an optional 0-based ordinal primary key column.
    #[serde(default)]
    pub index: Option<String>,
    /// Options passed through to the CSV parser for every source.
    #[serde(default)]
    pub read_csv_args: CsvReadOptions,
    /// Read and parse sources on the rayon pool instead of one after another.
    #[serde(default)]
    pub parallel_reads: bool,
}

impl Default for UploadCsv {
    fn default() -> Self {
        Self {
            table: TableRef::new("upload"),
            sources: Vec::new(),
            index: None,
            read_csv_args: CsvReadOptions::default(),
            parallel_reads: false,
        }
    }
}

/// Runtime options that do not come from the task definition.
#[derive(Clone)]
pub struct UploadOptions {
    /// Optional observer for per-source logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Ordinal primary key column requested for the combined table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    pub name: String,
    pub raw_type: RawColumnType,
}

/// Summary of a committed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    /// Destination table.
    pub table: TableRef,
    /// Number of concrete source files read.
    pub sources: usize,
    /// Rows written.
    pub rows: usize,
}

impl UploadCsv {
    /// Resolve the task for `dialect`. Touches neither the filesystem nor the database.
    pub fn prepare(self, dialect: SqlDialect, options: UploadOptions) -> PreparedUpload {
        let index = self.index.map(|name| IndexColumn {
            name,
            raw_type: dialect.autoincrement_primary_key(),
        });
        PreparedUpload {
            dialect,
            table: self.table,
            sources: self.sources,
            index,
            read_csv_args: self.read_csv_args,
            parallel_reads: self.parallel_reads,
            options,
        }
    }
}

/// An upload ready to run; immutable once prepared.
#[derive(Debug)]
pub struct PreparedUpload {
    dialect: SqlDialect,
    table: TableRef,
    sources: Vec<CsvSourceGlob>,
    index: Option<IndexColumn>,
    read_csv_args: CsvReadOptions,
    parallel_reads: bool,
    options: UploadOptions,
}

impl PreparedUpload {
    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn index(&self) -> Option<&IndexColumn> {
        self.index.as_ref()
    }

    /// Expand every glob, in configured order, into concrete sources.
    pub fn expand_sources(&self) -> UploadResult<Vec<CsvSource>> {
        let mut out = Vec::new();
        for glob in &self.sources {
            let before = out.len();
            for source in glob.expand()? {
                out.push(source?);
            }
            debug!(pattern = %glob.glob, matches = out.len() - before, "expanded glob");
        }
        Ok(out)
    }

    /// Read one source: extract its data region, parse it, apply its renames.
    pub fn load_source(&self, source: &CsvSource) -> UploadResult<DataSet> {
        let ctx = IngestionContext {
            path: source.path.clone(),
            header_length: source.header_length,
        };

        let result = source
            .open()
            .and_then(|reader| read_csv(reader, &self.read_csv_args))
            .and_then(|mut ds| {
                ds.rename_columns(&source.remap)?;
                Ok(ds)
            });

        if let Some(obs) = self.options.observer.as_ref() {
            match &result {
                Ok(ds) => obs.on_success(&ctx, IngestionStats { rows: ds.row_count() }),
                Err(e) => {
                    let sev = IngestionSeverity::for_error(e);
                    obs.on_failure(&ctx, sev, e);
                    if sev >= self.options.alert_at_or_above {
                        obs.on_alert(&ctx, sev, e);
                    }
                }
            }
        }

        result
    }

    /// Build the combined table and its raw column types without writing anything.
    ///
    /// Returns the number of sources read alongside the table.
    pub fn build_table(&self) -> UploadResult<(DataSet, RawTypeOverrides, usize)> {
        let sources = self.expand_sources()?;

        let parts: Vec<DataSet> = if self.parallel_reads {
            sources
                .par_iter()
                .map(|source| self.load_source(source))
                .collect::<UploadResult<_>>()?
        } else {
            sources
                .iter()
                .map(|source| self.load_source(source))
                .collect::<UploadResult<_>>()?
        };

        let mut combined = DataSet::concat(parts)?;

        let mut overrides = RawTypeOverrides::new();
        if let Some(index) = &self.index {
            let ordinals = (0..combined.row_count()).map(|i| Value::Int64(i as i64)).collect();
            combined.insert_column(0, Field::new(index.name.clone(), DataType::Int64), ordinals)?;
            overrides.insert(index.name.clone(), index.raw_type.clone());
        }

        Ok((combined, overrides, sources.len()))
    }

    /// Run the upload: build the combined table, replace the destination, commit.
    ///
    /// Any failure leaves the transaction uncommitted.
    pub fn run<W: TableWriter>(&self, mut writer: W) -> UploadResult<UploadReport> {
        if writer.dialect() != self.dialect {
            return Err(UploadError::DialectMismatch {
                prepared: self.dialect,
                writer: writer.dialect(),
            });
        }

        let (combined, overrides, sources) = self.build_table()?;
        let rows = combined.row_count();

        writer.replace_table(&self.table, combined, &overrides)?;
        writer.commit()?;

        info!(table = %self.table, sources, rows, "upload committed");
        Ok(UploadReport {
            table: self.table.clone(),
            sources,
            rows,
        })
    }
}
