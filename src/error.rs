use std::path::PathBuf;

use thiserror::Error;

use crate::sql::SqlDialect;

/// Convenience result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Error type returned by extraction, parsing, and upload functions.
///
/// A single enum shared by every stage of a run; any variant aborts the whole upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Underlying I/O error while reading an already-open source.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be opened (missing, unreadable, ...).
    #[error("failed to open source '{}': {source}", .path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Auto header detection reached end of input without finding two consecutive padding
    /// lines followed by a non-padding line.
    #[error("data region not found after scanning {lines_scanned} lines (expected at least two padding lines before the header)")]
    DataRegionNotFound { lines_scanned: usize },

    /// CSV tokenizer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A value could not be parsed into the requested [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// Parsed tables cannot be combined (duplicate columns, conflicting types, ...).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A directory could not be read while expanding a glob.
    #[error("glob expansion failed: {0}")]
    Glob(#[from] glob::GlobError),

    /// Error raised by the database while writing or committing.
    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// The run was prepared for one dialect but handed a writer for another.
    #[error("upload prepared for {prepared} but writer speaks {writer}")]
    DialectMismatch {
        prepared: SqlDialect,
        writer: SqlDialect,
    },

    /// Invalid configuration value.
    #[error("config error: {message}")]
    Config { message: String },

    /// YAML configuration could not be deserialized.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON configuration could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
