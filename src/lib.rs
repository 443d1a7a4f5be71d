//! `padded-csv-upload` ingests CSV tables that are wrapped in non-tabular padding (report
//! banners, blank or `"",""` separator rows, trailing notes) and uploads many such files into
//! a single SQL table.
//!
//! The library has three layers:
//!
//! 1. [`padded`]: finds the data region of one file and exposes it as a plain
//!    [`std::io::Read`], lazily and without buffering the file.
//! 2. [`ingestion`]: parses that stream into an in-memory [`types::DataSet`].
//! 3. [`upload`]: expands glob sources, renames columns, concatenates tables, optionally adds
//!    an ordinal primary key, and writes the result through [`sql::TableWriter`].
//!
//! ## Header detection
//!
//! Each source has a [`padded::HeaderLength`]:
//!
//! - `auto`: the header is the first non-blank line preceded by at least two consecutive
//!   padding lines (a single blank line inside a banner does not count)
//! - `N`: skip exactly `N` lines
//!
//! Either way the data region ends at the next padding line (or end of file).
//!
//! ## Quick example: read one padded file
//!
//! ```rust
//! use std::io::Cursor;
//!
//! use padded_csv_upload::ingestion::{CsvReadOptions, read_csv};
//! use padded_csv_upload::padded::{HeaderLength, padded_csv_reader};
//! use padded_csv_upload::types::Value;
//!
//! # fn main() -> Result<(), padded_csv_upload::UploadError> {
//! let file = "Store report\nGenerated 2024-01-01\n\n\nid,name\n1,Ada\n2,Grace\n\nEnd of report\n";
//! let reader = padded_csv_reader(Cursor::new(file), HeaderLength::Auto)?;
//! let ds = read_csv(reader, &CsvReadOptions::default())?;
//!
//! assert_eq!(ds.row_count(), 2);
//! assert_eq!(ds.rows[1][1], Value::Utf8("Grace".to_string()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`padded`]: padding classification, data-region location, reader adapter
//! - [`source`]: concrete sources and glob expansion
//! - [`ingestion`]: CSV parsing and per-source observers
//! - [`sql`]: dialects, raw column types, SQLite writer
//! - [`upload`]: the two-phase orchestrator
//! - [`config`]: YAML/JSON task loading
//! - [`types`]: in-memory table model
//! - [`error`]: error type shared by every layer

pub mod config;
pub mod error;
pub mod ingestion;
pub mod padded;
pub mod source;
pub mod sql;
pub mod types;
pub mod upload;

pub use error::{UploadError, UploadResult};
