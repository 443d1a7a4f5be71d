//! Extraction of the data block from padded CSV files.
//!
//! Padded files wrap a CSV table in non-tabular text: a human-readable banner, blank or
//! empty-quote separator rows, and trailing notes. This module finds the table and exposes
//! it as a plain [`std::io::Read`] so any CSV parser can consume it unmodified.
//!
//! - [`classify`]: decides whether a line is padding
//! - [`region`]: locates the header ([`HeaderLength`]) and stops at the next padding line
//! - [`stream`]: wraps the resulting lines in a reader
//!
//! ## Example
//!
//! ```rust
//! use std::io::{Cursor, Read};
//!
//! use padded_csv_upload::padded::{HeaderLength, padded_csv_reader};
//!
//! # fn main() -> Result<(), padded_csv_upload::UploadError> {
//! let file = "Quarterly export\n\"\",\"\"\n\"\",\"\"\nid,name\n1,Ada\n\nTotal: 1\n";
//! let mut reader = padded_csv_reader(Cursor::new(file), HeaderLength::Auto)?;
//!
//! let mut csv = String::new();
//! reader.read_to_string(&mut csv)?;
//! assert_eq!(csv, "id,name\n1,Ada\n");
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod region;
pub mod stream;

use std::io::BufRead;

use crate::error::UploadResult;

pub use classify::is_padding;
pub use region::{HeaderLength, Located, RawLines, RegionLines, UntilPadding, locate, padded_csv_lines};
pub use stream::LineReader;

/// Reader over the data region of a padded CSV file.
pub type PaddedCsvReader<R> = LineReader<RegionLines<R>>;

/// Wrap `reader` so that reading it yields only the data region (header + rows).
///
/// Fails up front with [`crate::UploadError::DataRegionNotFound`] when `header_length` is
/// [`HeaderLength::Auto`] and no header can be found.
pub fn padded_csv_reader<R: BufRead>(reader: R, header_length: HeaderLength) -> UploadResult<PaddedCsvReader<R>> {
    Ok(LineReader::new(padded_csv_lines(reader, header_length)?))
}
