//! CSV parsing into an in-memory [`DataSet`].
//!
//! This is the tabular parser that sits behind the padded-file extractor: it takes any
//! [`std::io::Read`] (normally a [`crate::padded::PaddedCsvReader`]) and knows nothing about
//! banners or trailers.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;

use serde::Deserialize;

use crate::error::{UploadError, UploadResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Parser options passed through from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvReadOptions {
    /// Field delimiter (ASCII).
    pub delimiter: char,
    /// Quote character (ASCII).
    pub quote: char,
    /// Trim surrounding whitespace from every value.
    pub trim: bool,
    /// Per-column type hints by header name. Unhinted columns are read as [`DataType::Utf8`];
    /// hints for columns a file does not have are ignored.
    pub dtypes: BTreeMap<String, DataType>,
    /// Extra tokens read as [`Value::Null`] (empty cells are always null).
    pub null_values: Vec<String>,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            trim: true,
            dtypes: BTreeMap::new(),
            null_values: Vec::new(),
        }
    }
}

impl CsvReadOptions {
    fn reader_builder(&self) -> UploadResult<csv::ReaderBuilder> {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(true)
            .delimiter(ascii_byte("delimiter", self.delimiter)?)
            .quote(ascii_byte("quote", self.quote)?);
        Ok(builder)
    }
}

fn ascii_byte(option: &str, c: char) -> UploadResult<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(UploadError::Config {
            message: format!("{option} must be a single ASCII character, got {c:?}"),
        })
    }
}

/// Parse CSV text (header line first) into a [`DataSet`].
///
/// Rules:
///
/// - The first record is the header; duplicate names become `name`, `name.1`, `name.2`, ...
/// - Each value is parsed according to its column's hinted type (default UTF-8).
/// - Empty input yields a data set with no columns and no rows.
pub fn read_csv<R: Read>(reader: R, options: &CsvReadOptions) -> UploadResult<DataSet> {
    let mut rdr = options.reader_builder()?.from_reader(reader);
    read_csv_records(&mut rdr, options)
}

/// Parse CSV data from an existing CSV reader.
pub fn read_csv_records<R: Read>(rdr: &mut csv::Reader<R>, options: &CsvReadOptions) -> UploadResult<DataSet> {
    let headers = rdr.headers()?.clone();
    let names = dedupe_headers(headers.iter().map(|h| if options.trim { h.trim() } else { h }));

    let schema = Schema::new(
        names
            .into_iter()
            .map(|name| {
                let data_type = options.dtypes.get(&name).copied().unwrap_or(DataType::Utf8);
                Field::new(name, data_type)
            })
            .collect(),
    );

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.len());
        for (idx, field) in schema.fields.iter().enumerate() {
            let raw = record.get(idx).unwrap_or("");
            row.push(parse_typed_value(user_row, field, raw, options)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema, rows))
}

fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let headers: Vec<&str> = headers.collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut out = Vec::with_capacity(headers.len());
    for header in headers {
        let mut name = header.to_owned();
        let mut suffix = 0usize;
        while taken.contains(&name) {
            suffix += 1;
            name = format!("{header}.{suffix}");
        }
        taken.insert(name.clone());
        out.push(name);
    }
    out
}

fn parse_typed_value(row: usize, field: &Field, raw: &str, options: &CsvReadOptions) -> UploadResult<Value> {
    let value = if options.trim { raw.trim() } else { raw };
    if value.is_empty() || options.null_values.iter().any(|n| n == value) {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| UploadError::ParseError {
        row,
        column: field.name.clone(),
        raw: raw.to_owned(),
        message,
    };

    match field.data_type {
        DataType::Utf8 => Ok(Value::Utf8(value.to_owned())),
        DataType::Int64 => value
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => value
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Bool => parse_bool(value).map(Value::Bool).map_err(parse_error),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
