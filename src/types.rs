//! Core in-memory table model.
//!
//! Every source is parsed into a [`DataSet`] (a [`Schema`] of typed [`Field`]s plus row-major
//! [`Value`]s). Per-source data sets are renamed, concatenated, and optionally given a leading
//! ordinal column before they are handed to the persistence layer.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::error::{UploadError, UploadResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 64-bit signed integer.
    #[serde(alias = "int", alias = "integer")]
    Int64,
    /// 64-bit floating point number.
    #[serde(alias = "float", alias = "double")]
    Float64,
    /// Boolean.
    #[serde(alias = "boolean")]
    Bool,
    /// UTF-8 string.
    #[serde(alias = "str", alias = "string", alias = "text")]
    Utf8,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of one column, top to bottom. `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Rename columns according to `remap` (`old -> new`).
    ///
    /// Keys that do not name an existing column are ignored. Fails if renaming would leave two
    /// columns with the same name.
    pub fn rename_columns(&mut self, remap: &BTreeMap<String, String>) -> UploadResult<()> {
        if remap.is_empty() {
            return Ok(());
        }
        for field in &mut self.schema.fields {
            if let Some(new_name) = remap.get(&field.name) {
                field.name = new_name.clone();
            }
        }

        let mut seen = HashSet::with_capacity(self.schema.len());
        for name in self.schema.field_names() {
            if !seen.insert(name) {
                return Err(UploadError::SchemaMismatch {
                    message: format!("rename produced duplicate column '{name}'"),
                });
            }
        }
        Ok(())
    }

    /// Insert a column at `position`, one value per existing row.
    ///
    /// Fails with [`UploadError::SchemaMismatch`] if the name is taken, `values` does not hold
    /// exactly one value per row, or `position` is past the last column.
    pub fn insert_column(&mut self, position: usize, field: Field, values: Vec<Value>) -> UploadResult<()> {
        if self.schema.index_of(&field.name).is_some() {
            return Err(UploadError::SchemaMismatch {
                message: format!("cannot insert column '{}': it already exists", field.name),
            });
        }
        if values.len() != self.rows.len() {
            return Err(UploadError::SchemaMismatch {
                message: format!(
                    "cannot insert column '{}': {} values for {} rows",
                    field.name,
                    values.len(),
                    self.rows.len()
                ),
            });
        }
        if position > self.schema.len() {
            return Err(UploadError::SchemaMismatch {
                message: format!(
                    "cannot insert column '{}' at position {position}: table has {} columns",
                    field.name,
                    self.schema.len()
                ),
            });
        }

        self.schema.fields.insert(position, field);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(position, value);
        }
        Ok(())
    }

    /// Concatenate data sets in order into one.
    ///
    /// The result's columns are the union of all input columns in first-seen order. Rows keep
    /// their relative order; a row whose source lacked a column holds [`Value::Null`] there.
    /// The same column name appearing with two different types is a schema mismatch.
    pub fn concat(parts: Vec<DataSet>) -> UploadResult<DataSet> {
        let mut schema = Schema::default();
        for part in &parts {
            for field in &part.schema.fields {
                match schema.index_of(&field.name) {
                    None => schema.fields.push(field.clone()),
                    Some(idx) if schema.fields[idx].data_type != field.data_type => {
                        return Err(UploadError::SchemaMismatch {
                            message: format!(
                                "column '{}' has conflicting types {:?} and {:?}",
                                field.name, schema.fields[idx].data_type, field.data_type
                            ),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        let total: usize = parts.iter().map(DataSet::row_count).sum();
        let mut rows = Vec::with_capacity(total);
        for part in parts {
            // Position of each part column in the combined schema.
            let targets: Vec<usize> = part
                .schema
                .field_names()
                .filter_map(|name| schema.index_of(name))
                .collect();
            if targets.len() == schema.len() && targets.iter().enumerate().all(|(i, &t)| i == t) {
                rows.extend(part.rows);
                continue;
            }
            for row in part.rows {
                let mut out = vec![Value::Null; schema.len()];
                for (value, &target) in row.into_iter().zip(&targets) {
                    out[target] = value;
                }
                rows.push(out);
            }
        }

        Ok(DataSet::new(schema, rows))
    }
}
