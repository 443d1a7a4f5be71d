//! SQL persistence boundary.
//!
//! The upload orchestrator only needs three things from a database:
//!
//! - a [`SqlDialect`] to resolve dialect-specific column types ([`RawColumnType`]),
//! - a [`TableWriter`] that can create-or-replace a table from a [`DataSet`],
//! - a single commit at the end of a run.
//!
//! Column types are resolved per column as a [`ColumnType`]: either the logical
//! [`DataType`] mapped through the dialect, or a raw SQL fragment emitted verbatim. Raw types
//! are only ever supplied for specific columns (e.g. the synthetic primary key); everything
//! else uses the normal mapping.

pub mod sqlite;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::UploadResult;
use crate::types::{DataSet, DataType, Field, Schema};

pub use sqlite::SqliteWriter;

/// Destination table identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableRef {
    /// Table name.
    pub name: String,
    /// Optional schema (for SQLite: the attached database name, e.g. `main`).
    #[serde(default)]
    pub schema: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }

    pub fn with_schema(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema.into()),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Supported target SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    Sqlite,
    #[serde(alias = "postgresql")]
    Postgres,
    Mysql,
}

impl SqlDialect {
    /// Raw column type for an auto-incrementing integer primary key.
    pub fn autoincrement_primary_key(self) -> RawColumnType {
        RawColumnType::new(match self {
            Self::Sqlite => "INTEGER PRIMARY KEY",
            Self::Postgres => "BIGSERIAL PRIMARY KEY",
            Self::Mysql => "BIGINT AUTO_INCREMENT PRIMARY KEY",
        })
    }

    /// Column type used for a logical [`DataType`].
    pub fn type_name(self, data_type: DataType) -> &'static str {
        match (self, data_type) {
            (Self::Sqlite, DataType::Int64 | DataType::Bool) => "INTEGER",
            (Self::Sqlite, DataType::Float64) => "REAL",
            (Self::Postgres | Self::Mysql, DataType::Int64) => "BIGINT",
            (Self::Postgres, DataType::Float64) => "DOUBLE PRECISION",
            (Self::Mysql, DataType::Float64) => "DOUBLE",
            (Self::Postgres | Self::Mysql, DataType::Bool) => "BOOLEAN",
            (_, DataType::Utf8) => "TEXT",
        }
    }

    /// Quote an identifier, escaping embedded quote characters.
    pub fn quote_ident(self, ident: &str) -> String {
        match self {
            Self::Mysql => format!("`{}`", ident.replace('`', "``")),
            Self::Sqlite | Self::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Positional bind placeholder for the 1-based parameter `n`.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Self::Sqlite => format!("?{n}"),
            Self::Postgres => format!("${n}"),
            Self::Mysql => "?".to_string(),
        }
    }

    fn qualified(self, table: &TableRef) -> String {
        match &table.schema {
            Some(schema) => format!("{}.{}", self.quote_ident(schema), self.quote_ident(&table.name)),
            None => self.quote_ident(&table.name),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
        })
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "mysql" => Ok(Self::Mysql),
            other => Err(format!("unknown sql dialect '{other}'")),
        }
    }
}

/// A literal SQL type fragment emitted verbatim, bypassing type mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumnType {
    sql: String,
}

impl RawColumnType {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// Per-column raw type overrides, keyed by column name.
pub type RawTypeOverrides = BTreeMap<String, RawColumnType>;

/// Resolved type of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType<'a> {
    /// Mapped from the column's logical type.
    Logical(DataType),
    /// Emitted as-is.
    Raw(&'a RawColumnType),
}

impl<'a> ColumnType<'a> {
    /// Resolve `field`'s type: an override wins, otherwise its logical type.
    pub fn resolve(field: &Field, overrides: &'a RawTypeOverrides) -> Self {
        match overrides.get(&field.name) {
            Some(raw) => Self::Raw(raw),
            None => Self::Logical(field.data_type),
        }
    }

    /// SQL text of this type for `dialect`.
    pub fn render(self, dialect: SqlDialect) -> &'a str {
        match self {
            Self::Logical(data_type) => dialect.type_name(data_type),
            Self::Raw(raw) => raw.sql(),
        }
    }
}

/// `DROP TABLE IF EXISTS` statement for `table`.
pub fn drop_table_sql(dialect: SqlDialect, table: &TableRef) -> String {
    format!("DROP TABLE IF EXISTS {}", dialect.qualified(table))
}

/// `CREATE TABLE` statement for `schema`, honouring raw type overrides.
pub fn create_table_sql(dialect: SqlDialect, table: &TableRef, schema: &Schema, overrides: &RawTypeOverrides) -> String {
    let columns: Vec<String> = schema
        .fields
        .iter()
        .map(|field| {
            format!(
                "{} {}",
                dialect.quote_ident(&field.name),
                ColumnType::resolve(field, overrides).render(dialect)
            )
        })
        .collect();
    format!("CREATE TABLE {} ({})", dialect.qualified(table), columns.join(", "))
}

/// Parameterised single-row `INSERT` statement for `schema`.
pub fn insert_sql(dialect: SqlDialect, table: &TableRef, schema: &Schema) -> String {
    let columns: Vec<String> = schema.field_names().map(|n| dialect.quote_ident(n)).collect();
    let params: Vec<String> = (1..=schema.len()).map(|n| dialect.placeholder(n)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        dialect.qualified(table),
        columns.join(", "),
        params.join(", ")
    )
}

/// Writes combined tables into a database inside one transaction.
pub trait TableWriter {
    /// Dialect of the underlying connection.
    fn dialect(&self) -> SqlDialect;

    /// Create or replace `table` and write every row of `data`.
    ///
    /// Columns named in `overrides` use the given raw type; all others are mapped from their
    /// logical type.
    fn replace_table(&mut self, table: &TableRef, data: DataSet, overrides: &RawTypeOverrides) -> UploadResult<()>;

    /// Commit everything written so far. Dropping a writer without committing discards it.
    fn commit(self) -> UploadResult<()>
    where
        Self: Sized;
}
