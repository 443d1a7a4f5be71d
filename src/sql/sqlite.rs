//! SQLite [`TableWriter`] backed by `rusqlite`.

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, Transaction, params_from_iter};
use tracing::{debug, warn};

use crate::error::UploadResult;
use crate::types::{DataSet, Value};

use super::{RawTypeOverrides, SqlDialect, TableRef, TableWriter, create_table_sql, drop_table_sql, insert_sql};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Int64(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            Value::Float64(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            Value::Bool(v) => ToSqlOutput::Borrowed(ValueRef::Integer(i64::from(*v))),
            Value::Utf8(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Writes into a SQLite database inside one transaction.
///
/// The transaction rolls back when the writer is dropped without [`TableWriter::commit`].
pub struct SqliteWriter<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> SqliteWriter<'conn> {
    /// Begin a transaction on `conn`.
    pub fn begin(conn: &'conn mut Connection) -> UploadResult<Self> {
        Ok(Self {
            tx: conn.transaction()?,
        })
    }
}

impl TableWriter for SqliteWriter<'_> {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    fn replace_table(&mut self, table: &TableRef, data: DataSet, overrides: &RawTypeOverrides) -> UploadResult<()> {
        let dialect = self.dialect();
        self.tx.execute(&drop_table_sql(dialect, table), [])?;

        if data.schema.is_empty() {
            warn!(%table, rows = data.row_count(), "combined table has no columns; leaving it absent");
            return Ok(());
        }

        let create = create_table_sql(dialect, table, &data.schema, overrides);
        debug!(%table, sql = %create, "creating table");
        self.tx.execute(&create, [])?;

        let mut stmt = self.tx.prepare(&insert_sql(dialect, table, &data.schema))?;
        for row in &data.rows {
            stmt.execute(params_from_iter(row.iter()))?;
        }
        Ok(())
    }

    fn commit(self) -> UploadResult<()> {
        self.tx.commit()?;
        Ok(())
    }
}
