//! SQLite row store via `rusqlite`
//!
//! SQLite has no client-side auto-commit switch, so it is emulated: with
//! auto-commit off, `BEGIN` is issued lazily before the first statement and
//! the transaction stays open until `commit` or `rollback`.
//!
//! Booleans are stored as 0/1 integers and timestamps as RFC 3339 text.

use crate::connection::{Connector, RowStoreConnection, SqlRow, SqlValue};
use crate::error::SqlError;
use chrono::SecondsFormat;
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqliteValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(SqliteValue::Null),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Int(n) => ToSqlOutput::Owned(SqliteValue::Integer(*n)),
            SqlValue::Bool(b) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*b))),
            SqlValue::Timestamp(t) => ToSqlOutput::Owned(SqliteValue::Text(
                t.to_rfc3339_opts(SecondsFormat::Millis, true),
            )),
        })
    }
}

impl From<rusqlite::Error> for SqlError {
    fn from(e: rusqlite::Error) -> Self {
        SqlError::new(e.to_string())
    }
}

fn from_sqlite(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(n) => SqlValue::Int(n),
        ValueRef::Real(f) => SqlValue::Text(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => {
            SqlValue::Text(String::from_utf8_lossy(t).into_owned())
        }
    }
}

/// Connection to a SQLite database
#[derive(Debug)]
pub struct SqliteConnection {
    conn: Connection,
    auto_commit: bool,
}

impl SqliteConnection {
    /// Open (creating if needed) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqlError> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, SqlError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Wrap an open `rusqlite` connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            auto_commit: true,
        }
    }

    /// Underlying `rusqlite` connection
    pub fn inner(&self) -> &Connection {
        &self.conn
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn begin_if_needed(&mut self) -> Result<(), SqlError> {
        if !self.auto_commit && !self.in_transaction() {
            self.conn.execute_batch("BEGIN")?;
            debug!(target: "framestore::sqlite", "Transaction opened");
        }
        Ok(())
    }
}

impl RowStoreConnection for SqliteConnection {
    fn product_name(&self) -> &str {
        "SQLite"
    }

    fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    fn set_auto_commit(&mut self, enabled: bool) -> Result<(), SqlError> {
        if enabled && self.in_transaction() {
            self.conn.execute_batch("COMMIT")?;
        }
        self.auto_commit = enabled;
        Ok(())
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<usize, SqlError> {
        self.begin_if_needed()?;
        Ok(self.conn.execute(sql, params_from_iter(params.iter()))?)
    }

    fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<Vec<usize>, SqlError> {
        self.begin_if_needed()?;
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut counts = Vec::with_capacity(rows.len());
        for params in rows {
            counts.push(stmt.execute(params_from_iter(params.iter()))?);
        }
        Ok(counts)
    }

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, SqlError> {
        self.begin_if_needed()?;
        let mut stmt = self.conn.prepare_cached(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(from_sqlite(row.get_ref(i)?));
            }
            out.push(SqlRow::new(columns.clone(), values));
        }
        Ok(out)
    }

    fn commit(&mut self) -> Result<(), SqlError> {
        if self.in_transaction() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SqlError> {
        if self.in_transaction() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    fn table_exists(&mut self, schema: Option<&str>, table: &str) -> Result<bool, SqlError> {
        let catalog = match schema {
            Some(s) if s.eq_ignore_ascii_case("temp") => "sqlite_temp_master",
            _ => "sqlite_master",
        };
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            catalog
        );
        let count: i64 = self.conn.query_row(&sql, [table], |row| row.get(0))?;
        Ok(count > 0)
    }
}

/// Opens a fresh [`SqliteConnection`] per request
///
/// Each in-memory connection is a separate database.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: Option<PathBuf>,
    user: String,
}

impl SqliteConnector {
    /// Connector for a database file
    pub fn file(path: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            user: user.into(),
        }
    }

    /// Connector for in-memory databases
    pub fn in_memory(user: impl Into<String>) -> Self {
        Self {
            path: None,
            user: user.into(),
        }
    }
}

impl Connector for SqliteConnector {
    type Connection = SqliteConnection;

    fn connection(&self) -> Result<SqliteConnection, SqlError> {
        match &self.path {
            Some(path) => SqliteConnection::open(path),
            None => SqliteConnection::open_in_memory(),
        }
    }

    fn is_pooled(&self) -> bool {
        false
    }

    fn user_name(&self) -> &str {
        &self.user
    }
}
