//! Row-store connection seam
//!
//! The frame store talks to a relational store only through these traits.
//! Parameters are positional and bound in order to `?` placeholders.

use crate::error::SqlError;
use chrono::{DateTime, Utc};
use std::fmt;

/// A bound parameter or a returned column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Text (VARCHAR)
    Text(String),
    /// Integer (INT, SMALLINT)
    Int(i64),
    /// Boolean
    Bool(bool),
    /// Timestamp (DATE)
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Text, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer, if this is an integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SqlValue::Int(n) => Some(*n),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean; drivers without a boolean type return 0/1 integers
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Bool(b) => Some(*b),
            SqlValue::Int(n) => Some(*n != 0),
            SqlValue::Text(s) => match s.trim() {
                "1" => Some(true),
                "0" => Some(false),
                t if t.eq_ignore_ascii_case("true") => Some(true),
                t if t.eq_ignore_ascii_case("false") => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Timestamp; drivers without a date type return RFC 3339 text
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SqlValue::Timestamp(t) => Some(*t),
            SqlValue::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|d| d.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// Check for SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Text(s) => write!(f, "'{}'", s),
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<Option<String>> for SqlValue {
    fn from(s: Option<String>) -> Self {
        s.map_or(SqlValue::Null, SqlValue::Text)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(t: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(t)
    }
}

/// One result row with case-insensitive column lookup
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlRow {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl SqlRow {
    /// Build a row from parallel column names and values
    pub fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Value of column `name`, ignoring ASCII case
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .and_then(|i| self.values.get(i))
    }

    /// Column names, in result order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values, in result order
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An open connection to a relational row store
///
/// The auto-commit contract follows the usual driver convention: with
/// auto-commit on, each statement commits on its own; with it off, statements
/// accumulate in one transaction until [`commit`](Self::commit) or
/// [`rollback`](Self::rollback). Switching auto-commit back on commits any
/// open transaction.
pub trait RowStoreConnection {
    /// Database product name, used to pick a SQL dialect
    fn product_name(&self) -> &str;

    /// Current auto-commit mode
    fn auto_commit(&self) -> bool;

    /// Change auto-commit mode
    fn set_auto_commit(&mut self, enabled: bool) -> Result<(), SqlError>;

    /// Run one statement, returning the affected row count
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<usize, SqlError>;

    /// Run one prepared statement once per parameter row
    ///
    /// Returns the affected row count of each execution. The statement is
    /// released before returning, on success and on error.
    fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<Vec<usize>, SqlError>;

    /// Run a query, returning every result row
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, SqlError>;

    /// Commit the open transaction
    fn commit(&mut self) -> Result<(), SqlError>;

    /// Roll back the open transaction
    fn rollback(&mut self) -> Result<(), SqlError>;

    /// Whether `table` exists in `schema` (or the default schema), ignoring case
    fn table_exists(&mut self, schema: Option<&str>, table: &str) -> Result<bool, SqlError>;
}

impl<C: RowStoreConnection + ?Sized> RowStoreConnection for &mut C {
    fn product_name(&self) -> &str {
        (**self).product_name()
    }

    fn auto_commit(&self) -> bool {
        (**self).auto_commit()
    }

    fn set_auto_commit(&mut self, enabled: bool) -> Result<(), SqlError> {
        (**self).set_auto_commit(enabled)
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<usize, SqlError> {
        (**self).execute(sql, params)
    }

    fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<Vec<usize>, SqlError> {
        (**self).execute_batch(sql, rows)
    }

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, SqlError> {
        (**self).query(sql, params)
    }

    fn commit(&mut self) -> Result<(), SqlError> {
        (**self).commit()
    }

    fn rollback(&mut self) -> Result<(), SqlError> {
        (**self).rollback()
    }

    fn table_exists(&mut self, schema: Option<&str>, table: &str) -> Result<bool, SqlError> {
        (**self).table_exists(schema, table)
    }
}

/// Factory for connections
pub trait Connector {
    /// Connection type handed out
    type Connection: RowStoreConnection;

    /// Open (or borrow from a pool) a connection
    fn connection(&self) -> Result<Self::Connection, SqlError>;

    /// Whether connections come from a pool
    fn is_pooled(&self) -> bool;

    /// User the connections authenticate as
    fn user_name(&self) -> &str;
}
