//! In-memory slot table with call recording
//!
//! Understands exactly the statements the store issues: slot INSERTs,
//! soft-delete UPDATEs, SELECTs keyed on `Parent` or `SysId`, and
//! CREATE TABLE. Rows are kept in table column order.
//!
//! Transactions are modelled with two copies of the table: statements change
//! the working copy, `commit` publishes it and `rollback` restores the last
//! published copy.

use crate::config::DEFAULT_TABLE;
use crate::connection::{Connector, RowStoreConnection, SqlRow, SqlValue};
use crate::error::SqlError;
use crate::schema::table_schema;
use crate::slot::FieldSlot;
use parking_lot::Mutex;
use std::sync::Arc;

const SYS_ID: usize = 0;
const ACTIVE: usize = 1;
const PARENT: usize = 2;
const SEQUENCE: usize = 3;
const MODIFIED_BY: usize = 9;
const MODIFIED_ON: usize = 10;
const COLUMN_COUNT: usize = 11;

type Row = Vec<SqlValue>;

#[derive(Debug, Default)]
struct Recording {
    table: Option<String>,
    committed: Vec<Row>,
    working: Vec<Row>,
    auto_commit: bool,
    batch_calls: usize,
    batch_sizes: Vec<usize>,
    statements: Vec<String>,
    commits: usize,
    rollbacks: usize,
    fail_batch: Option<usize>,
    fail_rollback: bool,
    fail_queries: bool,
}

impl Recording {
    fn publish(&mut self) {
        self.committed = self.working.clone();
    }

    fn apply(&mut self, sql: &str, params: &[SqlValue]) -> Result<usize, SqlError> {
        let verb = sql
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        match verb.as_str() {
            "INSERT" => self.insert(params),
            "UPDATE" => Ok(self.deactivate(params)),
            "CREATE" => {
                self.table = Some(created_table_name(sql)?);
                Ok(0)
            }
            _ => Err(SqlError::new(format!("unsupported statement: {}", sql))),
        }
    }

    fn insert(&mut self, params: &[SqlValue]) -> Result<usize, SqlError> {
        if params.len() != COLUMN_COUNT {
            return Err(SqlError::new(format!(
                "expected {} parameters, got {}",
                COLUMN_COUNT,
                params.len()
            )));
        }
        if self.working.iter().any(|row| row[SYS_ID] == params[SYS_ID]) {
            return Err(SqlError::new("UNIQUE constraint failed: SysId").with_state("23505"));
        }
        self.working.push(params.to_vec());
        Ok(1)
    }

    // SET Active = ?, ModifiedBy = ?, ModifiedOn = ? WHERE SysId = ?
    fn deactivate(&mut self, params: &[SqlValue]) -> usize {
        let [active, by, on, id] = params else {
            return 0;
        };
        let mut changed = 0;
        for row in self.working.iter_mut().filter(|row| &row[SYS_ID] == id) {
            row[ACTIVE] = active.clone();
            row[MODIFIED_BY] = by.clone();
            row[MODIFIED_ON] = on.clone();
            changed += 1;
        }
        changed
    }

    fn select(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, SqlError> {
        let key = match where_column(sql) {
            Some(c) if c.eq_ignore_ascii_case("Parent") => PARENT,
            Some(c) if c.eq_ignore_ascii_case("SysId") => SYS_ID,
            _ => return Err(SqlError::new(format!("unsupported query: {}", sql))),
        };
        let [id, active] = params else {
            return Err(SqlError::new("expected 2 parameters"));
        };

        let mut rows: Vec<&Row> = self
            .working
            .iter()
            .filter(|row| &row[key] == id && &row[ACTIVE] == active)
            .collect();
        rows.sort_by_key(|row| row[SEQUENCE].as_int().unwrap_or_default());

        let columns: Vec<String> = table_schema(None, DEFAULT_TABLE)
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(rows
            .into_iter()
            .map(|row| SqlRow::new(columns.clone(), row.clone()))
            .collect())
    }
}

/// Identifier after the first WHERE, without quotes
fn where_column(sql: &str) -> Option<&str> {
    let upper = sql.to_ascii_uppercase();
    let start = upper.find(" WHERE ")? + " WHERE ".len();
    sql[start..]
        .split_whitespace()
        .next()
        .map(|c| c.trim_matches('"'))
}

/// Unqualified, unquoted table name of a CREATE TABLE statement
fn created_table_name(sql: &str) -> Result<String, SqlError> {
    let upper = sql.to_ascii_uppercase();
    let start = upper
        .find("TABLE ")
        .map(|i| i + "TABLE ".len())
        .ok_or_else(|| SqlError::new("malformed CREATE TABLE"))?;
    let qualified = sql[start..]
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();
    let name = qualified.rsplit('.').next().unwrap_or_default().trim_matches('"');
    if name.is_empty() {
        return Err(SqlError::new("malformed CREATE TABLE"));
    }
    Ok(name.to_string())
}

/// Recording in-memory connection
///
/// Clones share the same recording, so a test can keep a handle while the
/// store holds another.
#[derive(Debug, Clone)]
pub struct RecordingConnection {
    state: Arc<Mutex<Recording>>,
}

impl Default for RecordingConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingConnection {
    /// Connection whose default table `frame_store` exists
    pub fn new() -> Self {
        Self::with_table(DEFAULT_TABLE)
    }

    /// Connection whose table `table` exists
    pub fn with_table(table: &str) -> Self {
        let recording = Recording {
            table: Some(table.to_string()),
            auto_commit: true,
            ..Recording::default()
        };
        Self {
            state: Arc::new(Mutex::new(recording)),
        }
    }

    /// Connection with no table at all
    pub fn without_table() -> Self {
        let conn = Self::new();
        conn.state.lock().table = None;
        conn
    }

    /// Fail the `n`-th call (zero-based) to `execute_batch`
    pub fn fail_batch(self, n: usize) -> Self {
        self.set_fail_batch(Some(n));
        self
    }

    /// Make every rollback fail
    pub fn fail_rollback(self) -> Self {
        self.state.lock().fail_rollback = true;
        self
    }

    /// Make every query fail
    pub fn fail_queries(self) -> Self {
        self.state.lock().fail_queries = true;
        self
    }

    /// Change batch failure injection
    pub fn set_fail_batch(&self, n: Option<usize>) {
        self.state.lock().fail_batch = n;
    }

    /// Sizes of the batches that executed successfully, in order
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().batch_sizes.clone()
    }

    /// SQL text of every successful statement and batch, in order
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().statements.clone()
    }

    /// Number of explicit commits
    pub fn commits(&self) -> usize {
        self.state.lock().commits
    }

    /// Number of rollbacks attempted
    pub fn rollbacks(&self) -> usize {
        self.state.lock().rollbacks
    }

    /// Rows in the table, active or not
    pub fn row_count(&self) -> usize {
        self.state.lock().working.len()
    }

    /// Rows with `Active` set
    pub fn active_row_count(&self) -> usize {
        self.state
            .lock()
            .working
            .iter()
            .filter(|row| row[ACTIVE] == SqlValue::Bool(true))
            .count()
    }

    /// Rows that survived the last commit
    pub fn committed_row_count(&self) -> usize {
        self.state.lock().committed.len()
    }

    /// Every row, decoded; rows that fail to decode are skipped
    pub fn slots(&self) -> Vec<FieldSlot> {
        let columns: Vec<String> = table_schema(None, DEFAULT_TABLE)
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.state
            .lock()
            .working
            .iter()
            .filter_map(|row| FieldSlot::from_row(&SqlRow::new(columns.clone(), row.clone())).ok())
            .collect()
    }
}

impl RowStoreConnection for RecordingConnection {
    fn product_name(&self) -> &str {
        "Recording"
    }

    fn auto_commit(&self) -> bool {
        self.state.lock().auto_commit
    }

    fn set_auto_commit(&mut self, enabled: bool) -> Result<(), SqlError> {
        let mut state = self.state.lock();
        if enabled && !state.auto_commit {
            state.publish();
        }
        state.auto_commit = enabled;
        Ok(())
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<usize, SqlError> {
        let mut state = self.state.lock();
        let count = state.apply(sql, params)?;
        state.statements.push(sql.to_string());
        if state.auto_commit {
            state.publish();
        }
        Ok(count)
    }

    fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<Vec<usize>, SqlError> {
        let mut state = self.state.lock();
        let call = state.batch_calls;
        state.batch_calls += 1;
        if state.fail_batch == Some(call) {
            return Err(SqlError::new(format!("injected failure on batch {}", call)));
        }

        let before = state.working.clone();
        let mut counts = Vec::with_capacity(rows.len());
        for params in rows {
            match state.apply(sql, params) {
                Ok(n) => counts.push(n),
                Err(e) => {
                    state.working = before;
                    return Err(e);
                }
            }
        }
        state.batch_sizes.push(rows.len());
        state.statements.push(sql.to_string());
        if state.auto_commit {
            state.publish();
        }
        Ok(counts)
    }

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<SqlRow>, SqlError> {
        let state = self.state.lock();
        if state.fail_queries {
            return Err(SqlError::new("injected query failure"));
        }
        state.select(sql, params)
    }

    fn commit(&mut self) -> Result<(), SqlError> {
        let mut state = self.state.lock();
        state.commits += 1;
        state.publish();
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SqlError> {
        let mut state = self.state.lock();
        state.rollbacks += 1;
        if state.fail_rollback {
            return Err(SqlError::new("injected rollback failure"));
        }
        state.working = state.committed.clone();
        Ok(())
    }

    fn table_exists(&mut self, _schema: Option<&str>, table: &str) -> Result<bool, SqlError> {
        Ok(self
            .state
            .lock()
            .table
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(table)))
    }
}

/// Connector handing out connections that share one recording
#[derive(Debug, Clone)]
pub struct RecordingConnector {
    connection: RecordingConnection,
    user: String,
}

impl RecordingConnector {
    /// Wrap a connection
    pub fn new(connection: RecordingConnection, user: impl Into<String>) -> Self {
        Self {
            connection,
            user: user.into(),
        }
    }
}

impl Connector for RecordingConnector {
    type Connection = RecordingConnection;

    fn connection(&self) -> Result<RecordingConnection, SqlError> {
        Ok(self.connection.clone())
    }

    fn is_pooled(&self) -> bool {
        true
    }

    fn user_name(&self) -> &str {
        &self.user
    }
}
