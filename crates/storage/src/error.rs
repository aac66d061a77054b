//! Error types for frame persistence

use crate::config::ConfigError;
use crate::store::PersistResult;
use thiserror::Error;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure reported by a [`RowStoreConnection`](crate::RowStoreConnection)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SQL error: {message}")]
pub struct SqlError {
    /// Driver message
    pub message: String,
    /// Five-character SQLSTATE, when the driver reports one
    pub sql_state: Option<String>,
}

impl SqlError {
    /// Create an error without a SQLSTATE
    pub fn new(message: impl Into<String>) -> Self {
        SqlError {
            message: message.into(),
            sql_state: None,
        }
    }

    /// Attach a SQLSTATE code
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.sql_state = Some(state.into());
        self
    }
}

/// Errors raised by the frame store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A SQL statement, commit or rollback failed
    ///
    /// For writes, `partial` reports how far the operation got before failing.
    #[error("Persistence error during {operation}: {detail}")]
    Persistence {
        /// Store operation that failed ("create", "read", "update", "delete")
        operation: &'static str,
        /// Underlying error text
        detail: String,
        /// Progress made before the failure, for writes
        partial: Option<PersistResult>,
    },

    /// The configured table does not exist
    #[error("Table not found: {}", qualified(.schema.as_deref(), .table))]
    TableNotFound {
        /// Schema searched, if any
        schema: Option<String>,
        /// Table searched
        table: String,
    },

    /// A slot cannot be stored or a stored row cannot be read back
    #[error("Invalid slot: {0}")]
    InvalidSlot(String),

    /// Frame encoding or conversion failure
    #[error(transparent)]
    Frame(#[from] framestore_core::Error),

    /// Invalid store configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StoreError {
    pub(crate) fn persistence(
        operation: &'static str,
        err: &SqlError,
        partial: Option<PersistResult>,
    ) -> Self {
        StoreError::Persistence {
            operation,
            detail: err.message.clone(),
            partial,
        }
    }

    /// Progress recorded by a failed write, if any
    pub fn partial(&self) -> Option<&PersistResult> {
        match self {
            StoreError::Persistence { partial, .. } => partial.as_ref(),
            _ => None,
        }
    }

    /// Check if this is a persistence error
    pub fn is_persistence(&self) -> bool {
        matches!(self, StoreError::Persistence { .. })
    }
}

fn qualified(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!("{schema}.{table}"),
        None => table.to_string(),
    }
}
