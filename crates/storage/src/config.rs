//! Frame store configuration

use serde::{Deserialize, Serialize};

/// Default audit entity stamped on created and modified rows
pub const DEFAULT_ENTITY: &str = "system";

/// Default slot table name
pub const DEFAULT_TABLE: &str = "frame_store";

/// Default number of rows per insert batch
pub const DEFAULT_BATCH_SIZE: usize = 250;

/// Longest schema or table name accepted
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Frame store configuration
///
/// Controls where slots are written and how inserts are batched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Audit entity written to `CreatedBy` / `ModifiedBy`
    pub entity: String,
    /// Schema holding the slot table; `None` uses the connection default
    pub schema: Option<String>,
    /// Slot table name
    pub table: String,
    /// Rows per insert batch; `create` commits after every batch
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            entity: DEFAULT_ENTITY.to_string(),
            schema: None,
            table: DEFAULT_TABLE.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl StoreConfig {
    /// Create config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the audit entity
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        self
    }

    /// Set the schema
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the table name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Validate the configuration
    ///
    /// Called by every store operation before any SQL is issued.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity.trim().is_empty() {
            return Err(ConfigError::EmptyEntity);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        check_identifier("table", &self.table)?;
        if let Some(schema) = &self.schema {
            check_identifier("schema", schema)?;
        }
        Ok(())
    }
}

fn check_identifier(kind: &'static str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::InvalidIdentifier {
            kind,
            name: name.to_string(),
            reason: "empty",
        });
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(ConfigError::InvalidIdentifier {
            kind,
            name: name.to_string(),
            reason: "too long",
        });
    }
    if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(ConfigError::InvalidIdentifier {
            kind,
            name: name.to_string(),
            reason: "only letters, digits and '_' are allowed",
        });
    }
    Ok(())
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Audit entity is blank
    #[error("Invalid config: entity must not be empty")]
    EmptyEntity,

    /// Batch size of zero
    #[error("Invalid config: batch size must be at least 1")]
    ZeroBatchSize,

    /// Schema or table name unusable as a SQL identifier
    #[error("Invalid {kind} name {name:?}: {reason}")]
    InvalidIdentifier {
        /// "schema" or "table"
        kind: &'static str,
        /// Offending name
        name: String,
        /// What is wrong with it
        reason: &'static str,
    },
}
