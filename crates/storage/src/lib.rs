//! Frame persistence for FrameStore
//!
//! This crate maps frames onto a flat relational table and back:
//! - store: create / read / update / delete over a row-store connection
//! - FieldSlot: one stored field, linked to its parent by id
//! - RowStoreConnection / Connector: the connection seam
//! - SqlDialect: statement text per database product
//! - StoreConfig: entity, schema, table and batch size
//! - SqliteConnection: `rusqlite` adapter (feature `sqlite`)
//! - testing: recording connection with failure injection
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use framestore_core::Frame;
//! use framestore_storage::{create, create_table, read, resolve_dialect};
//! use framestore_storage::{RowStoreConnection, SqliteConnection, StoreConfig};
//!
//! let mut conn = SqliteConnection::open_in_memory()?;
//! let dialect = resolve_dialect(conn.product_name());
//! let config = StoreConfig::default();
//! create_table(&mut conn, dialect.as_ref(), None, &config.table)?;
//!
//! let frame = Frame::new().with("greeting", "hello");
//! let stored = create(&frame, &mut conn, &config, dialect.as_ref())?;
//! let back = read(&stored.root_id, &mut conn, &config, dialect.as_ref())?;
//! assert_eq!(back, Some(frame));
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod id;
pub mod schema;
pub mod slot;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod store;
pub mod testing;

pub use config::{ConfigError, StoreConfig};
pub use connection::{Connector, RowStoreConnection, SqlRow, SqlValue};
pub use dialect::{resolve_dialect, AnsiDialect, SqlDialect, SqliteDialect};
pub use error::{SqlError, StoreError, StoreResult};
pub use id::{IdGenerator, SysId, UuidGenerator};
pub use schema::{create_table, table_schema, ColumnDefinition, ColumnType, TableDefinition};
pub use slot::FieldSlot;
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConnection, SqliteConnector};
pub use store::{
    create, create_with, delete, get_slots, read, update, update_with, PersistResult,
};
