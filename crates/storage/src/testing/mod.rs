//! Test doubles for the row-store seam
//!
//! - **RecordingConnection**: in-memory slot table that records every batch,
//!   commit and rollback, with failure injection
//! - **RecordingConnector**: hands out connections sharing one recording
//! - **SequentialIds** (re-exported): deterministic slot ids
//!
//! # Example
//!
//! ```
//! use framestore_core::Frame;
//! use framestore_storage::testing::RecordingConnection;
//! use framestore_storage::{create, AnsiDialect, StoreConfig};
//!
//! let mut conn = RecordingConnection::new();
//! let frame = Frame::new().with("name", "value");
//! let result = create(&frame, &mut conn, &StoreConfig::default(), &AnsiDialect).unwrap();
//!
//! assert_eq!(result.rows_committed, 1);
//! assert_eq!(conn.batch_sizes(), vec![1]);
//! assert_eq!(conn.commits(), 1);
//! ```

mod recording;

pub use crate::id::SequentialIds;
pub use recording::{RecordingConnection, RecordingConnector};
