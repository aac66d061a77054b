//! FrameStore - self-describing binary frames with relational persistence
//!
//! A [`Frame`] is an ordered, nestable list of typed fields with a compact
//! binary wire form. The store flattens frames into rows of a single table
//! and rebuilds them on read.
//!
//! # Quick Start
//!
//! ```
//! use framestore::{Frame, Value};
//!
//! let mut frame = Frame::new();
//! frame.add("id", 7u32);
//! frame.add("tags", vec![Value::from("a"), Value::from("b")]);
//!
//! let bytes = frame.to_bytes().unwrap();
//! let decoded = Frame::from_bytes(&bytes).unwrap();
//! assert_eq!(decoded.get_as_u32("id").unwrap(), 7);
//! ```
//!
//! # Architecture
//!
//! - `framestore-core`: type registry, field/frame codec, JSON, conversions
//! - `framestore-storage`: slot mapping, SQL dialects, connections, store
//!   operations

pub use framestore_core::*;
pub use framestore_storage as storage;
pub use framestore_storage::{
    create, delete, read, update, PersistResult, RowStoreConnection, StoreConfig, StoreError,
    SysId,
};
