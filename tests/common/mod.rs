//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::io;
use std::path::Path;
use std::sync::Arc;

pub use framestore::storage::testing::{RecordingConnection, SequentialIds};
pub use framestore::storage::{
    create_table, create_with, get_slots, resolve_dialect, AnsiDialect, FieldSlot, SqlDialect,
    SqliteDialect,
};
#[cfg(feature = "sqlite")]
pub use framestore::storage::SqliteConnection;
pub use framestore::{
    create, delete, read, registry, update, Error, Field, Frame, Limits, PersistResult,
    RowStoreConnection, StoreConfig, StoreError, SysId, TypeCode, Uri, Value,
};
use parking_lot::Mutex;
use tempfile::TempDir;

// ============================================================================
// Sample frames
// ============================================================================

/// A person with first and last name
pub fn person(first: &str, last: &str) -> Frame {
    Frame::new().with("First", first).with("Last", last)
}

/// `{"Team": [Alice Smith, Bob Jones]}`
pub fn team() -> Frame {
    Frame::new().with(
        "Team",
        vec![
            Value::Frame(person("Alice", "Smith")),
            Value::Frame(person("Bob", "Jones")),
        ],
    )
}

/// One field of every scalar type plus a nested frame and an array
pub fn every_type() -> Frame {
    Frame::new()
        .with("udef", Value::Null)
        .with("bytes", vec![0u8, 1, 254, 255])
        .with("string", "héllo")
        .with("s8", i8::MIN)
        .with("u8", u8::MAX)
        .with("s16", -2i16)
        .with("u16", u16::MAX)
        .with("s32", i32::MIN)
        .with("u32", u32::MAX)
        .with("s64", i64::MAX)
        .with("u64", u64::MAX)
        .with("float", 1.5f32)
        .with("double", -0.25f64)
        .with("bool", true)
        .with("date", Value::Date(1_700_000_000_123))
        .with("uri", Uri::parse("https://example.com/a?b=c").unwrap())
        .with("array", vec![Value::S32(1), Value::from("two"), Value::Bool(false)])
        .with("frame", person("Ada", "Lovelace"))
}

// ============================================================================
// SQLite fixtures
// ============================================================================

/// In-memory SQLite connection with the default slot table created
#[cfg(feature = "sqlite")]
pub fn sqlite_store() -> (SqliteConnection, StoreConfig) {
    let mut conn = SqliteConnection::open_in_memory().unwrap();
    let config = StoreConfig::default();
    create_table(&mut conn, &SqliteDialect, None, &config.table).unwrap();
    (conn, config)
}

/// File-backed SQLite connection with the default slot table created
#[cfg(feature = "sqlite")]
pub fn sqlite_file_store(dir: &TempDir) -> (SqliteConnection, StoreConfig) {
    let mut conn = SqliteConnection::open(dir.path().join("frames.db")).unwrap();
    let config = StoreConfig::default();
    create_table(&mut conn, &SqliteDialect, None, &config.table).unwrap();
    (conn, config)
}

// ============================================================================
// Log capture
// ============================================================================

/// Collects formatted `tracing` output for assertions
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with a DEBUG-level subscriber writing into this capture
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let buf = self.buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || CaptureWriter(buf.clone()))
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Everything logged so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Lines containing `needle`
    pub fn lines_with(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
