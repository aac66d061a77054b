//! Slot identifiers
//!
//! Every slot row carries a `SysId`: a UUID v4 stored as its 36-character
//! hyphenated text. Generation goes through [`IdGenerator`] so tests can use
//! deterministic ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Unique identifier of a stored slot
///
/// The id returned by `create` names the synthetic root of a stored frame;
/// it has no row of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SysId(Uuid);

impl SysId {
    /// Create a new random SysId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse the hyphenated (or simple) UUID text form
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SysId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SysId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for SysId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Source of new slot identifiers
pub trait IdGenerator {
    /// Produce a fresh identifier
    fn generate(&self) -> SysId;
}

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> SysId {
        SysId::new()
    }
}

/// Identifiers counting up from a starting value
///
/// Ids are UUIDs built from the counter, so they sort in generation order.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Start counting at `first`
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Id that the n-th call to `generate` returned (counting from `first`)
    pub fn id_for(n: u64) -> SysId {
        SysId(Uuid::from_u128(n as u128))
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> SysId {
        Self::id_for(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
