//! Size ceilings for variable-length payloads
//!
//! A reader never trusts a declared length: every length prefix is checked
//! against these ceilings before a buffer is allocated. The writer enforces
//! the same ceilings so that anything that encodes also decodes.

use crate::error::{Error, Result};
use crate::types::TypeCode;

/// Size limits applied by the codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum STRING and URI payload in bytes (default: 256 KiB)
    pub max_string_bytes: usize,

    /// Maximum BYTEARRAY payload in bytes (default: 8 KiB)
    pub max_bytes_len: usize,

    /// Maximum FRAME or ARRAY payload in bytes (default: 16 MiB)
    pub max_composite_bytes: usize,

    /// Maximum FRAME/ARRAY nesting depth (default: 64)
    pub max_nesting_depth: usize,

    /// Maximum field name length in bytes (default: 255, the wire maximum)
    pub max_name_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_string_bytes: 256 * 1024,
            max_bytes_len: 8 * 1024,
            max_composite_bytes: 16 * 1024 * 1024,
            max_nesting_depth: 64,
            max_name_bytes: u8::MAX as usize,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_string_bytes: 64,
            max_bytes_len: 32,
            max_composite_bytes: 256,
            max_nesting_depth: 4,
            max_name_bytes: 16,
        }
    }

    /// Ceiling for a variable-length type, `None` for fixed-width types
    pub fn ceiling(&self, code: TypeCode) -> Option<usize> {
        match code {
            TypeCode::String | TypeCode::Uri => Some(self.max_string_bytes),
            TypeCode::ByteArray => Some(self.max_bytes_len),
            TypeCode::Frame | TypeCode::Array => Some(self.max_composite_bytes),
            _ => None,
        }
    }

    /// Reject a payload the writer is about to emit
    pub fn check_encode(&self, code: TypeCode, len: usize) -> Result<()> {
        match self.ceiling(code) {
            Some(max) if len > max => Err(Error::encoding(
                code.name(),
                format!("payload of {} bytes exceeds maximum {}", len, max),
            )),
            _ => Ok(()),
        }
    }

    /// Reject a length prefix read from the wire
    pub fn check_decode(&self, code: TypeCode, declared: usize) -> Result<()> {
        match self.ceiling(code) {
            Some(max) if declared > max => Err(Error::decoding(
                code.name(),
                format!("declared length {} exceeds ceiling {}", declared, max),
            )),
            _ => Ok(()),
        }
    }

    /// Reject nesting deeper than the configured maximum
    pub fn check_depth(&self, code: TypeCode, depth: usize, decoding: bool) -> Result<()> {
        if depth <= self.max_nesting_depth {
            return Ok(());
        }
        let reason = format!(
            "nesting depth {} exceeds maximum {}",
            depth, self.max_nesting_depth
        );
        if decoding {
            Err(Error::decoding(code.name(), reason))
        } else {
            Err(Error::encoding(code.name(), reason))
        }
    }

    /// Reject a field name longer than the wire allows
    pub fn check_name(&self, name: &str) -> Result<()> {
        let max = self.max_name_bytes.min(u8::MAX as usize);
        if name.len() > max {
            return Err(Error::encoding(
                "NAME",
                format!("name of {} bytes exceeds maximum {}", name.len(), max),
            ));
        }
        Ok(())
    }
}
