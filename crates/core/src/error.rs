//! Error types for frame encoding and access
//!
//! This module defines all error types raised by the codec, the field and
//! frame containers, and the typed getters.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for frame operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the frame codec and containers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A value was rejected by the type check of the type it was encoded as,
    /// or it does not fit the wire format
    #[error("Encoding error ({type_name}): {reason}")]
    Encoding {
        /// Tag of the type being encoded
        type_name: &'static str,
        /// What went wrong
        reason: String,
    },

    /// Bytes could not be turned back into a value
    #[error("Decoding error ({type_name}): {reason}")]
    Decoding {
        /// Tag of the type being decoded
        type_name: &'static str,
        /// What went wrong
        reason: String,
    },

    /// A typed getter could not coerce the stored value
    #[error("Cannot convert {from} to {to}")]
    Conversion {
        /// Tag of the stored value's type
        from: &'static str,
        /// Requested target type
        to: &'static str,
    },

    /// A type code that is not part of the registry
    #[error("Unknown type code: {0}")]
    UnknownType(u8),

    /// No field with the requested name
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// JSON text could not be parsed into a frame
    #[error("JSON error: {0}")]
    Json(String),
}

impl Error {
    /// Create an encoding error
    pub fn encoding(type_name: &'static str, reason: impl Into<String>) -> Self {
        Error::Encoding {
            type_name,
            reason: reason.into(),
        }
    }

    /// Create a decoding error
    pub fn decoding(type_name: &'static str, reason: impl Into<String>) -> Self {
        Error::Decoding {
            type_name,
            reason: reason.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(from: &'static str, to: &'static str) -> Self {
        Error::Conversion { from, to }
    }

    /// True for errors raised while encoding
    pub fn is_encoding(&self) -> bool {
        matches!(self, Error::Encoding { .. })
    }

    /// True for errors raised while decoding
    pub fn is_decoding(&self) -> bool {
        matches!(self, Error::Decoding { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}
