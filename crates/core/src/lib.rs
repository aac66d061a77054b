//! Core types for FrameStore
//!
//! This crate defines the self-describing binary frame format:
//! - TypeCode / TypeDescriptor: the eighteen registered value types
//! - TypeRegistry: per-type type checks, encode/decode and text parsing
//! - Value: closed enum over the registered types
//! - Field: one named or anonymous typed value
//! - Frame: ordered, nestable list of fields with wire and JSON forms
//! - Limits: decode ceilings for variable-length payloads
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

mod codec;
mod convert;
pub mod error;
pub mod field;
pub mod frame;
pub mod json;
pub mod limits;
pub mod registry;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use field::Field;
pub use frame::Frame;
pub use limits::Limits;
pub use registry::{registry, TypeRegistry};
pub use types::{TypeCode, TypeDescriptor};
pub use value::{Uri, Value};
