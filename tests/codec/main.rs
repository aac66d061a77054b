//! Codec integration tests
//!
//! Bit-exact wire forms, per-type round trips, JSON rendering, frame
//! semantics, decode ceilings and property-based round trips.

#[path = "../common/mod.rs"]
mod common;

mod frame_semantics;
mod json_rendering;
mod limits;
mod type_roundtrips;
