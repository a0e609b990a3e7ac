//! MessagePack value model and codec.
//!
//! This is the bottom layer of buildlink. A [`Value`] is the in-memory form
//! of one self-describing MessagePack datum; [`pack`] and [`unpack`] convert
//! between values and their canonical binary layout:
//! - `pack` is total and deterministic, and always selects the smallest
//!   encoding that losslessly holds the value.
//! - `unpack` parses exactly one value from the front of a buffer and
//!   returns the unconsumed remainder, so a stream of values can be decoded
//!   back to back.
//!
//! No I/O happens here. Both directions are pure functions over byte
//! buffers.

pub mod decode;
pub mod encode;
pub mod error;
pub mod value;

pub use decode::unpack;
pub use encode::{pack, pack_into};
pub use error::{Result, UnpackError};
pub use value::{Timestamp, Value, ValueKind, TIMESTAMP_EXT_TYPE};
