use buildlink_msgpack::{UnpackError, ValueKind};

use crate::path::Path;

/// Errors from decoding a typed payload out of a value tree.
///
/// These are recoverable: the envelope layer catches them, logs the path
/// context and substitutes an `unknown` payload, so one malformed message
/// never tears down the multiplexed stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The body carries no command name where one is required.
    #[error("command name not found")]
    NameNotFound,

    /// A container is shorter than the path's terminal index requires.
    #[error("index out of bounds at {path}")]
    IndexOutOfBounds { path: Path },

    /// The value at the path is not the expected variant.
    #[error("expected {expected} at {path}")]
    IncorrectValueType { path: Path, expected: ValueKind },

    /// A fixed-arity argument array has the wrong element count.
    #[error("invalid argument count {actual} (expected {expected}) at {path}")]
    InvalidCount {
        actual: usize,
        expected: usize,
        path: Path,
    },
}

/// Errors from packet framing.
///
/// Unlike [`DecodeError`], these are fatal for the connection: once a
/// length prefix or frame body is untrustworthy, so is every byte after
/// it. The transport must close or reset the stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The length prefix declares an implausibly large frame.
    #[error("frame of {size} bytes exceeds maximum {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// The length prefix cannot hold even the channel identifier.
    #[error("frame length {len} shorter than the channel header")]
    InvalidLength { len: usize },

    /// The frame body failed to decode as a MessagePack value. A
    /// well-formed frame always contains exactly one complete value.
    #[error("frame body: {0}")]
    Body(#[from] UnpackError),

    /// Bytes left over inside the frame after its body value.
    #[error("{trailing} trailing bytes after frame body")]
    TrailingBytes { trailing: usize },

    /// An I/O error while reading or writing packets.
    #[error("packet I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended part-way through a frame.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}
