/// Errors from decoding a single MessagePack value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnpackError {
    /// The buffer ends before the declared value does.
    #[error("insufficient data")]
    InsufficientData,

    /// The encoded bytes contradict their own declaration
    /// (e.g. a string payload that is not valid UTF-8).
    #[error("invalid data")]
    InvalidData,

    /// A reserved type tag.
    #[error("unsupported type tag {0:#04x}")]
    UnsupportedType(u8),
}

pub type Result<T> = std::result::Result<T, UnpackError>;
