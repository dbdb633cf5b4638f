//! Error types for byte-level decoding.

use thiserror::Error;

/// Result type for bytestream operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur while reading primitives from a byte buffer.
///
/// Writing never fails: [`ByteWriter`](crate::ByteWriter) grows its buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    #[error("attempted to read {requested} bytes but only {available} bytes available")]
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A boolean byte was neither `0` nor `1`.
    #[error("invalid bool byte 0x{value:02X}")]
    InvalidBool { value: u8 },

    /// A varint did not terminate within 5 bytes.
    #[error("invalid varint")]
    InvalidVarint,

    /// String bytes were not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// String length prefix exceeds the caller's bound.
    #[error("string of {length} bytes exceeds limit of {limit} bytes")]
    StringTooLong { length: usize, limit: usize },
}
