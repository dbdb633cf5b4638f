//! Error types for wire format operations.

use bytestream::ByteError;
use thiserror::Error;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// Decode errors for message headers and frame framing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The underlying primitive read failed.
    #[error(transparent)]
    Byte(#[from] ByteError),

    /// Frame started with a command byte we do not understand.
    #[error("unknown frame command 0x{command:02X}")]
    UnknownCommand { command: u8 },

    /// Kind code bytes are not three uppercase ASCII letters.
    #[error("invalid kind code {bytes:?}")]
    InvalidKindCode { bytes: [u8; 3] },

    /// Tombstone messages carry no flags.
    #[error("tombstone for entity {entity} carries flags 0x{flags:02X}")]
    TombstoneFlags { entity: u32, flags: u8 },

    /// Length prefix announces a frame larger than allowed.
    #[error("frame of {length} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { length: usize, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_command() {
        let err = DecodeError::UnknownCommand { command: 0x7F };
        assert!(err.to_string().contains("0x7F"));
    }

    #[test]
    fn error_display_frame_too_large() {
        let err = DecodeError::FrameTooLarge {
            length: 5000,
            limit: 4096,
        };
        let msg = err.to_string();
        assert!(msg.contains("5000"));
        assert!(msg.contains("4096"));
    }

    #[test]
    fn byte_error_converts() {
        let err: DecodeError = ByteError::InvalidVarint.into();
        assert_eq!(err, DecodeError::Byte(ByteError::InvalidVarint));
        assert_eq!(err.to_string(), "invalid varint");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<DecodeError>();
    }
}
