//! Error types for codec operations.

use std::fmt;

use bytestream::ByteError;
use schema::ComponentKind;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while decoding component payloads.
///
/// Encoding is infallible. Every decode error means the byte stream can no
/// longer be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("payload error: {0}")]
    Byte(#[from] ByteError),

    #[error("wire error: {0}")]
    Wire(#[from] wire::DecodeError),

    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// Flags carry bits the kind does not define.
    #[error("flags 0x{flags:02X} are not defined for {kind}")]
    UndefinedFlags { kind: ComponentKind, flags: u8 },

    /// Kind code is valid but not a registered component.
    #[error("unknown component code {code}")]
    UnknownKind { code: wire::KindCode },
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    StringBytes,
    Materials,
    Bones,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StringBytes => "string bytes",
            Self::Materials => "materials",
            Self::Bones => "bones",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_display() {
        let err = CodecError::LimitsExceeded {
            kind: LimitKind::Bones,
            limit: 32,
            actual: 40,
        };
        assert_eq!(err.to_string(), "bones limit exceeded: 40 > 32");
    }

    #[test]
    fn undefined_flags_display() {
        let err = CodecError::UndefinedFlags {
            kind: ComponentKind::Mask,
            flags: 0x80,
        };
        assert!(err.to_string().contains("0x80"));
        assert!(err.to_string().contains("mask"));
    }

    #[test]
    fn byte_error_converts() {
        let err: CodecError = ByteError::InvalidUtf8.into();
        assert!(matches!(err, CodecError::Byte(ByteError::InvalidUtf8)));
    }
}
