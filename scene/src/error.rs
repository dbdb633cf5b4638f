//! Error types for scene synchronization.

use codec::CodecError;
use net::NetError;
use thiserror::Error;

/// Result type for scene synchronization.
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A scene-mutating call ran off the owning thread.
    #[error("{operation} called off the sync thread")]
    WrongThread { operation: &'static str },

    /// Frame framing is malformed.
    #[error("frame error: {0}")]
    Wire(#[from] wire::DecodeError),

    /// A payload could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("transport error: {0}")]
    Transport(#[from] NetError),
}

impl SyncError {
    /// Returns `true` if the error means the peer's byte stream is unusable.
    #[must_use]
    pub const fn is_desync(&self) -> bool {
        matches!(self, Self::Wire(_) | Self::Codec(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desync_classification() {
        let wire: SyncError = wire::DecodeError::UnknownCommand { command: 9 }.into();
        assert!(wire.is_desync());
        let thread = SyncError::WrongThread { operation: "tick" };
        assert!(!thread.is_desync());
        assert_eq!(thread.to_string(), "tick called off the sync thread");
    }
}
