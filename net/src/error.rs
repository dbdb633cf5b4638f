//! Error types for the connection manager.

use std::net::SocketAddr;

use thiserror::Error;

use crate::event::ConnectionId;

/// Result type for connection manager operations.
pub type NetResult<T> = Result<T, NetError>;

/// Errors returned synchronously by [`ConnectionManager`](crate::ConnectionManager).
///
/// Failures on a live connection are not returned here; they tear the
/// connection down and surface as [`NetEvent::Disconnected`](crate::NetEvent).
#[derive(Debug, Error)]
pub enum NetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("already listening on {addr}")]
    AlreadyListening { addr: SocketAddr },

    #[error("not listening")]
    NotListening,

    #[error("unknown connection {id}")]
    UnknownConnection { id: ConnectionId },

    #[error("frame of {length} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { length: usize, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_connection() {
        let err = NetError::UnknownConnection {
            id: ConnectionId::new(4),
        };
        assert_eq!(err.to_string(), "unknown connection conn-4");
    }

    #[test]
    fn io_converts() {
        let err: NetError = std::io::Error::from(std::io::ErrorKind::AddrInUse).into();
        assert!(matches!(err, NetError::Io(_)));
    }
}
