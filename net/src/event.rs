//! Connection identifiers and events.

use std::fmt;
use std::net::SocketAddr;

use bytes::Bytes;

/// Process-unique connection handle. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Something that happened on the network, delivered in order per connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    /// A dialed or accepted connection is ready.
    Connected { id: ConnectionId, peer: SocketAddr },
    /// The connection is gone; no further events follow for `id`.
    Disconnected { id: ConnectionId },
    /// One complete inbound frame.
    Received { id: ConnectionId, frame: Bytes },
    /// A dial never produced a connection.
    ConnectFailed { address: String, error: String },
}

impl NetEvent {
    /// Connection the event belongs to, if any.
    #[must_use]
    pub const fn connection(&self) -> Option<ConnectionId> {
        match self {
            Self::Connected { id, .. } | Self::Disconnected { id } | Self::Received { id, .. } => {
                Some(*id)
            }
            Self::ConnectFailed { .. } => None,
        }
    }
}
