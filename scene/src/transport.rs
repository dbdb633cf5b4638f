//! The seam between the sync managers and the network.

use net::{ConnectionId, ConnectionManager, NetEvent, NetResult};
use wire::Limits;

/// Frame-oriented transport driven from the sync thread.
///
/// Implemented by [`ConnectionManager`]; tests supply in-memory versions.
pub trait SyncTransport {
    /// Queues one complete frame for `connection`.
    fn send_to(&mut self, connection: ConnectionId, frame: &[u8]) -> NetResult<()>;

    /// Bytes queued for `connection` and not yet written.
    fn output_bytes_queued(&self, connection: ConnectionId) -> usize;

    /// Drops `connection`. A `Disconnected` event follows.
    fn disconnect(&mut self, connection: ConnectionId);

    /// Next pending event, without blocking.
    fn try_recv_event(&mut self) -> Option<NetEvent>;

    /// Largest frame [`send_to`](Self::send_to) accepts.
    fn max_frame_bytes(&self) -> usize {
        Limits::default().max_frame_bytes
    }
}

impl SyncTransport for ConnectionManager {
    fn send_to(&mut self, connection: ConnectionId, frame: &[u8]) -> NetResult<()> {
        Self::send_to(self, connection, frame)
    }

    fn output_bytes_queued(&self, connection: ConnectionId) -> usize {
        Self::output_bytes_queued(self, connection)
    }

    fn disconnect(&mut self, connection: ConnectionId) {
        // Already gone is fine; the event was or will be delivered.
        let _ = Self::disconnect(self, connection);
    }

    fn try_recv_event(&mut self) -> Option<NetEvent> {
        Self::try_recv_event(self)
    }

    fn max_frame_bytes(&self) -> usize {
        self.config().max_frame_bytes
    }
}
