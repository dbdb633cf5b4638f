//! Per-connection reader and writer threads.
//!
//! Each socket gets two threads. The reader splits the stream into frames
//! and forwards them as events; the writer drains an outbound queue of
//! already-encoded frames and writes them length-prefixed. Both report the
//! first failure through [`Shared::close`], which fires `Disconnected`
//! exactly once.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};
use wire::{length_prefix, FrameDecoder, Limits, LENGTH_PREFIX_SIZE};

use crate::error::{NetError, NetResult};
use crate::event::{ConnectionId, NetEvent};
use crate::manager::Shared;

/// Handle to one live connection, owned by the connection table.
#[derive(Debug)]
pub(crate) struct Connection {
    id: ConnectionId,
    peer: SocketAddr,
    stream: TcpStream,
    outbound: Sender<Bytes>,
    queued: Arc<AtomicUsize>,
    closed: AtomicBool,
}

impl Connection {
    pub(crate) const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Bytes handed to the writer and not yet written to the socket.
    pub(crate) fn queued_bytes(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }

    /// Queues an encoded frame. The length prefix is added by the writer.
    pub(crate) fn enqueue(&self, frame: Bytes) -> NetResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(NetError::UnknownConnection { id: self.id });
        }
        let size = frame.len() + LENGTH_PREFIX_SIZE;
        self.queued.fetch_add(size, Ordering::AcqRel);
        if self.outbound.send(frame).is_err() {
            self.queued.fetch_sub(size, Ordering::AcqRel);
            return Err(NetError::UnknownConnection { id: self.id });
        }
        Ok(())
    }

    /// Marks the connection closed and shuts the socket down.
    ///
    /// Returns `false` if it was already closed.
    pub(crate) fn shutdown(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        // Unblocks the reader thread; the peer may already be gone.
        if let Err(err) = self.stream.shutdown(Shutdown::Both) {
            debug!(id = %self.id, error = %err, "socket shutdown failed");
        }
        true
    }
}

/// Registers `stream` and starts its reader and writer threads.
pub(crate) fn spawn(shared: &Arc<Shared>, stream: TcpStream) -> NetResult<ConnectionId> {
    stream.set_nodelay(shared.config.nodelay)?;
    let peer = stream.peer_addr()?;
    let read_stream = stream.try_clone()?;
    let write_stream = stream.try_clone()?;

    let id = shared.next_id();
    let (outbound, outbound_rx) = unbounded();
    let queued = Arc::new(AtomicUsize::new(0));
    let connection = Arc::new(Connection {
        id,
        peer,
        stream,
        outbound,
        queued: Arc::clone(&queued),
        closed: AtomicBool::new(false),
    });

    shared.connections.lock().insert(id, connection);
    info!(%id, %peer, "connection established");
    shared.emit(NetEvent::Connected { id, peer });

    let reader_shared = Arc::clone(shared);
    let limits = shared.config.wire_limits();
    let buffer_size = shared.config.read_buffer_bytes.max(1);
    thread::Builder::new()
        .name(format!("scenecast-read-{}", id.raw()))
        .spawn(move || {
            let reason = read_loop(&reader_shared, id, read_stream, limits, buffer_size);
            reader_shared.close(id, &reason);
        })?;

    let writer_shared = Arc::clone(shared);
    let limits = shared.config.wire_limits();
    thread::Builder::new()
        .name(format!("scenecast-write-{}", id.raw()))
        .spawn(move || {
            if let Some(reason) = write_loop(write_stream, &outbound_rx, &queued, &limits) {
                writer_shared.close(id, &reason);
            }
        })?;

    Ok(id)
}

/// Reads until the socket fails; returns why it stopped.
fn read_loop(
    shared: &Shared,
    id: ConnectionId,
    mut stream: TcpStream,
    limits: Limits,
    buffer_size: usize,
) -> String {
    let mut decoder = FrameDecoder::new(limits);
    let mut buf = vec![0u8; buffer_size];
    loop {
        let read = match stream.read(&mut buf) {
            Ok(0) => return "closed by peer".to_owned(),
            Ok(read) => read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return format!("read failed: {err}"),
        };
        decoder.extend(&buf[..read]);
        loop {
            match decoder.next_frame() {
                Ok(Some(frame)) => shared.emit(NetEvent::Received { id, frame }),
                Ok(None) => break,
                Err(err) => return format!("framing error: {err}"),
            }
        }
    }
}

/// Writes queued frames until the queue closes or the socket fails.
///
/// Returns a reason only on failure.
fn write_loop(
    mut stream: TcpStream,
    outbound: &Receiver<Bytes>,
    queued: &AtomicUsize,
    limits: &Limits,
) -> Option<String> {
    for frame in outbound {
        let size = frame.len() + LENGTH_PREFIX_SIZE;
        let result = length_prefix(frame.len(), limits)
            .map_err(|err| format!("frame rejected: {err}"))
            .and_then(|prefix| {
                stream
                    .write_all(&prefix)
                    .and_then(|()| stream.write_all(&frame))
                    .map_err(|err| format!("write failed: {err}"))
            });
        queued.fetch_sub(size, Ordering::AcqRel);
        if let Err(reason) = result {
            warn!(error = %reason, "writer stopped");
            return Some(reason);
        }
    }
    None
}
