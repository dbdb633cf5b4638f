//! Connection manager: listener, dialer and the connection table.

use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::NetConfig;
use crate::connection::{self, Connection};
use crate::error::{NetError, NetResult};
use crate::event::{ConnectionId, NetEvent};

/// State shared between the manager and its I/O threads.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) config: NetConfig,
    pub(crate) connections: Mutex<HashMap<ConnectionId, Arc<Connection>>>,
    events: Sender<NetEvent>,
    next_id: AtomicU64,
}

impl Shared {
    pub(crate) fn next_id(&self) -> ConnectionId {
        ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn emit(&self, event: NetEvent) {
        // The receiver only goes away with the manager.
        let _ = self.events.send(event);
    }

    /// Removes `id` from the table and reports it once.
    pub(crate) fn close(&self, id: ConnectionId, reason: &str) {
        let removed = self.connections.lock().remove(&id);
        if let Some(connection) = removed {
            if connection.shutdown() {
                info!(%id, peer = %connection.peer(), reason, "connection closed");
                self.emit(NetEvent::Disconnected { id });
            }
        }
    }
}

#[derive(Debug)]
struct Listener {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// Owns every TCP connection of one endpoint.
///
/// I/O happens on background threads; the owner polls events with
/// [`try_recv_event`](Self::try_recv_event) or
/// [`drain_events`](Self::drain_events). Sends never block: frames are queued
/// per connection and [`output_bytes_queued`](Self::output_bytes_queued)
/// reports the backlog.
#[derive(Debug)]
pub struct ConnectionManager {
    shared: Arc<Shared>,
    events: Receiver<NetEvent>,
    listener: Option<Listener>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(config: NetConfig) -> Self {
        let (tx, rx) = unbounded();
        Self {
            shared: Arc::new(Shared {
                config,
                connections: Mutex::new(HashMap::new()),
                events: tx,
                next_id: AtomicU64::new(1),
            }),
            events: rx,
            listener: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.shared.config
    }

    /// Address of the active listener.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(|listener| listener.addr)
    }

    /// Binds `port` (0 for an ephemeral port) and accepts in the background.
    pub fn start_listening(&mut self, port: u16) -> NetResult<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Err(NetError::AlreadyListening {
                addr: listener.addr,
            });
        }
        let socket = TcpListener::bind((self.shared.config.bind_address, port))?;
        socket.set_nonblocking(true)?;
        let addr = socket.local_addr()?;

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let shared = Arc::clone(&self.shared);
        let thread = thread::Builder::new()
            .name("scenecast-accept".to_owned())
            .spawn(move || accept_loop(&shared, &socket, &thread_stop))?;

        info!(%addr, "listening");
        self.listener = Some(Listener {
            addr,
            stop,
            thread: Some(thread),
        });
        Ok(addr)
    }

    /// Stops accepting. Established connections stay open.
    pub fn stop_listening(&mut self) -> NetResult<()> {
        let mut listener = self.listener.take().ok_or(NetError::NotListening)?;
        listener.stop.store(true, Ordering::Release);
        if let Some(thread) = listener.thread.take() {
            if thread.join().is_err() {
                warn!(addr = %listener.addr, "accept thread panicked");
            }
        }
        info!(addr = %listener.addr, "stopped listening");
        Ok(())
    }

    /// Dials `address:port` on a background thread.
    ///
    /// The outcome arrives as [`NetEvent::Connected`] or
    /// [`NetEvent::ConnectFailed`].
    pub fn connect_to(&self, address: &str, port: u16) -> NetResult<()> {
        let shared = Arc::clone(&self.shared);
        let address = address.to_owned();
        thread::Builder::new()
            .name("scenecast-dial".to_owned())
            .spawn(move || {
                let target = format!("{address}:{port}");
                match dial(&address, port, shared.config.connect_timeout()) {
                    Ok(stream) => {
                        if let Err(err) = connection::spawn(&shared, stream) {
                            warn!(%target, error = %err, "connection setup failed");
                            shared.emit(NetEvent::ConnectFailed {
                                address: target,
                                error: err.to_string(),
                            });
                        }
                    }
                    Err(err) => {
                        warn!(%target, error = %err, "connect failed");
                        shared.emit(NetEvent::ConnectFailed {
                            address: target,
                            error: err.to_string(),
                        });
                    }
                }
            })?;
        Ok(())
    }

    /// Queues `frame` on every live connection; returns how many.
    pub fn broadcast(&self, frame: &[u8]) -> NetResult<usize> {
        self.check_frame(frame.len())?;
        let frame = Bytes::copy_from_slice(frame);
        let connections: Vec<_> = self.shared.connections.lock().values().cloned().collect();
        let mut sent = 0;
        for connection in connections {
            if connection.enqueue(frame.clone()).is_ok() {
                sent += 1;
            }
        }
        Ok(sent)
    }

    /// Queues `frame` on one connection.
    pub fn send_to(&self, id: ConnectionId, frame: &[u8]) -> NetResult<()> {
        self.check_frame(frame.len())?;
        let connection = self.connection(id)?;
        connection.enqueue(Bytes::copy_from_slice(frame))
    }

    pub fn disconnect(&self, id: ConnectionId) -> NetResult<()> {
        self.connection(id)?;
        self.shared.close(id, "disconnected locally");
        Ok(())
    }

    pub fn disconnect_all(&self) {
        for id in self.connections() {
            self.shared.close(id, "disconnected locally");
        }
    }

    /// Bytes waiting in `id`'s outbound queue; `0` for unknown connections.
    #[must_use]
    pub fn output_bytes_queued(&self, id: ConnectionId) -> usize {
        self.shared
            .connections
            .lock()
            .get(&id)
            .map_or(0, |connection| connection.queued_bytes())
    }

    /// Largest outbound backlog over all connections.
    #[must_use]
    pub fn max_output_bytes_queued(&self) -> usize {
        self.shared
            .connections
            .lock()
            .values()
            .map(|connection| connection.queued_bytes())
            .max()
            .unwrap_or(0)
    }

    /// Live connections in ascending id order.
    #[must_use]
    pub fn connections(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = self.shared.connections.lock().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn peer_addr(&self, id: ConnectionId) -> Option<SocketAddr> {
        self.shared
            .connections
            .lock()
            .get(&id)
            .map(|connection| connection.peer())
    }

    #[must_use]
    pub fn try_recv_event(&self) -> Option<NetEvent> {
        self.events.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    #[must_use]
    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<NetEvent> {
        self.events.recv_timeout(timeout).ok()
    }

    /// Every event queued so far, in arrival order.
    #[must_use]
    pub fn drain_events(&self) -> Vec<NetEvent> {
        self.events.try_iter().collect()
    }

    fn connection(&self, id: ConnectionId) -> NetResult<Arc<Connection>> {
        self.shared
            .connections
            .lock()
            .get(&id)
            .cloned()
            .ok_or(NetError::UnknownConnection { id })
    }

    fn check_frame(&self, length: usize) -> NetResult<()> {
        let limit = self.shared.config.max_frame_bytes;
        if length > limit {
            return Err(NetError::FrameTooLarge { length, limit });
        }
        Ok(())
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if self.listener.is_some() {
            let _ = self.stop_listening();
        }
        self.disconnect_all();
    }
}

fn accept_loop(shared: &Arc<Shared>, socket: &TcpListener, stop: &AtomicBool) {
    let poll = shared.config.accept_poll();
    while !stop.load(Ordering::Acquire) {
        match socket.accept() {
            Ok((stream, peer)) => {
                debug!(%peer, "accepted");
                let setup = stream
                    .set_nonblocking(false)
                    .map_err(NetError::from)
                    .and_then(|()| connection::spawn(shared, stream));
                if let Err(err) = setup {
                    warn!(%peer, error = %err, "connection setup failed");
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => thread::sleep(poll),
            Err(err) => {
                warn!(error = %err, "accept failed");
                thread::sleep(poll);
            }
        }
    }
}

fn dial(address: &str, port: u16, timeout: Duration) -> std::io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (address, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "address resolved to nothing")
    }))
}
