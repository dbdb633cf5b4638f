#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use assets::AssetCache;
use bytes::Bytes;
use crossbeam_channel::{unbounded, Receiver, Sender};
use net::{ConnectionId, NetError, NetEvent, NetResult};
use scene::{HostSyncManager, ObserverSyncManager, SyncConfig, SyncTransport};
use wire::{FrameReader, Limits};

fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

struct Link {
    to_observer: Sender<NetEvent>,
    observer_id: ConnectionId,
    open: Arc<AtomicBool>,
}

/// Host end of an in-memory transport with any number of observers.
pub struct Hub {
    inbox_tx: Sender<NetEvent>,
    inbox_rx: Receiver<NetEvent>,
    links: BTreeMap<ConnectionId, Link>,
    next: u64,
    /// Simulated outbound backlog per connection.
    pub queued: HashMap<ConnectionId, usize>,
    /// Every frame sent, in order.
    pub sent: Vec<(ConnectionId, Vec<u8>)>,
    /// Frames above this size are refused.
    pub max_frame_bytes: usize,
}

impl Hub {
    pub fn new() -> Self {
        let (inbox_tx, inbox_rx) = unbounded();
        Self {
            inbox_tx,
            inbox_rx,
            links: BTreeMap::new(),
            next: 1,
            queued: HashMap::new(),
            sent: Vec::new(),
            max_frame_bytes: Limits::default().max_frame_bytes,
        }
    }

    /// Opens a connection; both ends see `Connected` on their next drain.
    pub fn connect(&mut self) -> ObserverEnd {
        let host_id = ConnectionId::new(self.next);
        let observer_id = ConnectionId::new(1000 + self.next);
        self.next += 1;
        let (to_observer, inbox) = unbounded();
        let open = Arc::new(AtomicBool::new(true));
        self.links.insert(
            host_id,
            Link {
                to_observer: to_observer.clone(),
                observer_id,
                open: Arc::clone(&open),
            },
        );
        self.inbox_tx
            .send(NetEvent::Connected {
                id: host_id,
                peer: peer(),
            })
            .unwrap();
        to_observer
            .send(NetEvent::Connected {
                id: observer_id,
                peer: peer(),
            })
            .unwrap();
        ObserverEnd {
            inbox,
            own: to_observer,
            to_host: Some(self.inbox_tx.clone()),
            id: observer_id,
            host_id,
            open,
        }
    }

    /// Frames sent to `connection`, oldest first.
    pub fn frames_to(&self, connection: ConnectionId) -> Vec<Vec<u8>> {
        self.sent
            .iter()
            .filter(|(id, _)| *id == connection)
            .map(|(_, frame)| frame.clone())
            .collect()
    }

    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Breaks the link without telling either end, like a socket that died
    /// between ticks.
    pub fn sever(&mut self, connection: ConnectionId) {
        if let Some(link) = self.links.get(&connection) {
            link.open.store(false, Ordering::SeqCst);
        }
    }
}

impl SyncTransport for Hub {
    fn send_to(&mut self, connection: ConnectionId, frame: &[u8]) -> NetResult<()> {
        let link = self
            .links
            .get(&connection)
            .filter(|link| link.open.load(Ordering::SeqCst))
            .ok_or(NetError::UnknownConnection { id: connection })?;
        if frame.len() > self.max_frame_bytes {
            return Err(NetError::FrameTooLarge {
                length: frame.len(),
                limit: self.max_frame_bytes,
            });
        }
        let _ = link.to_observer.send(NetEvent::Received {
            id: link.observer_id,
            frame: Bytes::copy_from_slice(frame),
        });
        self.sent.push((connection, frame.to_vec()));
        Ok(())
    }

    fn output_bytes_queued(&self, connection: ConnectionId) -> usize {
        self.queued.get(&connection).copied().unwrap_or(0)
    }

    fn disconnect(&mut self, connection: ConnectionId) {
        if let Some(link) = self.links.remove(&connection) {
            if link.open.swap(false, Ordering::SeqCst) {
                let _ = self.inbox_tx.send(NetEvent::Disconnected { id: connection });
                let _ = link.to_observer.send(NetEvent::Disconnected {
                    id: link.observer_id,
                });
            }
        }
    }

    fn try_recv_event(&mut self) -> Option<NetEvent> {
        let event = self.inbox_rx.try_recv().ok()?;
        if let NetEvent::Disconnected { id } = &event {
            self.links.remove(id);
        }
        Some(event)
    }

    fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }
}

/// Observer end of a hub connection, or a scripted standalone inbox.
pub struct ObserverEnd {
    inbox: Receiver<NetEvent>,
    own: Sender<NetEvent>,
    to_host: Option<Sender<NetEvent>>,
    pub id: ConnectionId,
    pub host_id: ConnectionId,
    open: Arc<AtomicBool>,
}

impl ObserverEnd {
    /// An inbox not attached to any host; feed it with [`push`](Self::push).
    pub fn scripted(id: ConnectionId) -> Self {
        let (own, inbox) = unbounded();
        own.send(NetEvent::Connected { id, peer: peer() }).unwrap();
        Self {
            inbox,
            own,
            to_host: None,
            id,
            host_id: id,
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn push(&self, event: NetEvent) {
        self.own.send(event).unwrap();
    }

    pub fn push_frame(&self, frame: &[u8]) {
        self.push(NetEvent::Received {
            id: self.id,
            frame: Bytes::copy_from_slice(frame),
        });
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl SyncTransport for ObserverEnd {
    fn send_to(&mut self, connection: ConnectionId, frame: &[u8]) -> NetResult<()> {
        let to_host = self
            .to_host
            .as_ref()
            .filter(|_| connection == self.id && self.is_open())
            .ok_or(NetError::UnknownConnection { id: connection })?;
        let _ = to_host.send(NetEvent::Received {
            id: self.host_id,
            frame: Bytes::copy_from_slice(frame),
        });
        Ok(())
    }

    fn output_bytes_queued(&self, _connection: ConnectionId) -> usize {
        0
    }

    fn disconnect(&mut self, connection: ConnectionId) {
        if connection == self.id && self.open.swap(false, Ordering::SeqCst) {
            let _ = self.own.send(NetEvent::Disconnected { id: self.id });
            if let Some(to_host) = &self.to_host {
                let _ = to_host.send(NetEvent::Disconnected { id: self.host_id });
            }
        }
    }

    fn try_recv_event(&mut self) -> Option<NetEvent> {
        self.inbox.try_recv().ok()
    }
}

pub fn host(config: SyncConfig) -> HostSyncManager<Hub> {
    HostSyncManager::new(Hub::new(), Arc::new(AssetCache::empty()), config)
}

pub fn observer(end: ObserverEnd, config: SyncConfig) -> ObserverSyncManager<ObserverEnd> {
    ObserverSyncManager::new(end, Arc::new(AssetCache::empty()), config)
}

/// `(entity, code, flags)` of every message in `frame`, skipping payloads
/// by decoding them into scratch state.
pub fn message_codes(frame: &[u8]) -> Vec<(u32, String, u8)> {
    let registry = scene::ServiceRegistry::default();
    let mut mirror = scene::MirrorScene::new();
    let cache = AssetCache::empty();
    let limits = codec::CodecLimits::default();
    let ctx = codec::DecodeContext::new(&cache, &limits);
    let mut reader = FrameReader::new(frame).unwrap();
    let mut out = Vec::new();
    while let Some(header) = reader.next_message().unwrap() {
        out.push((header.entity, header.code.as_str().to_owned(), header.flags));
        if header.is_tombstone() {
            continue;
        }
        let kind = registry.kind_for_code(header.code).unwrap();
        let entity = codec::EntityId::new(header.entity);
        let mut data = mirror
            .component(entity, kind)
            .cloned()
            .unwrap_or_else(|| codec::ComponentData::default_for(kind));
        data.decode(schema::ChangeFlags::from_bits(header.flags), reader.payload(), &ctx)
            .unwrap();
        mirror.insert_component(entity, data);
    }
    out
}
