//! Host-side scene synchronization.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use assets::AssetCache;
use bytestream::ByteWriter;
use codec::{encode_tombstone, EncodeContext, EntityId};
use net::{ConnectionId, NetEvent};
use schema::ComponentKind;
use tracing::{debug, info, warn};
use wire::{begin_frame, SYNC_HEADER_SIZE};

use crate::broadcaster::ConnectionOutputs;
use crate::config::SyncConfig;
use crate::dispatcher::MainThreadDispatcher;
use crate::error::SyncResult;
use crate::mapping::EntityMap;
use crate::provider::{SceneProvider, SourceId};
use crate::service::{ServiceRegistry, ServiceTick, TickContext};
use crate::transport::SyncTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    /// Needs complete snapshots of everything.
    Bootstrap,
    Steady,
    /// Skipped while congested after having received frames. Resyncs like
    /// `Bootstrap`, preceded by the tombstones it missed.
    Stalled { missed: Vec<EntityId> },
}

/// What one host tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostTick {
    pub frames_sent: usize,
    pub bytes_sent: usize,
    /// Connections skipped because their queue was too deep.
    pub throttled: usize,
    /// Connections dropped because a frame could not be queued.
    pub dropped: usize,
    pub tombstones: usize,
    pub services: ServiceTick,
}

/// Drives broadcasters from a [`SceneProvider`] and ships each connection's
/// messages for a tick, split into frames the transport accepts.
///
/// Must be ticked on the thread that created it.
pub struct HostSyncManager<T> {
    transport: T,
    config: SyncConfig,
    assets: Arc<AssetCache>,
    registry: ServiceRegistry,
    entities: EntityMap,
    announced: HashSet<EntityId>,
    connections: BTreeMap<ConnectionId, Phase>,
    tombstones: Vec<EntityId>,
    outputs: ConnectionOutputs,
    dispatcher: MainThreadDispatcher,
    started: Instant,
}

impl<T: SyncTransport> HostSyncManager<T> {
    #[must_use]
    pub fn new(transport: T, assets: Arc<AssetCache>, config: SyncConfig) -> Self {
        Self {
            transport,
            registry: ServiceRegistry::new(&config.kinds),
            config,
            assets,
            entities: EntityMap::new(),
            announced: HashSet::new(),
            connections: BTreeMap::new(),
            tombstones: Vec::new(),
            outputs: ConnectionOutputs::new(),
            dispatcher: MainThreadDispatcher::new(),
            started: Instant::now(),
        }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub const fn dispatcher(&self) -> &MainThreadDispatcher {
        &self.dispatcher
    }

    pub const fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub const fn entities(&self) -> &EntityMap {
        &self.entities
    }

    /// Wire id of `source`, if it has one.
    pub fn entity_id(&self, source: SourceId) -> Option<EntityId> {
        self.entities.entity_id_known(source)
    }

    /// Known connections, ascending.
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.connections.keys().copied().collect()
    }

    /// Runs one synchronization step.
    ///
    /// Order: posted tasks, transport events, source reconciliation,
    /// congestion check, services in dependency order, then tombstones and
    /// the frames of every connection with pending messages.
    pub fn tick(&mut self, provider: &dyn SceneProvider) -> SyncResult<HostTick> {
        self.dispatcher.ensure_owner("HostSyncManager::tick")?;
        self.dispatcher.run_pending()?;
        self.drain_events();
        let parents = self.reconcile(provider);

        let mut report = HostTick::default();
        let congested = self.stall_congested();
        report.throttled = congested.len();

        let mut steady = Vec::new();
        let mut fresh = Vec::new();
        for (connection, phase) in &self.connections {
            if congested.contains(connection) {
                continue;
            }
            match phase {
                Phase::Steady => steady.push(*connection),
                Phase::Bootstrap | Phase::Stalled { .. } => fresh.push(*connection),
            }
        }

        report.services = {
            let mut ctx = TickContext {
                provider,
                entities: &self.entities,
                parents: &parents,
                announced: &mut self.announced,
                steady: &steady,
                fresh: &fresh,
                outputs: &mut self.outputs,
                encode: EncodeContext::new(&self.assets),
            };
            self.registry.run_tick(&mut ctx)
        };

        // Bootstrapping connections never saw these entities.
        let tombstones = std::mem::take(&mut self.tombstones);
        report.tombstones = tombstones.len();
        for entity in &tombstones {
            queue_tombstone(&mut self.outputs, &steady, *entity);
        }
        for connection in &fresh {
            if let Some(Phase::Stalled { missed }) =
                self.connections.insert(*connection, Phase::Steady)
            {
                for entity in missed.iter().chain(&tombstones) {
                    queue_tombstone(&mut self.outputs, &[*connection], *entity);
                }
            }
        }
        for phase in self.connections.values_mut() {
            if let Phase::Stalled { missed } = phase {
                missed.extend_from_slice(&tombstones);
            }
        }

        self.send_frames(&mut report);
        Ok(report)
    }

    fn send_frames(&mut self, report: &mut HostTick) {
        let host_time = self.started.elapsed().as_secs_f32();
        let max_payload = self
            .transport
            .max_frame_bytes()
            .saturating_sub(SYNC_HEADER_SIZE);
        for (connection, payloads) in self.outputs.drain(max_payload) {
            for payload in payloads {
                let mut frame = begin_frame(host_time, payload.len());
                frame.write_bytes(&payload);
                let frame = frame.finish();
                if let Err(err) = self.transport.send_to(connection, &frame) {
                    warn!(%connection, error = %err, "frame not sent, dropping connection");
                    self.transport.disconnect(connection);
                    self.connections.remove(&connection);
                    report.dropped += 1;
                    break;
                }
                report.frames_sent += 1;
                report.bytes_sent += frame.len();
            }
        }
    }

    fn drain_events(&mut self) {
        while let Some(event) = self.transport.try_recv_event() {
            match event {
                NetEvent::Connected { id, peer } => {
                    info!(connection = %id, %peer, "observer connected");
                    self.connections.insert(id, Phase::Bootstrap);
                }
                NetEvent::Disconnected { id } => {
                    if self.connections.remove(&id).is_some() {
                        info!(connection = %id, "observer disconnected");
                    }
                }
                NetEvent::Received { id, frame } => {
                    debug!(connection = %id, bytes = frame.len(), "ignoring inbound frame");
                }
                NetEvent::ConnectFailed { address, error } => {
                    warn!(%address, %error, "connect failed");
                }
            }
        }
    }

    /// Attaches broadcasters for new components, detaches removed ones and
    /// queues tombstones for vanished sources. Returns each source's parent.
    fn reconcile(&mut self, provider: &dyn SceneProvider) -> HashMap<SourceId, SourceId> {
        let kinds: Vec<ComponentKind> = self.registry.kinds().collect();
        let mut live = HashSet::new();
        let mut parents = HashMap::new();

        for node in provider.sources() {
            live.insert(node.id);
            let entity = self.entities.entity_id(node.id);
            if let Some(parent) = node.parent {
                parents.insert(node.id, parent);
            }
            for kind in &kinds {
                let listed = node.components.contains(kind);
                let tracked = self
                    .registry
                    .service(*kind)
                    .is_some_and(|service| service.contains(entity));
                if listed && !tracked {
                    self.registry.attach_broadcaster(*kind, entity, node.id);
                } else if !listed && tracked {
                    self.registry.detach_broadcaster(*kind, entity);
                }
            }
        }

        let mut vanished: Vec<(SourceId, EntityId)> = self
            .entities
            .iter()
            .filter(|(source, _)| !live.contains(source))
            .collect();
        vanished.sort_unstable_by_key(|(_, entity)| *entity);
        for (source, entity) in vanished {
            self.registry.detach_entity(entity);
            self.entities.retire(source);
            if self.announced.remove(&entity) {
                self.tombstones.push(entity);
            }
        }
        parents
    }

    /// Connections whose queue is over the limit. Steady ones among them
    /// become stalled.
    fn stall_congested(&mut self) -> Vec<ConnectionId> {
        let limit = self.config.max_queued_bytes;
        let mut congested = Vec::new();
        for (connection, phase) in &mut self.connections {
            let queued = self.transport.output_bytes_queued(*connection);
            if queued <= limit {
                continue;
            }
            debug!(%connection, queued, limit, "throttling connection");
            if *phase == Phase::Steady {
                *phase = Phase::Stalled { missed: Vec::new() };
            }
            congested.push(*connection);
        }
        congested
    }
}

fn queue_tombstone(
    outputs: &mut ConnectionOutputs,
    connections: &[ConnectionId],
    entity: EntityId,
) {
    let mut writer = ByteWriter::new();
    encode_tombstone(&mut writer, entity);
    outputs.write_to(connections, writer.as_slice());
}
