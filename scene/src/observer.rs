//! Observer-side scene synchronization.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use assets::AssetCache;
use bytes::Bytes;
use codec::{CodecError, CodecLimits, DecodeContext, EntityId};
use net::{ConnectionId, NetEvent};
use schema::ChangeFlags;
use tracing::{error, info, warn};
use wire::FrameReader;

use crate::config::SyncConfig;
use crate::dispatcher::MainThreadDispatcher;
use crate::error::{SyncError, SyncResult};
use crate::mirror::{MirrorListener, MirrorScene};
use crate::service::ServiceRegistry;
use crate::transport::SyncTransport;

/// Applies every message of `frame` to `scene`.
///
/// With `lerp` set, lerpable deltas blend toward the received values by
/// that factor. Messages before a failing one stay applied; the failing one
/// leaves no trace. Returns the number of messages applied.
pub fn apply_frame(
    scene: &mut MirrorScene,
    registry: &ServiceRegistry,
    ctx: &DecodeContext<'_>,
    frame: &[u8],
    lerp: Option<f32>,
    mut listener: Option<&mut dyn MirrorListener>,
) -> SyncResult<usize> {
    let mut reader = FrameReader::new(frame)?;
    let mut applied = 0;
    while let Some(header) = reader.next_message()? {
        let entity = EntityId::new(header.entity);
        if header.is_tombstone() {
            if scene.remove(entity).is_some() {
                if let Some(listener) = listener.as_deref_mut() {
                    listener.entity_destroyed(entity);
                }
            }
            applied += 1;
            continue;
        }

        let kind = registry
            .kind_for_code(header.code)
            .ok_or(CodecError::UnknownKind { code: header.code })?;
        let flags = ChangeFlags::from_bits(header.flags);
        let mut data = scene
            .component(entity, kind)
            .cloned()
            .unwrap_or_else(|| registry.attach_observer(kind));
        match lerp {
            Some(t) => data.decode_lerp(flags, reader.payload(), ctx, t)?,
            None => data.decode(flags, reader.payload(), ctx)?,
        }
        let (data, created) = scene.insert_component(entity, data);
        if created {
            if let Some(listener) = listener.as_deref_mut() {
                listener.entity_created(entity);
            }
        }
        if let Some(listener) = listener.as_deref_mut() {
            listener.component_updated(entity, data, flags);
        }
        applied += 1;
    }
    Ok(applied)
}

/// What one observer tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObserverTick {
    pub frames_applied: usize,
    pub messages_applied: usize,
    /// Frames dropped because their connection had desynced.
    pub frames_ignored: usize,
    pub desyncs: usize,
}

#[derive(Debug)]
struct PendingFrame {
    connection: ConnectionId,
    frame: Bytes,
    arrived: f32,
    interval: f32,
}

/// Receives frames and maintains a [`MirrorScene`].
///
/// Without interpolation each frame is applied as it is drained. With
/// interpolation the newest frame is held back: every tick the presented
/// scene is the committed scene with that frame lerp-applied at
/// `t = elapsed / host frame interval`, and the frame is committed when the
/// next one arrives. The listener only sees committed changes.
pub struct ObserverSyncManager<T> {
    transport: T,
    config: SyncConfig,
    assets: Arc<AssetCache>,
    limits: CodecLimits,
    registry: ServiceRegistry,
    committed: MirrorScene,
    presented: Option<MirrorScene>,
    pending: Option<PendingFrame>,
    last_host_time: Option<f32>,
    listener: Option<Box<dyn MirrorListener>>,
    connections: BTreeSet<ConnectionId>,
    desynced: HashSet<ConnectionId>,
    dispatcher: MainThreadDispatcher,
}

impl<T: SyncTransport> ObserverSyncManager<T> {
    #[must_use]
    pub fn new(transport: T, assets: Arc<AssetCache>, config: SyncConfig) -> Self {
        Self {
            transport,
            registry: ServiceRegistry::new(&config.kinds),
            limits: config.codec_limits(),
            config,
            assets,
            committed: MirrorScene::new(),
            presented: None,
            pending: None,
            last_host_time: None,
            listener: None,
            connections: BTreeSet::new(),
            desynced: HashSet::new(),
            dispatcher: MainThreadDispatcher::new(),
        }
    }

    pub fn set_listener(&mut self, listener: Box<dyn MirrorListener>) {
        self.listener = Some(listener);
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub const fn dispatcher(&self) -> &MainThreadDispatcher {
        &self.dispatcher
    }

    /// The scene to render: interpolated when a frame is pending.
    pub fn scene(&self) -> &MirrorScene {
        self.presented.as_ref().unwrap_or(&self.committed)
    }

    /// State after every fully applied frame.
    pub const fn committed_scene(&self) -> &MirrorScene {
        &self.committed
    }

    /// Live connections, ascending.
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.connections.iter().copied().collect()
    }

    #[must_use]
    pub fn is_desynced(&self, connection: ConnectionId) -> bool {
        self.desynced.contains(&connection)
    }

    /// Drains received frames and applies them.
    ///
    /// `now` is the observer clock in seconds; only interpolation uses it.
    pub fn tick(&mut self, now: f32) -> SyncResult<ObserverTick> {
        self.dispatcher.ensure_owner("ObserverSyncManager::tick")?;
        self.dispatcher.run_pending()?;

        let mut report = ObserverTick::default();
        while let Some(event) = self.transport.try_recv_event() {
            match event {
                NetEvent::Connected { id, peer } => {
                    info!(connection = %id, %peer, "connected to host");
                    self.connections.insert(id);
                }
                NetEvent::Disconnected { id } => {
                    info!(connection = %id, "disconnected from host");
                    self.connections.remove(&id);
                    if self.pending.as_ref().is_some_and(|p| p.connection == id) {
                        self.commit_pending(&mut report);
                    }
                }
                NetEvent::Received { id, frame } => {
                    if self.desynced.contains(&id) {
                        report.frames_ignored += 1;
                    } else if self.config.interpolate {
                        self.commit_pending(&mut report);
                        self.hold(id, frame, now, &mut report);
                    } else {
                        self.commit(id, &frame, &mut report);
                    }
                }
                NetEvent::ConnectFailed { address, error } => {
                    warn!(%address, %error, "connect failed");
                }
            }
        }

        if self.config.interpolate {
            self.present(now, &mut report);
        }
        Ok(report)
    }

    fn commit(&mut self, connection: ConnectionId, frame: &[u8], report: &mut ObserverTick) {
        let ctx = DecodeContext::new(&self.assets, &self.limits);
        let listener: Option<&mut dyn MirrorListener> = match self.listener.as_mut() {
            Some(listener) => Some(listener.as_mut()),
            None => None,
        };
        let result = apply_frame(&mut self.committed, &self.registry, &ctx, frame, None, listener);
        match result {
            Ok(messages) => {
                report.frames_applied += 1;
                report.messages_applied += messages;
            }
            Err(err) => self.desync(connection, &err, report),
        }
    }

    fn commit_pending(&mut self, report: &mut ObserverTick) {
        if let Some(pending) = self.pending.take() {
            self.presented = None;
            self.commit(pending.connection, &pending.frame, report);
        }
    }

    fn hold(&mut self, connection: ConnectionId, frame: Bytes, now: f32, report: &mut ObserverTick) {
        let host_time = match FrameReader::new(&frame) {
            Ok(reader) => reader.header().host_time,
            Err(err) => {
                self.desync(connection, &err.into(), report);
                return;
            }
        };
        let fallback = self.config.tick_interval().as_secs_f32();
        let interval = self
            .last_host_time
            .map(|last| host_time - last)
            .filter(|interval| interval.is_finite() && *interval > 0.0)
            .unwrap_or(fallback);
        self.last_host_time = Some(host_time);
        self.pending = Some(PendingFrame {
            connection,
            frame,
            arrived: now,
            interval,
        });
    }

    fn present(&mut self, now: f32, report: &mut ObserverTick) {
        let Some(pending) = &self.pending else {
            self.presented = None;
            return;
        };
        let t = (now - pending.arrived) / pending.interval;
        let mut presented = self.committed.clone();
        let ctx = DecodeContext::new(&self.assets, &self.limits);
        match apply_frame(&mut presented, &self.registry, &ctx, &pending.frame, Some(t), None) {
            Ok(_) => self.presented = Some(presented),
            Err(err) => {
                let connection = pending.connection;
                self.desync(connection, &err, report);
            }
        }
    }

    fn desync(&mut self, connection: ConnectionId, err: &SyncError, report: &mut ObserverTick) {
        error!(%connection, error = %err, "protocol desync, dropping connection");
        report.desyncs += 1;
        self.desynced.insert(connection);
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.connection == connection)
        {
            self.pending = None;
            self.presented = None;
        }
        self.transport.disconnect(connection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytestream::{ByteWriter, Vec3};
    use codec::{encode_message, ComponentData, EncodeContext, MaskState, TransformState};
    use schema::{transform, ComponentKind};
    use wire::{begin_frame, MessageHeader};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl MirrorListener for Recorder {
        fn entity_created(&mut self, entity: EntityId) {
            self.events.push(format!("created {}", entity.raw()));
        }

        fn component_updated(&mut self, entity: EntityId, data: &ComponentData, _: ChangeFlags) {
            self.events.push(format!("updated {} {}", entity.raw(), data.kind()));
        }

        fn entity_destroyed(&mut self, entity: EntityId) {
            self.events.push(format!("destroyed {}", entity.raw()));
        }
    }

    fn frame_with(build: impl FnOnce(&mut ByteWriter, &EncodeContext<'_>)) -> Vec<u8> {
        let cache = AssetCache::empty();
        let mut writer = begin_frame(0.0, 64);
        build(&mut writer, &EncodeContext::new(&cache));
        writer.finish()
    }

    #[test]
    fn apply_creates_updates_and_destroys() {
        let registry = ServiceRegistry::default();
        let cache = AssetCache::empty();
        let limits = CodecLimits::for_testing();
        let ctx = DecodeContext::new(&cache, &limits);
        let mut scene = MirrorScene::new();
        let mut recorder = Recorder::default();

        let entity = EntityId::new(7);
        let frame = frame_with(|writer, encode| {
            let data = ComponentData::from(TransformState {
                position: Vec3::X,
                ..TransformState::default()
            });
            encode_message(writer, entity, &data, ComponentKind::Transform.all_flags(), encode);
        });
        let applied =
            apply_frame(&mut scene, &registry, &ctx, &frame, None, Some(&mut recorder)).unwrap();
        assert_eq!(applied, 1);
        assert_eq!(scene.transform(entity).map(|t| t.position), Some(Vec3::X));

        let frame = frame_with(|writer, _| MessageHeader::tombstone(7).encode(writer));
        apply_frame(&mut scene, &registry, &ctx, &frame, None, Some(&mut recorder)).unwrap();
        assert!(scene.is_empty());
        assert_eq!(
            recorder.events,
            vec!["created 7", "updated 7 transform", "destroyed 7"]
        );
    }

    #[test]
    fn unregistered_kind_is_a_desync() {
        let registry = ServiceRegistry::new(&[ComponentKind::Transform]);
        let cache = AssetCache::empty();
        let limits = CodecLimits::default();
        let ctx = DecodeContext::new(&cache, &limits);
        let mut scene = MirrorScene::new();

        let frame = frame_with(|writer, encode| {
            let data = ComponentData::from(MaskState::default());
            encode_message(writer, EntityId::new(1), &data, ComponentKind::Mask.all_flags(), encode);
        });
        let err = apply_frame(&mut scene, &registry, &ctx, &frame, None, None).unwrap_err();
        assert!(err.is_desync());
        assert!(scene.is_empty());
    }

    #[test]
    fn earlier_messages_survive_a_bad_one() {
        let registry = ServiceRegistry::default();
        let cache = AssetCache::empty();
        let limits = CodecLimits::default();
        let ctx = DecodeContext::new(&cache, &limits);
        let mut scene = MirrorScene::new();

        let mut frame = frame_with(|writer, encode| {
            let data = ComponentData::from(MaskState {
                enabled: true,
                show_graphic: true,
            });
            encode_message(writer, EntityId::new(1), &data, ComponentKind::Mask.all_flags(), encode);
        });
        // Truncated transform position delta.
        frame.extend_from_slice(&[2, 0, 0, 0, b'T', b'R', b'N', transform::POSITION.bits(), 0]);

        assert!(apply_frame(&mut scene, &registry, &ctx, &frame, None, None).is_err());
        assert!(scene.component(EntityId::new(1), ComponentKind::Mask).is_some());
    }

    #[test]
    fn truncated_message_leaves_mirror_untouched() {
        let registry = ServiceRegistry::default();
        let cache = AssetCache::empty();
        let limits = CodecLimits::default();
        let ctx = DecodeContext::new(&cache, &limits);
        let mut scene = MirrorScene::new();
        let mut recorder = Recorder::default();

        let entity = EntityId::new(7);
        let frame = frame_with(|writer, encode| {
            let data = ComponentData::from(TransformState {
                position: Vec3::X,
                ..TransformState::default()
            });
            encode_message(writer, entity, &data, ComponentKind::Transform.all_flags(), encode);
        });
        apply_frame(&mut scene, &registry, &ctx, &frame, None, Some(&mut recorder)).unwrap();
        let before = scene.clone();
        recorder.events.clear();

        // Full position followed by a cut-off rotation.
        let flags = transform::POSITION.union(transform::ROTATION);
        let mut update = frame_with(|writer, _| {
            MessageHeader::new(7, ComponentKind::Transform.code(), flags.bits()).encode(writer);
            writer.write_vec3(Vec3::Y);
        });
        update.extend_from_slice(&[0, 0]);
        let result = apply_frame(&mut scene, &registry, &ctx, &update, None, Some(&mut recorder));
        assert!(result.is_err());
        assert_eq!(scene, before);

        // Same cut for an entity the mirror has never seen.
        let mut unseen = frame_with(|writer, _| {
            MessageHeader::new(9, ComponentKind::Transform.code(), flags.bits()).encode(writer);
            writer.write_vec3(Vec3::Y);
        });
        unseen.extend_from_slice(&[0, 0]);
        let result =
            apply_frame(&mut scene, &registry, &ctx, &unseen, Some(0.5), Some(&mut recorder));
        assert!(result.is_err());
        assert!(!scene.contains(EntityId::new(9)));
        assert_eq!(scene, before);
        assert!(recorder.events.is_empty());
    }
}
