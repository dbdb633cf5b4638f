//! Host-side change tracking for one component.

use std::collections::BTreeMap;

use bytestream::ByteWriter;
use codec::{encode_message, ComponentData, EncodeContext, EntityId};
use net::ConnectionId;
use schema::{ChangeFlags, ComponentKind};

/// Per-connection message buffers for one tick.
///
/// Each [`write_to`](Self::write_to) call is one message; draining never
/// splits a message across frames.
#[derive(Debug, Default)]
pub struct ConnectionOutputs {
    buffers: BTreeMap<ConnectionId, Buffer>,
}

#[derive(Debug, Default)]
struct Buffer {
    writer: ByteWriter,
    /// End offset of every message in `writer`.
    ends: Vec<usize>,
}

impl ConnectionOutputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the message `bytes` to each listed connection's buffer.
    pub fn write_to(&mut self, connections: &[ConnectionId], bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        for connection in connections {
            let buffer = self.buffers.entry(*connection).or_default();
            buffer.writer.write_bytes(bytes);
            buffer.ends.push(buffer.writer.len());
        }
    }

    /// Bytes buffered for `connection` so far.
    #[must_use]
    pub fn pending(&self, connection: ConnectionId) -> &[u8] {
        self.buffers
            .get(&connection)
            .map_or(&[], |buffer| buffer.writer.as_slice())
    }

    /// Takes every non-empty buffer, in connection order, cut into frame
    /// payloads of at most `max_payload` bytes. A message larger than that
    /// gets a payload of its own.
    pub fn drain(&mut self, max_payload: usize) -> Vec<(ConnectionId, Vec<Vec<u8>>)> {
        std::mem::take(&mut self.buffers)
            .into_iter()
            .filter(|(_, buffer)| !buffer.ends.is_empty())
            .map(|(connection, buffer)| (connection, buffer.split(max_payload)))
            .collect()
    }
}

impl Buffer {
    fn split(self, max_payload: usize) -> Vec<Vec<u8>> {
        let bytes = self.writer.finish();
        if bytes.len() <= max_payload {
            return vec![bytes];
        }
        let mut payloads = Vec::new();
        let mut start = 0;
        let mut cut = 0;
        for end in self.ends {
            if end - start > max_payload && cut > start {
                payloads.push(bytes[start..cut].to_vec());
                start = cut;
            }
            cut = end;
        }
        if cut > start {
            payloads.push(bytes[start..cut].to_vec());
        }
        payloads
    }
}

/// Lifecycle of a [`Broadcaster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcasterState {
    /// Waiting for its first readable, ready snapshot.
    Uninitialized,
    /// Tracking changes against the last sent snapshot.
    Active,
    /// Detached; never sends again.
    Disposed,
}

/// Tracks one component of one entity and serializes its changes.
///
/// The retained baseline is what observers have been sent. Delta
/// calculation folds each changed field into the baseline, so a field is
/// reported once per change rather than every tick.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    entity: EntityId,
    kind: ComponentKind,
    state: BroadcasterState,
    baseline: ComponentData,
    scratch: ByteWriter,
}

impl Broadcaster {
    #[must_use]
    pub fn new(kind: ComponentKind, entity: EntityId) -> Self {
        Self {
            entity,
            kind,
            state: BroadcasterState::Uninitialized,
            baseline: ComponentData::default_for(kind),
            scratch: ByteWriter::new(),
        }
    }

    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    #[must_use]
    pub const fn state(&self) -> BroadcasterState {
        self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, BroadcasterState::Active)
    }

    /// Last snapshot sent to observers.
    #[must_use]
    pub const fn baseline(&self) -> &ComponentData {
        &self.baseline
    }

    /// Captures the first full snapshot. No-op unless uninitialized.
    pub fn activate(&mut self, live: &ComponentData) {
        if self.state != BroadcasterState::Uninitialized {
            return;
        }
        self.baseline = live.clone();
        self.state = BroadcasterState::Active;
    }

    /// Fields of `live` that differ from the baseline; the baseline takes
    /// those values.
    ///
    /// Empty unless active.
    pub fn calculate_delta_changes(&mut self, live: &ComponentData) -> ChangeFlags {
        if !self.is_active() {
            return ChangeFlags::EMPTY;
        }
        let flags = self.kind.mask(live.diff(&self.baseline));
        if !flags.is_empty() {
            self.baseline.copy_from(live, flags);
        }
        flags
    }

    /// Sends every field of the baseline to `connections`.
    pub fn send_complete_changes(
        &mut self,
        outputs: &mut ConnectionOutputs,
        connections: &[ConnectionId],
        ctx: &EncodeContext<'_>,
    ) {
        self.send(outputs, connections, self.kind.all_flags(), ctx);
    }

    /// Sends the `flags` fields of the baseline to `connections`.
    pub fn send_delta_changes(
        &mut self,
        outputs: &mut ConnectionOutputs,
        connections: &[ConnectionId],
        flags: ChangeFlags,
        ctx: &EncodeContext<'_>,
    ) {
        self.send(outputs, connections, flags, ctx);
    }

    pub fn dispose(&mut self) {
        self.state = BroadcasterState::Disposed;
    }

    fn send(
        &mut self,
        outputs: &mut ConnectionOutputs,
        connections: &[ConnectionId],
        flags: ChangeFlags,
        ctx: &EncodeContext<'_>,
    ) {
        if !self.is_active() || connections.is_empty() {
            return;
        }
        self.scratch.clear();
        encode_message(&mut self.scratch, self.entity, &self.baseline, flags, ctx);
        outputs.write_to(connections, self.scratch.as_slice());
    }
}
