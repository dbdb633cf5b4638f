//! Per-kind services and the registry that orders them.

use std::collections::{BTreeMap, HashMap, HashSet};

use codec::{ComponentData, EncodeContext, EntityId};
use net::ConnectionId;
use schema::ComponentKind;
use tracing::debug;
use wire::KindCode;

use crate::broadcaster::{Broadcaster, BroadcasterState, ConnectionOutputs};
use crate::mapping::EntityMap;
use crate::provider::{SceneProvider, SourceId};

/// Everything a service needs for one host tick.
pub struct TickContext<'a> {
    pub provider: &'a dyn SceneProvider,
    pub entities: &'a EntityMap,
    /// Parent of each source that has one, from this tick's source list.
    pub parents: &'a HashMap<SourceId, SourceId>,
    /// Entities with at least one broadcaster that has been sent.
    pub announced: &'a mut HashSet<EntityId>,
    /// Connections past their first tick; they receive deltas.
    pub steady: &'a [ConnectionId],
    /// Connections on their first tick; they receive complete snapshots.
    pub fresh: &'a [ConnectionId],
    pub outputs: &'a mut ConnectionOutputs,
    pub encode: EncodeContext<'a>,
}

/// Counters from one service pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceTick {
    pub activated: usize,
    pub deltas: usize,
    /// Broadcasters left uninitialized because their data is not ready.
    pub deferred: usize,
}

impl ServiceTick {
    fn absorb(&mut self, other: Self) {
        self.activated += other.activated;
        self.deltas += other.deltas;
        self.deferred += other.deferred;
    }
}

#[derive(Debug)]
struct Tracked {
    source: SourceId,
    broadcaster: Broadcaster,
}

enum Live {
    Ready(ComponentData),
    Unreadable,
    Waiting { missing: usize },
}

/// Host-side driver for every broadcaster of one kind.
#[derive(Debug)]
pub struct ComponentService {
    kind: ComponentKind,
    tracked: BTreeMap<EntityId, Tracked>,
}

impl ComponentService {
    #[must_use]
    pub const fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            tracked: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.tracked.contains_key(&entity)
    }

    #[must_use]
    pub fn broadcaster(&self, entity: EntityId) -> Option<&Broadcaster> {
        self.tracked.get(&entity).map(|tracked| &tracked.broadcaster)
    }

    /// Starts tracking `source` as `entity`. Returns `false` if already tracked.
    pub fn attach(&mut self, entity: EntityId, source: SourceId) -> bool {
        if self.tracked.contains_key(&entity) {
            return false;
        }
        self.tracked.insert(
            entity,
            Tracked {
                source,
                broadcaster: Broadcaster::new(self.kind, entity),
            },
        );
        true
    }

    /// Disposes and drops the broadcaster of `entity`.
    pub fn detach(&mut self, entity: EntityId) -> bool {
        match self.tracked.remove(&entity) {
            Some(mut tracked) => {
                tracked.broadcaster.dispose();
                true
            }
            None => false,
        }
    }

    /// Tracked entities, ascending.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.tracked.keys().copied()
    }

    /// Activates ready broadcasters and emits this tick's messages.
    ///
    /// Newly activated broadcasters send a complete snapshot to every
    /// connection. Active ones send deltas to steady connections and a
    /// complete snapshot to fresh ones. Broadcasters whose data is not ready
    /// stay uninitialized and are retried next tick.
    pub fn run_tick(&mut self, ctx: &mut TickContext<'_>) -> ServiceTick {
        let mut report = ServiceTick::default();
        let everyone: Vec<ConnectionId> = ctx.steady.iter().chain(ctx.fresh).copied().collect();

        for (entity, tracked) in &mut self.tracked {
            let broadcaster = &mut tracked.broadcaster;
            match read_live(ctx, tracked.source, self.kind) {
                Live::Ready(live) => match broadcaster.state() {
                    BroadcasterState::Uninitialized => {
                        broadcaster.activate(&live);
                        ctx.announced.insert(*entity);
                        broadcaster.send_complete_changes(ctx.outputs, &everyone, &ctx.encode);
                        report.activated += 1;
                    }
                    BroadcasterState::Active => {
                        let flags = broadcaster.calculate_delta_changes(&live);
                        if !flags.is_empty() {
                            broadcaster.send_delta_changes(
                                ctx.outputs,
                                ctx.steady,
                                flags,
                                &ctx.encode,
                            );
                            report.deltas += 1;
                        }
                        broadcaster.send_complete_changes(ctx.outputs, ctx.fresh, &ctx.encode);
                    }
                    BroadcasterState::Disposed => {}
                },
                waiting => {
                    if broadcaster.is_active() {
                        // Late joiners still get the last state that went out.
                        broadcaster.send_complete_changes(ctx.outputs, ctx.fresh, &ctx.encode);
                    } else {
                        if let Live::Waiting { missing } = waiting {
                            debug!(
                                entity = entity.raw(),
                                kind = %self.kind,
                                missing,
                                "waiting for referenced entities"
                            );
                        }
                        report.deferred += 1;
                    }
                }
            }
        }
        report
    }
}

/// Reads a component and binds its entity references.
fn read_live(ctx: &TickContext<'_>, source: SourceId, kind: ComponentKind) -> Live {
    let Some(mut data) = ctx.provider.read_component(source, kind) else {
        return Live::Unreadable;
    };
    if let Some(transform) = data.as_transform_mut() {
        transform.parent = ctx
            .parents
            .get(&source)
            .and_then(|parent| ctx.entities.entity_id_known(*parent))
            .unwrap_or(EntityId::NONE);
    }
    if kind.has_entity_dependencies() {
        let references = ctx.provider.references(source, kind);
        let resolved: Vec<EntityId> = references
            .iter()
            .filter_map(|reference| ctx.entities.entity_id_known(*reference))
            .filter(|id| ctx.announced.contains(id))
            .collect();
        if resolved.len() != references.len() {
            return Live::Waiting {
                missing: references.len() - resolved.len(),
            };
        }
        if let Some(skinned) = data.as_skinned_mesh_mut() {
            skinned.bones = resolved;
        }
    }
    Live::Ready(data)
}

/// The set of component kinds this endpoint understands.
///
/// Services iterate in dependency order. On the observer the registry only
/// decides which kind codes are accepted; an unregistered code is a desync.
#[derive(Debug)]
pub struct ServiceRegistry {
    services: BTreeMap<ComponentKind, ComponentService>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new(&ComponentKind::ALL)
    }
}

impl ServiceRegistry {
    #[must_use]
    pub fn new(kinds: &[ComponentKind]) -> Self {
        Self {
            services: kinds
                .iter()
                .map(|kind| (*kind, ComponentService::new(*kind)))
                .collect(),
        }
    }

    pub fn register(&mut self, kind: ComponentKind) {
        self.services
            .entry(kind)
            .or_insert_with(|| ComponentService::new(kind));
    }

    #[must_use]
    pub fn is_registered(&self, kind: ComponentKind) -> bool {
        self.services.contains_key(&kind)
    }

    /// Registered kinds in dependency order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.services.keys().copied()
    }

    /// Kind for a wire code, if registered.
    #[must_use]
    pub fn kind_for_code(&self, code: KindCode) -> Option<ComponentKind> {
        ComponentKind::from_code(code).filter(|kind| self.is_registered(*kind))
    }

    #[must_use]
    pub fn service(&self, kind: ComponentKind) -> Option<&ComponentService> {
        self.services.get(&kind)
    }

    /// Host factory. Returns `false` for unregistered kinds or duplicates.
    pub fn attach_broadcaster(
        &mut self,
        kind: ComponentKind,
        entity: EntityId,
        source: SourceId,
    ) -> bool {
        self.services
            .get_mut(&kind)
            .is_some_and(|service| service.attach(entity, source))
    }

    pub fn detach_broadcaster(&mut self, kind: ComponentKind, entity: EntityId) -> bool {
        self.services
            .get_mut(&kind)
            .is_some_and(|service| service.detach(entity))
    }

    /// Detaches every broadcaster of `entity`; returns how many.
    pub fn detach_entity(&mut self, entity: EntityId) -> usize {
        self.services
            .values_mut()
            .map(|service| service.detach(entity))
            .filter(|detached| *detached)
            .count()
    }

    /// Observer factory: fresh state for a newly seen component.
    ///
    /// Callers resolve `kind` through [`kind_for_code`](Self::kind_for_code) first.
    #[must_use]
    pub fn attach_observer(&self, kind: ComponentKind) -> ComponentData {
        debug_assert!(self.is_registered(kind), "{kind} is not registered");
        ComponentData::default_for(kind)
    }

    /// Runs every service in dependency order.
    pub fn run_tick(&mut self, ctx: &mut TickContext<'_>) -> ServiceTick {
        let mut report = ServiceTick::default();
        for service in self.services.values_mut() {
            report.absorb(service.run_tick(ctx));
        }
        report
    }
}
