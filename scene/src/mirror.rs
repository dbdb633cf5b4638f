//! Observer-side copy of the host scene.

use std::collections::BTreeMap;

use codec::{ComponentData, EntityId, TransformState};
use schema::{ChangeFlags, ComponentKind};

/// Engine-facing sink for changes applied to the mirror.
///
/// All methods default to no-ops.
pub trait MirrorListener: Send {
    fn entity_created(&mut self, entity: EntityId) {
        let _ = entity;
    }

    /// `data` is the component after the update; `flags` are the fields the
    /// message carried.
    fn component_updated(&mut self, entity: EntityId, data: &ComponentData, flags: ChangeFlags) {
        let _ = (entity, data, flags);
    }

    fn entity_destroyed(&mut self, entity: EntityId) {
        let _ = entity;
    }
}

/// Components of one mirrored entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirrorEntity {
    components: BTreeMap<ComponentKind, ComponentData>,
}

impl MirrorEntity {
    #[must_use]
    pub fn get(&self, kind: ComponentKind) -> Option<&ComponentData> {
        self.components.get(&kind)
    }

    /// Components in dependency order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentData> + '_ {
        self.components.values()
    }

    #[must_use]
    pub fn transform(&self) -> Option<&TransformState> {
        self.get(ComponentKind::Transform)
            .and_then(ComponentData::as_transform)
    }
}

/// Entities created lazily by the first message naming them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MirrorScene {
    entities: BTreeMap<EntityId, MirrorEntity>,
}

impl MirrorScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    #[must_use]
    pub fn entity(&self, entity: EntityId) -> Option<&MirrorEntity> {
        self.entities.get(&entity)
    }

    #[must_use]
    pub fn component(&self, entity: EntityId, kind: ComponentKind) -> Option<&ComponentData> {
        self.entities.get(&entity)?.get(kind)
    }

    #[must_use]
    pub fn transform(&self, entity: EntityId) -> Option<&TransformState> {
        self.entities.get(&entity)?.transform()
    }

    /// Entity ids, ascending.
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Stores `data` under its kind, replacing any previous value and
    /// creating the entity if needed.
    ///
    /// The flag reports whether the entity itself was created.
    pub fn insert_component(
        &mut self,
        entity: EntityId,
        data: ComponentData,
    ) -> (&ComponentData, bool) {
        let created = !self.entities.contains_key(&entity);
        let components = &mut self.entities.entry(entity).or_default().components;
        let kind = data.kind();
        components.insert(kind, data);
        let data = &components[&kind];
        (data, created)
    }

    pub fn remove(&mut self, entity: EntityId) -> Option<MirrorEntity> {
        self.entities.remove(&entity)
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
