use std::collections::HashMap;

use codec::EntityId;

use crate::provider::SourceId;

/// Two-way map between scene sources and wire entity ids.
///
/// Ids start at 1 and are never reused within a session; `0` means "no
/// entity" on the wire.
#[derive(Debug, Default)]
pub struct EntityMap {
    next_id: u32,
    to_id: HashMap<SourceId, EntityId>,
    to_source: HashMap<EntityId, SourceId>,
}

impl EntityMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `source`, assigning a fresh one on first sight.
    pub fn entity_id(&mut self, source: SourceId) -> EntityId {
        if let Some(id) = self.to_id.get(&source) {
            return *id;
        }
        let next = self.next_id.saturating_add(1).max(1);
        self.next_id = next;
        let id = EntityId::new(next);
        self.to_id.insert(source, id);
        self.to_source.insert(id, source);
        id
    }

    #[must_use]
    pub fn entity_id_known(&self, source: SourceId) -> Option<EntityId> {
        self.to_id.get(&source).copied()
    }

    #[must_use]
    pub fn source(&self, id: EntityId) -> Option<SourceId> {
        self.to_source.get(&id).copied()
    }

    /// Forgets `source`; returns the id it had.
    pub fn retire(&mut self, source: SourceId) -> Option<EntityId> {
        let id = self.to_id.remove(&source)?;
        self.to_source.remove(&id);
        Some(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.to_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_id.is_empty()
    }

    /// Known sources with their ids, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, EntityId)> + '_ {
        self.to_id.iter().map(|(source, id)| (*source, *id))
    }
}
