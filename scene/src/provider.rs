//! The host's view of the live scene.

use std::collections::BTreeMap;

use codec::ComponentData;
use schema::ComponentKind;

/// Engine-side identity of a scene object. Opaque to the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub u64);

/// One live scene object and the component kinds attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNode {
    pub id: SourceId,
    pub parent: Option<SourceId>,
    pub components: Vec<ComponentKind>,
}

/// Read access to the live scene on the host.
///
/// Called from the sync thread once per tick. Entity references inside
/// component data (transform parents, skinned mesh bones) are filled in by
/// the host from [`SourceNode::parent`] and [`references`](Self::references);
/// whatever the provider puts there is overwritten.
pub trait SceneProvider {
    /// Every live source, parents listed before children when possible.
    fn sources(&self) -> Vec<SourceNode>;

    /// Current value of one component, or `None` if it cannot be read now.
    fn read_component(&self, source: SourceId, kind: ComponentKind) -> Option<ComponentData>;

    /// Sources a component refers to, in wire order.
    fn references(&self, source: SourceId, kind: ComponentKind) -> Vec<SourceId> {
        let _ = (source, kind);
        Vec::new()
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryNode {
    parent: Option<SourceId>,
    components: BTreeMap<ComponentKind, ComponentData>,
    references: BTreeMap<ComponentKind, Vec<SourceId>>,
}

/// A scene held in plain maps, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    nodes: BTreeMap<SourceId, MemoryNode>,
}

impl MemoryScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source with no components. Replaces an existing one.
    pub fn spawn(&mut self, id: SourceId, parent: Option<SourceId>) {
        self.nodes.insert(
            id,
            MemoryNode {
                parent,
                ..MemoryNode::default()
            },
        );
    }

    /// Attaches or replaces a component, spawning the source if needed.
    pub fn insert(&mut self, id: SourceId, data: impl Into<ComponentData>) {
        let data = data.into();
        self.nodes
            .entry(id)
            .or_default()
            .components
            .insert(data.kind(), data);
    }

    pub fn set_references(&mut self, id: SourceId, kind: ComponentKind, references: Vec<SourceId>) {
        self.nodes
            .entry(id)
            .or_default()
            .references
            .insert(kind, references);
    }

    pub fn set_parent(&mut self, id: SourceId, parent: Option<SourceId>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
        }
    }

    pub fn component_mut(&mut self, id: SourceId, kind: ComponentKind) -> Option<&mut ComponentData> {
        self.nodes.get_mut(&id)?.components.get_mut(&kind)
    }

    pub fn detach(&mut self, id: SourceId, kind: ComponentKind) -> Option<ComponentData> {
        self.nodes.get_mut(&id)?.components.remove(&kind)
    }

    pub fn remove(&mut self, id: SourceId) -> bool {
        self.nodes.remove(&id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl SceneProvider for MemoryScene {
    fn sources(&self) -> Vec<SourceNode> {
        self.nodes
            .iter()
            .map(|(id, node)| SourceNode {
                id: *id,
                parent: node.parent,
                components: node.components.keys().copied().collect(),
            })
            .collect()
    }

    fn read_component(&self, source: SourceId, kind: ComponentKind) -> Option<ComponentData> {
        self.nodes.get(&source)?.components.get(&kind).cloned()
    }

    fn references(&self, source: SourceId, kind: ComponentKind) -> Vec<SourceId> {
        self.nodes
            .get(&source)
            .and_then(|node| node.references.get(&kind))
            .cloned()
            .unwrap_or_default()
    }
}
