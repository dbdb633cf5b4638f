//! Asset identity cache.

use std::collections::HashMap;

use bytestream::AssetId;
use tracing::{debug, warn};

use crate::kind::{AssetKind, AssetRef};
use crate::source::AssetSource;

#[derive(Debug, Default, Clone)]
struct KindTable {
    ids: HashMap<AssetRef, AssetId>,
    assets: HashMap<AssetId, AssetRef>,
}

/// Bidirectional map between engine assets and stable [`AssetId`]s.
///
/// Immutable after construction; share it as `Arc<AssetCache>`. Lookups
/// never fail: unknown assets map to [`AssetId::EMPTY`] and unknown ids to
/// `None`.
#[derive(Debug, Default, Clone)]
pub struct AssetCache {
    tables: [KindTable; 4],
}

impl AssetCache {
    /// Creates a cache that knows no assets.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Enumerates every kind once and assigns identities.
    pub fn build(source: &dyn AssetSource) -> Self {
        let mut cache = Self::empty();
        for kind in AssetKind::ALL {
            for asset in source.enumerate(kind) {
                let id = derive_id(kind, asset.key());
                cache.insert(kind, asset, id);
            }
        }
        debug!(assets = cache.len(), "asset cache built");
        cache
    }

    /// Registers `asset` under `id`. Returns `false` if either side was
    /// already taken.
    pub(crate) fn insert(&mut self, kind: AssetKind, asset: AssetRef, id: AssetId) -> bool {
        let table = &mut self.tables[kind.index()];
        if id.is_empty() {
            warn!(%kind, key = %asset, "refusing empty asset id");
            return false;
        }
        if table.ids.contains_key(&asset) {
            warn!(%kind, key = %asset, "duplicate asset key skipped");
            return false;
        }
        if let Some(existing) = table.assets.get(&id) {
            warn!(%kind, key = %asset, other = %existing, %id, "asset id collision skipped");
            return false;
        }
        table.ids.insert(asset.clone(), id);
        table.assets.insert(id, asset);
        true
    }

    /// Identity of `asset`, or [`AssetId::EMPTY`] if it was never enumerated.
    #[must_use]
    pub fn id_of(&self, kind: AssetKind, asset: &AssetRef) -> AssetId {
        self.id_of_key(kind, asset.key())
    }

    /// Identity of the asset with `key`, or [`AssetId::EMPTY`].
    #[must_use]
    pub fn id_of_key(&self, kind: AssetKind, key: &str) -> AssetId {
        self.tables[kind.index()]
            .ids
            .get(key)
            .copied()
            .unwrap_or(AssetId::EMPTY)
    }

    /// Asset for `id`, or `None` if unknown or empty.
    #[must_use]
    pub fn asset(&self, kind: AssetKind, id: AssetId) -> Option<&AssetRef> {
        if id.is_empty() {
            return None;
        }
        self.tables[kind.index()].assets.get(&id)
    }

    /// Number of known assets across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.iter().map(|table| table.ids.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Known assets of one kind, in no particular order.
    pub fn iter(&self, kind: AssetKind) -> impl Iterator<Item = (&AssetRef, AssetId)> + '_ {
        self.tables[kind.index()]
            .ids
            .iter()
            .map(|(asset, id)| (asset, *id))
    }
}

/// Derives the identity of an asset from its kind and key.
///
/// The first 16 bytes of `blake3(tag || key)`; never [`AssetId::EMPTY`].
#[must_use]
pub fn derive_id(kind: AssetKind, key: &str) -> AssetId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[kind.tag()]);
    hasher.update(key.as_bytes());
    let hash = hasher.finalize();

    let mut bytes = [0u8; AssetId::SIZE];
    bytes.copy_from_slice(&hash.as_bytes()[..AssetId::SIZE]);
    if bytes == [0; AssetId::SIZE] {
        bytes[AssetId::SIZE - 1] = 1;
    }
    AssetId::from_bytes(bytes)
}
