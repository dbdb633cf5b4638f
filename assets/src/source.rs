//! Asset enumeration seam.

use std::collections::BTreeMap;

use crate::kind::{AssetKind, AssetRef};

/// Enumerates the importable assets of each kind.
///
/// Host and observer must enumerate the same set for their caches to agree.
pub trait AssetSource {
    fn enumerate(&self, kind: AssetKind) -> Vec<AssetRef>;
}

/// In-memory [`AssetSource`].
#[derive(Debug, Default, Clone)]
pub struct MemoryAssetSource {
    assets: BTreeMap<AssetKind, Vec<AssetRef>>,
}

impl MemoryAssetSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asset, builder style.
    #[must_use]
    pub fn with(mut self, kind: AssetKind, key: impl Into<AssetRef>) -> Self {
        self.insert(kind, key);
        self
    }

    /// Adds an asset and returns its handle.
    pub fn insert(&mut self, kind: AssetKind, key: impl Into<AssetRef>) -> AssetRef {
        let asset = key.into();
        self.assets.entry(kind).or_default().push(asset.clone());
        asset
    }
}

impl AssetSource for MemoryAssetSource {
    fn enumerate(&self, kind: AssetKind) -> Vec<AssetRef> {
        self.assets.get(&kind).cloned().unwrap_or_default()
    }
}
