//! JSON export and import of an asset cache.

use std::fs;
use std::path::Path;

use bytestream::AssetId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::AssetCache;
use crate::error::{AssetError, AssetResult};
use crate::kind::{AssetKind, AssetRef};

/// One manifest row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub kind: AssetKind,
    pub key: AssetRef,
    pub id: AssetId,
}

/// Serializable snapshot of an [`AssetCache`].
///
/// Lets an observer load exactly the identities the host enumerated instead
/// of re-enumerating its own asset set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub entries: Vec<ManifestEntry>,
}

impl AssetManifest {
    /// Reads a manifest from a JSON file.
    pub fn load(path: &Path) -> AssetResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Writes the manifest as pretty JSON.
    pub fn save(&self, path: &Path) -> AssetResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), entries = self.entries.len(), "asset manifest saved");
        Ok(())
    }
}

impl AssetCache {
    /// Exports every known asset, sorted by kind then key.
    #[must_use]
    pub fn to_manifest(&self) -> AssetManifest {
        let mut entries: Vec<_> = AssetKind::ALL
            .into_iter()
            .flat_map(|kind| {
                self.iter(kind).map(move |(key, id)| ManifestEntry {
                    kind,
                    key: key.clone(),
                    id,
                })
            })
            .collect();
        entries.sort_by(|a, b| (a.kind, &a.key).cmp(&(b.kind, &b.key)));
        AssetManifest { entries }
    }

    /// Rebuilds a cache from a manifest, keeping the recorded ids.
    ///
    /// Duplicate keys, colliding ids and empty ids are skipped with a warning.
    #[must_use]
    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        let mut cache = Self::empty();
        for entry in &manifest.entries {
            cache.insert(entry.kind, entry.key.clone(), entry.id);
        }
        cache
    }
}
