//! Asset kinds and engine-side asset handles.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category of an imported asset. IDs are unique per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Mesh,
    Font,
    Sprite,
    Material,
}

impl AssetKind {
    pub const ALL: [Self; 4] = [Self::Mesh, Self::Font, Self::Sprite, Self::Material];

    /// Byte mixed into the identity hash.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Mesh => 1,
            Self::Font => 2,
            Self::Sprite => 3,
            Self::Material => 4,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self.tag() as usize - 1
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mesh => "mesh",
            Self::Font => "font",
            Self::Sprite => "sprite",
            Self::Material => "material",
        };
        f.write_str(name)
    }
}

/// Handle naming an engine asset object by a path-like key.
///
/// Cloning is a reference count bump.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetRef(Arc<str>);

impl AssetRef {
    #[must_use]
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetRef({:?})", &*self.0)
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for AssetRef {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetRef {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for AssetRef {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl Serialize for AssetRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AssetRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_distinct() {
        let mut tags: Vec<_> = AssetKind::ALL.iter().map(|k| k.tag()).collect();
        tags.dedup();
        assert_eq!(tags.len(), 4);
        for (i, kind) in AssetKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn asset_ref_clone_shares_key() {
        let a = AssetRef::new("meshes/cube");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.key(), "meshes/cube");
        assert_eq!(format!("{a:?}"), "AssetRef(\"meshes/cube\")");
    }

    #[test]
    fn asset_ref_serde_as_string() {
        let json = serde_json::to_string(&AssetRef::new("fonts/mono")).unwrap();
        assert_eq!(json, "\"fonts/mono\"");
        let back: AssetRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back.key(), "fonts/mono");
    }
}
