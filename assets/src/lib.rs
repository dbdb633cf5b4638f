//! Stable asset identities for scenecast.
//!
//! Meshes, fonts, sprites and materials never travel on the wire. Both peers
//! enumerate the same assets through an [`AssetSource`] and the
//! [`AssetCache`] maps each one to a 128-bit [`AssetId`] derived from its
//! kind and key, so messages only carry the id.
//!
//! Lookups are pure and total: an unknown asset encodes as
//! [`AssetId::EMPTY`] and an unknown id decodes as `None`. Callers log the
//! miss and carry on.

mod cache;
mod error;
mod kind;
mod manifest;
mod source;

pub use bytestream::AssetId;
pub use cache::{derive_id, AssetCache};
pub use error::{AssetError, AssetResult};
pub use kind::{AssetKind, AssetRef};
pub use manifest::{AssetManifest, ManifestEntry};
pub use source::{AssetSource, MemoryAssetSource};
