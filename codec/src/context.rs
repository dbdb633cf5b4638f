//! Encode/decode contexts and shared field helpers.

use assets::{AssetCache, AssetKind, AssetRef};
use bytestream::{AssetId, ByteReader, ByteWriter};
use tracing::warn;

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;
use crate::types::EntityId;

/// Host-side encoding context.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    pub assets: &'a AssetCache,
}

impl<'a> EncodeContext<'a> {
    #[must_use]
    pub const fn new(assets: &'a AssetCache) -> Self {
        Self { assets }
    }

    /// Writes the identity of `asset`, or [`AssetId::EMPTY`] if it has none.
    pub fn write_asset(&self, writer: &mut ByteWriter, kind: AssetKind, asset: Option<&AssetRef>) {
        let id = match asset {
            Some(asset) => {
                let id = self.assets.id_of(kind, asset);
                if id.is_empty() {
                    warn!(%kind, key = %asset, "asset has no identity, sending empty id");
                }
                id
            }
            None => AssetId::EMPTY,
        };
        writer.write_asset_id(id);
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn write_asset_list(
        &self,
        writer: &mut ByteWriter,
        kind: AssetKind,
        assets: &[Option<AssetRef>],
    ) {
        writer.write_varu32(assets.len() as u32);
        for asset in assets {
            self.write_asset(writer, kind, asset.as_ref());
        }
    }
}

/// Observer-side decoding context.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub assets: &'a AssetCache,
    pub limits: &'a CodecLimits,
}

impl<'a> DecodeContext<'a> {
    #[must_use]
    pub const fn new(assets: &'a AssetCache, limits: &'a CodecLimits) -> Self {
        Self { assets, limits }
    }

    /// Reads an asset id and resolves it; unknown ids become `None`.
    pub fn read_asset(
        &self,
        reader: &mut ByteReader<'_>,
        kind: AssetKind,
    ) -> CodecResult<Option<AssetRef>> {
        let id = reader.read_asset_id()?;
        if id.is_empty() {
            return Ok(None);
        }
        let asset = self.assets.asset(kind, id).cloned();
        if asset.is_none() {
            warn!(%kind, %id, "unknown asset id");
        }
        Ok(asset)
    }

    pub fn read_asset_list(
        &self,
        reader: &mut ByteReader<'_>,
        kind: AssetKind,
    ) -> CodecResult<Vec<Option<AssetRef>>> {
        let count = read_count(reader, LimitKind::Materials, self.limits.max_materials)?;
        (0..count).map(|_| self.read_asset(reader, kind)).collect()
    }

    pub fn read_string(&self, reader: &mut ByteReader<'_>) -> CodecResult<String> {
        Ok(reader.read_str(self.limits.max_string_bytes)?)
    }

    pub fn read_entity_list(&self, reader: &mut ByteReader<'_>) -> CodecResult<Vec<EntityId>> {
        let count = read_count(reader, LimitKind::Bones, self.limits.max_bones)?;
        (0..count)
            .map(|_| Ok(EntityId::new(reader.read_u32()?)))
            .collect()
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn write_entity_list(writer: &mut ByteWriter, entities: &[EntityId]) {
    writer.write_varu32(entities.len() as u32);
    for entity in entities {
        writer.write_u32(entity.raw());
    }
}

fn read_count(reader: &mut ByteReader<'_>, kind: LimitKind, limit: usize) -> CodecResult<usize> {
    let actual = reader.read_varu32()? as usize;
    if actual > limit {
        return Err(CodecError::LimitsExceeded {
            kind,
            limit,
            actual,
        });
    }
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assets::MemoryAssetSource;

    fn cache() -> AssetCache {
        AssetCache::build(&MemoryAssetSource::new().with(AssetKind::Material, "red"))
    }

    #[test]
    fn asset_roundtrip_and_fallbacks() {
        let cache = cache();
        let limits = CodecLimits::for_testing();
        let encode = EncodeContext::new(&cache);
        let decode = DecodeContext::new(&cache, &limits);

        let mut writer = ByteWriter::new();
        encode.write_asset(&mut writer, AssetKind::Material, Some(&"red".into()));
        encode.write_asset(&mut writer, AssetKind::Material, Some(&"missing".into()));
        encode.write_asset(&mut writer, AssetKind::Material, None);
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 48);

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(
            decode.read_asset(&mut reader, AssetKind::Material).unwrap(),
            Some(AssetRef::new("red"))
        );
        assert_eq!(decode.read_asset(&mut reader, AssetKind::Material).unwrap(), None);
        assert_eq!(decode.read_asset(&mut reader, AssetKind::Material).unwrap(), None);
    }

    #[test]
    fn unknown_id_decodes_as_none() {
        let cache = AssetCache::empty();
        let limits = CodecLimits::default();
        let decode = DecodeContext::new(&cache, &limits);
        let bytes = [0xAA; 16];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(decode.read_asset(&mut reader, AssetKind::Mesh).unwrap(), None);
        assert!(reader.is_empty());
    }

    #[test]
    fn entity_list_limit() {
        let cache = AssetCache::empty();
        let limits = CodecLimits::for_testing();
        let decode = DecodeContext::new(&cache, &limits);

        let bones: Vec<_> = (1..=40).map(EntityId::new).collect();
        let mut writer = ByteWriter::new();
        write_entity_list(&mut writer, &bones);
        let bytes = writer.finish();

        let err = decode
            .read_entity_list(&mut ByteReader::new(&bytes))
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::LimitsExceeded {
                kind: LimitKind::Bones,
                limit: 32,
                actual: 40
            }
        );
    }
}
