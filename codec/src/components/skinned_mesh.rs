//! Skinned mesh renderer.
//!
//! Bones are entity references, so this kind is only broadcast once every
//! bone's transform is already on the wire.

use assets::{AssetKind, AssetRef};
use bytestream::{ByteReader, ByteWriter};
use schema::{skinned_mesh, ChangeFlags, ComponentKind};

use crate::context::{write_entity_list, DecodeContext, EncodeContext};
use crate::error::CodecResult;
use crate::state::ComponentState;
use crate::types::EntityId;

#[derive(Debug, Clone, PartialEq)]
pub struct SkinnedMeshState {
    pub enabled: bool,
    pub mesh: Option<AssetRef>,
    pub materials: Vec<Option<AssetRef>>,
    pub bones: Vec<EntityId>,
    pub update_when_offscreen: bool,
}

impl Default for SkinnedMeshState {
    fn default() -> Self {
        Self {
            enabled: true,
            mesh: None,
            materials: Vec::new(),
            bones: Vec::new(),
            update_when_offscreen: false,
        }
    }
}

impl ComponentState for SkinnedMeshState {
    const KIND: ComponentKind = ComponentKind::SkinnedMesh;

    fn diff(&self, baseline: &Self) -> ChangeFlags {
        let mut flags = ChangeFlags::EMPTY;
        flags.set_if(skinned_mesh::ENABLED, self.enabled != baseline.enabled);
        flags.set_if(skinned_mesh::MESH, self.mesh != baseline.mesh);
        flags.set_if(skinned_mesh::MATERIALS, self.materials != baseline.materials);
        flags.set_if(skinned_mesh::BONES, self.bones != baseline.bones);
        flags.set_if(
            skinned_mesh::UPDATE_OFFSCREEN,
            self.update_when_offscreen != baseline.update_when_offscreen,
        );
        flags
    }

    fn copy_from(&mut self, source: &Self, flags: ChangeFlags) {
        if flags.contains(skinned_mesh::ENABLED) {
            self.enabled = source.enabled;
        }
        if flags.contains(skinned_mesh::MESH) {
            self.mesh.clone_from(&source.mesh);
        }
        if flags.contains(skinned_mesh::MATERIALS) {
            self.materials.clone_from(&source.materials);
        }
        if flags.contains(skinned_mesh::BONES) {
            self.bones.clone_from(&source.bones);
        }
        if flags.contains(skinned_mesh::UPDATE_OFFSCREEN) {
            self.update_when_offscreen = source.update_when_offscreen;
        }
    }

    fn encode(&self, flags: ChangeFlags, writer: &mut ByteWriter, ctx: &EncodeContext<'_>) {
        if flags.contains(skinned_mesh::ENABLED) {
            writer.write_bool(self.enabled);
        }
        if flags.contains(skinned_mesh::MESH) {
            ctx.write_asset(writer, AssetKind::Mesh, self.mesh.as_ref());
        }
        if flags.contains(skinned_mesh::MATERIALS) {
            ctx.write_asset_list(writer, AssetKind::Material, &self.materials);
        }
        if flags.contains(skinned_mesh::BONES) {
            write_entity_list(writer, &self.bones);
        }
        if flags.contains(skinned_mesh::UPDATE_OFFSCREEN) {
            writer.write_bool(self.update_when_offscreen);
        }
    }

    fn decode(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        ctx: &DecodeContext<'_>,
    ) -> CodecResult<()> {
        if flags.contains(skinned_mesh::ENABLED) {
            self.enabled = reader.read_bool()?;
        }
        if flags.contains(skinned_mesh::MESH) {
            self.mesh = ctx.read_asset(reader, AssetKind::Mesh)?;
        }
        if flags.contains(skinned_mesh::MATERIALS) {
            self.materials = ctx.read_asset_list(reader, AssetKind::Material)?;
        }
        if flags.contains(skinned_mesh::BONES) {
            self.bones = ctx.read_entity_list(reader)?;
        }
        if flags.contains(skinned_mesh::UPDATE_OFFSCREEN) {
            self.update_when_offscreen = reader.read_bool()?;
        }
        Ok(())
    }

    fn blend(&mut self, _target: &Self, _flags: ChangeFlags, _t: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::CodecLimits;
    use assets::AssetCache;

    #[test]
    fn bones_encode_as_count_and_ids() {
        let state = SkinnedMeshState {
            bones: (1..=20).map(EntityId::new).collect(),
            ..SkinnedMeshState::default()
        };
        let cache = AssetCache::empty();
        let mut writer = ByteWriter::new();
        state.encode(skinned_mesh::BONES, &mut writer, &EncodeContext::new(&cache));
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 1 + 20 * 4);
        assert_eq!(bytes[0], 20);

        let limits = CodecLimits::default();
        let mut out = SkinnedMeshState::default();
        out.decode(
            skinned_mesh::BONES,
            &mut ByteReader::new(&bytes),
            &DecodeContext::new(&cache, &limits),
        )
        .unwrap();
        assert_eq!(out.bones, state.bones);
    }
}
