//! Mesh filter: which mesh an entity draws.

use assets::{AssetKind, AssetRef};
use bytestream::{ByteReader, ByteWriter};
use schema::{mesh_filter, ChangeFlags, ComponentKind};

use crate::context::{DecodeContext, EncodeContext};
use crate::error::CodecResult;
use crate::state::ComponentState;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshFilterState {
    pub mesh: Option<AssetRef>,
}

impl ComponentState for MeshFilterState {
    const KIND: ComponentKind = ComponentKind::MeshFilter;

    fn diff(&self, baseline: &Self) -> ChangeFlags {
        let mut flags = ChangeFlags::EMPTY;
        flags.set_if(mesh_filter::MESH, self.mesh != baseline.mesh);
        flags
    }

    fn copy_from(&mut self, source: &Self, flags: ChangeFlags) {
        if flags.contains(mesh_filter::MESH) {
            self.mesh.clone_from(&source.mesh);
        }
    }

    fn encode(&self, flags: ChangeFlags, writer: &mut ByteWriter, ctx: &EncodeContext<'_>) {
        if flags.contains(mesh_filter::MESH) {
            ctx.write_asset(writer, AssetKind::Mesh, self.mesh.as_ref());
        }
    }

    fn decode(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        ctx: &DecodeContext<'_>,
    ) -> CodecResult<()> {
        if flags.contains(mesh_filter::MESH) {
            self.mesh = ctx.read_asset(reader, AssetKind::Mesh)?;
        }
        Ok(())
    }

    fn blend(&mut self, _target: &Self, _flags: ChangeFlags, _t: f32) {}
}
