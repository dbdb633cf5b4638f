//! Mesh renderer: materials, shadows, tint and lightmap placement.

use assets::{AssetKind, AssetRef};
use bytestream::{ByteReader, ByteWriter, Color, Vec4};
use schema::{mesh_renderer, ChangeFlags, ComponentKind};

use crate::context::{DecodeContext, EncodeContext};
use crate::error::CodecResult;
use crate::state::{color_changed, vec4_changed, ComponentState};

#[derive(Debug, Clone, PartialEq)]
pub struct MeshRendererState {
    pub enabled: bool,
    /// Material slots; an unresolved slot is `None` but keeps its index.
    pub materials: Vec<Option<AssetRef>>,
    /// Engine shadow casting mode (off, on, two sided, shadows only).
    pub shadow_casting: u8,
    pub receive_shadows: bool,
    pub color: Color,
    pub lightmap_scale_offset: Vec4,
}

impl Default for MeshRendererState {
    fn default() -> Self {
        Self {
            enabled: true,
            materials: Vec::new(),
            shadow_casting: 1,
            receive_shadows: true,
            color: Color::WHITE,
            lightmap_scale_offset: Vec4::new(1.0, 1.0, 0.0, 0.0),
        }
    }
}

impl ComponentState for MeshRendererState {
    const KIND: ComponentKind = ComponentKind::MeshRenderer;

    fn diff(&self, baseline: &Self) -> ChangeFlags {
        let mut flags = ChangeFlags::EMPTY;
        flags.set_if(mesh_renderer::ENABLED, self.enabled != baseline.enabled);
        flags.set_if(
            mesh_renderer::MATERIALS,
            self.materials != baseline.materials,
        );
        flags.set_if(
            mesh_renderer::SHADOWS,
            self.shadow_casting != baseline.shadow_casting
                || self.receive_shadows != baseline.receive_shadows,
        );
        flags.set_if(
            mesh_renderer::COLOR,
            color_changed(self.color, baseline.color),
        );
        flags.set_if(
            mesh_renderer::LIGHTMAP,
            vec4_changed(self.lightmap_scale_offset, baseline.lightmap_scale_offset),
        );
        flags
    }

    fn copy_from(&mut self, source: &Self, flags: ChangeFlags) {
        if flags.contains(mesh_renderer::ENABLED) {
            self.enabled = source.enabled;
        }
        if flags.contains(mesh_renderer::MATERIALS) {
            self.materials.clone_from(&source.materials);
        }
        if flags.contains(mesh_renderer::SHADOWS) {
            self.shadow_casting = source.shadow_casting;
            self.receive_shadows = source.receive_shadows;
        }
        if flags.contains(mesh_renderer::COLOR) {
            self.color = source.color;
        }
        if flags.contains(mesh_renderer::LIGHTMAP) {
            self.lightmap_scale_offset = source.lightmap_scale_offset;
        }
    }

    fn encode(&self, flags: ChangeFlags, writer: &mut ByteWriter, ctx: &EncodeContext<'_>) {
        if flags.contains(mesh_renderer::ENABLED) {
            writer.write_bool(self.enabled);
        }
        if flags.contains(mesh_renderer::MATERIALS) {
            ctx.write_asset_list(writer, AssetKind::Material, &self.materials);
        }
        if flags.contains(mesh_renderer::SHADOWS) {
            writer.write_u8(self.shadow_casting);
            writer.write_bool(self.receive_shadows);
        }
        if flags.contains(mesh_renderer::COLOR) {
            writer.write_color(self.color);
        }
        if flags.contains(mesh_renderer::LIGHTMAP) {
            writer.write_vec4(self.lightmap_scale_offset);
        }
    }

    fn decode(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        ctx: &DecodeContext<'_>,
    ) -> CodecResult<()> {
        if flags.contains(mesh_renderer::ENABLED) {
            self.enabled = reader.read_bool()?;
        }
        if flags.contains(mesh_renderer::MATERIALS) {
            self.materials = ctx.read_asset_list(reader, AssetKind::Material)?;
        }
        if flags.contains(mesh_renderer::SHADOWS) {
            self.shadow_casting = reader.read_u8()?;
            self.receive_shadows = reader.read_bool()?;
        }
        if flags.contains(mesh_renderer::COLOR) {
            self.color = reader.read_color()?;
        }
        if flags.contains(mesh_renderer::LIGHTMAP) {
            self.lightmap_scale_offset = reader.read_vec4()?;
        }
        Ok(())
    }

    fn blend(&mut self, target: &Self, flags: ChangeFlags, t: f32) {
        if flags.contains(mesh_renderer::COLOR) {
            self.color = self.color.lerp(target.color, t);
        }
        if flags.contains(mesh_renderer::LIGHTMAP) {
            self.lightmap_scale_offset = self
                .lightmap_scale_offset
                .lerp(target.lightmap_scale_offset, t);
        }
    }
}
