//! Transform: name, layer, hierarchy and pose.

use bytestream::{ByteReader, ByteWriter, Quat, Vec3};
use schema::{transform, ChangeFlags, ComponentKind};

use crate::context::{DecodeContext, EncodeContext};
use crate::error::CodecResult;
use crate::state::{quat_changed, vec3_changed, ComponentState};
use crate::types::EntityId;

#[derive(Debug, Clone, PartialEq)]
pub struct TransformState {
    pub name: String,
    pub layer: i32,
    /// Parent entity, [`EntityId::NONE`] at the root.
    pub parent: EntityId,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub active: bool,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            name: String::new(),
            layer: 0,
            parent: EntityId::NONE,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            active: true,
        }
    }
}

impl ComponentState for TransformState {
    const KIND: ComponentKind = ComponentKind::Transform;

    fn diff(&self, baseline: &Self) -> ChangeFlags {
        let mut flags = ChangeFlags::EMPTY;
        flags.set_if(transform::NAME, self.name != baseline.name);
        flags.set_if(transform::LAYER, self.layer != baseline.layer);
        flags.set_if(transform::PARENT, self.parent != baseline.parent);
        flags.set_if(
            transform::POSITION,
            vec3_changed(self.position, baseline.position),
        );
        flags.set_if(
            transform::ROTATION,
            quat_changed(self.rotation, baseline.rotation),
        );
        flags.set_if(transform::SCALE, vec3_changed(self.scale, baseline.scale));
        flags.set_if(transform::ACTIVE, self.active != baseline.active);
        flags
    }

    fn copy_from(&mut self, source: &Self, flags: ChangeFlags) {
        if flags.contains(transform::NAME) {
            self.name.clone_from(&source.name);
        }
        if flags.contains(transform::LAYER) {
            self.layer = source.layer;
        }
        if flags.contains(transform::PARENT) {
            self.parent = source.parent;
        }
        if flags.contains(transform::POSITION) {
            self.position = source.position;
        }
        if flags.contains(transform::ROTATION) {
            self.rotation = source.rotation;
        }
        if flags.contains(transform::SCALE) {
            self.scale = source.scale;
        }
        if flags.contains(transform::ACTIVE) {
            self.active = source.active;
        }
    }

    fn encode(&self, flags: ChangeFlags, writer: &mut ByteWriter, _ctx: &EncodeContext<'_>) {
        if flags.contains(transform::NAME) {
            writer.write_str(&self.name);
        }
        if flags.contains(transform::LAYER) {
            writer.write_i32(self.layer);
        }
        if flags.contains(transform::PARENT) {
            writer.write_u32(self.parent.raw());
        }
        if flags.contains(transform::POSITION) {
            writer.write_vec3(self.position);
        }
        if flags.contains(transform::ROTATION) {
            writer.write_quat(self.rotation);
        }
        if flags.contains(transform::SCALE) {
            writer.write_vec3(self.scale);
        }
        if flags.contains(transform::ACTIVE) {
            writer.write_bool(self.active);
        }
    }

    fn decode(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        ctx: &DecodeContext<'_>,
    ) -> CodecResult<()> {
        if flags.contains(transform::NAME) {
            self.name = ctx.read_string(reader)?;
        }
        if flags.contains(transform::LAYER) {
            self.layer = reader.read_i32()?;
        }
        if flags.contains(transform::PARENT) {
            self.parent = EntityId::new(reader.read_u32()?);
        }
        if flags.contains(transform::POSITION) {
            self.position = reader.read_vec3()?;
        }
        if flags.contains(transform::ROTATION) {
            self.rotation = reader.read_quat()?;
        }
        if flags.contains(transform::SCALE) {
            self.scale = reader.read_vec3()?;
        }
        if flags.contains(transform::ACTIVE) {
            self.active = reader.read_bool()?;
        }
        Ok(())
    }

    fn blend(&mut self, target: &Self, flags: ChangeFlags, t: f32) {
        if flags.contains(transform::POSITION) {
            self.position = self.position.lerp(target.position, t);
        }
        if flags.contains(transform::ROTATION) {
            self.rotation = self.rotation.slerp(target.rotation, t);
        }
        if flags.contains(transform::SCALE) {
            self.scale = self.scale.lerp(target.scale, t);
        }
    }
}
