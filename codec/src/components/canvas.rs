//! UI canvas root.

use bytestream::{ByteReader, ByteWriter, Vec2};
use schema::{canvas, ChangeFlags, ComponentKind};

use crate::context::{DecodeContext, EncodeContext};
use crate::error::CodecResult;
use crate::state::{f32_changed, lerp_f32, vec2_changed, ComponentState};

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasState {
    pub enabled: bool,
    pub render_mode: u8,
    pub sorting_order: i32,
    pub scale_factor: f32,
    pub reference_resolution: Vec2,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            enabled: true,
            render_mode: 0,
            sorting_order: 0,
            scale_factor: 1.0,
            reference_resolution: Vec2::new(800.0, 600.0),
        }
    }
}

impl ComponentState for CanvasState {
    const KIND: ComponentKind = ComponentKind::Canvas;

    fn diff(&self, baseline: &Self) -> ChangeFlags {
        let mut flags = ChangeFlags::EMPTY;
        flags.set_if(canvas::ENABLED, self.enabled != baseline.enabled);
        flags.set_if(canvas::RENDER_MODE, self.render_mode != baseline.render_mode);
        flags.set_if(
            canvas::SORTING_ORDER,
            self.sorting_order != baseline.sorting_order,
        );
        flags.set_if(
            canvas::SCALE_FACTOR,
            f32_changed(self.scale_factor, baseline.scale_factor),
        );
        flags.set_if(
            canvas::REFERENCE_RESOLUTION,
            vec2_changed(self.reference_resolution, baseline.reference_resolution),
        );
        flags
    }

    fn copy_from(&mut self, source: &Self, flags: ChangeFlags) {
        if flags.contains(canvas::ENABLED) {
            self.enabled = source.enabled;
        }
        if flags.contains(canvas::RENDER_MODE) {
            self.render_mode = source.render_mode;
        }
        if flags.contains(canvas::SORTING_ORDER) {
            self.sorting_order = source.sorting_order;
        }
        if flags.contains(canvas::SCALE_FACTOR) {
            self.scale_factor = source.scale_factor;
        }
        if flags.contains(canvas::REFERENCE_RESOLUTION) {
            self.reference_resolution = source.reference_resolution;
        }
    }

    fn encode(&self, flags: ChangeFlags, writer: &mut ByteWriter, _ctx: &EncodeContext<'_>) {
        if flags.contains(canvas::ENABLED) {
            writer.write_bool(self.enabled);
        }
        if flags.contains(canvas::RENDER_MODE) {
            writer.write_u8(self.render_mode);
        }
        if flags.contains(canvas::SORTING_ORDER) {
            writer.write_i32(self.sorting_order);
        }
        if flags.contains(canvas::SCALE_FACTOR) {
            writer.write_f32(self.scale_factor);
        }
        if flags.contains(canvas::REFERENCE_RESOLUTION) {
            writer.write_vec2(self.reference_resolution);
        }
    }

    fn decode(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        _ctx: &DecodeContext<'_>,
    ) -> CodecResult<()> {
        if flags.contains(canvas::ENABLED) {
            self.enabled = reader.read_bool()?;
        }
        if flags.contains(canvas::RENDER_MODE) {
            self.render_mode = reader.read_u8()?;
        }
        if flags.contains(canvas::SORTING_ORDER) {
            self.sorting_order = reader.read_i32()?;
        }
        if flags.contains(canvas::SCALE_FACTOR) {
            self.scale_factor = reader.read_f32()?;
        }
        if flags.contains(canvas::REFERENCE_RESOLUTION) {
            self.reference_resolution = reader.read_vec2()?;
        }
        Ok(())
    }

    fn blend(&mut self, target: &Self, flags: ChangeFlags, t: f32) {
        if flags.contains(canvas::SCALE_FACTOR) {
            self.scale_factor = lerp_f32(self.scale_factor, target.scale_factor, t);
        }
        if flags.contains(canvas::REFERENCE_RESOLUTION) {
            self.reference_resolution = self
                .reference_resolution
                .lerp(target.reference_resolution, t);
        }
    }
}
