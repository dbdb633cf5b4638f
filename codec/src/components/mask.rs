//! UI mask.

use bytestream::{ByteReader, ByteWriter};
use schema::{mask, ChangeFlags, ComponentKind};

use crate::context::{DecodeContext, EncodeContext};
use crate::error::CodecResult;
use crate::state::ComponentState;

#[derive(Debug, Clone, PartialEq)]
pub struct MaskState {
    pub enabled: bool,
    pub show_graphic: bool,
}

impl Default for MaskState {
    fn default() -> Self {
        Self {
            enabled: true,
            show_graphic: true,
        }
    }
}

impl ComponentState for MaskState {
    const KIND: ComponentKind = ComponentKind::Mask;

    fn diff(&self, baseline: &Self) -> ChangeFlags {
        let mut flags = ChangeFlags::EMPTY;
        flags.set_if(mask::ENABLED, self.enabled != baseline.enabled);
        flags.set_if(mask::SHOW_GRAPHIC, self.show_graphic != baseline.show_graphic);
        flags
    }

    fn copy_from(&mut self, source: &Self, flags: ChangeFlags) {
        if flags.contains(mask::ENABLED) {
            self.enabled = source.enabled;
        }
        if flags.contains(mask::SHOW_GRAPHIC) {
            self.show_graphic = source.show_graphic;
        }
    }

    fn encode(&self, flags: ChangeFlags, writer: &mut ByteWriter, _ctx: &EncodeContext<'_>) {
        if flags.contains(mask::ENABLED) {
            writer.write_bool(self.enabled);
        }
        if flags.contains(mask::SHOW_GRAPHIC) {
            writer.write_bool(self.show_graphic);
        }
    }

    fn decode(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        _ctx: &DecodeContext<'_>,
    ) -> CodecResult<()> {
        if flags.contains(mask::ENABLED) {
            self.enabled = reader.read_bool()?;
        }
        if flags.contains(mask::SHOW_GRAPHIC) {
            self.show_graphic = reader.read_bool()?;
        }
        Ok(())
    }

    fn blend(&mut self, _target: &Self, _flags: ChangeFlags, _t: f32) {}
}
