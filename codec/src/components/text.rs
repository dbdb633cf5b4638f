//! UI text label.

use assets::{AssetKind, AssetRef};
use bytestream::{ByteReader, ByteWriter, Color};
use schema::{text, ChangeFlags, ComponentKind};

use crate::context::{DecodeContext, EncodeContext};
use crate::error::CodecResult;
use crate::state::{color_changed, f32_changed, lerp_f32, ComponentState};

#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    pub enabled: bool,
    pub text: String,
    pub font: Option<AssetRef>,
    pub font_size: f32,
    pub color: Color,
    /// Engine text anchor, passed through untouched.
    pub alignment: u16,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            enabled: true,
            text: String::new(),
            font: None,
            font_size: 14.0,
            color: Color::BLACK,
            alignment: 0,
        }
    }
}

impl ComponentState for TextState {
    const KIND: ComponentKind = ComponentKind::Text;

    fn diff(&self, baseline: &Self) -> ChangeFlags {
        let mut flags = ChangeFlags::EMPTY;
        flags.set_if(text::ENABLED, self.enabled != baseline.enabled);
        flags.set_if(text::TEXT, self.text != baseline.text);
        flags.set_if(text::FONT, self.font != baseline.font);
        flags.set_if(
            text::FONT_SIZE,
            f32_changed(self.font_size, baseline.font_size),
        );
        flags.set_if(text::COLOR, color_changed(self.color, baseline.color));
        flags.set_if(text::ALIGNMENT, self.alignment != baseline.alignment);
        flags
    }

    fn copy_from(&mut self, source: &Self, flags: ChangeFlags) {
        if flags.contains(text::ENABLED) {
            self.enabled = source.enabled;
        }
        if flags.contains(text::TEXT) {
            self.text.clone_from(&source.text);
        }
        if flags.contains(text::FONT) {
            self.font.clone_from(&source.font);
        }
        if flags.contains(text::FONT_SIZE) {
            self.font_size = source.font_size;
        }
        if flags.contains(text::COLOR) {
            self.color = source.color;
        }
        if flags.contains(text::ALIGNMENT) {
            self.alignment = source.alignment;
        }
    }

    fn encode(&self, flags: ChangeFlags, writer: &mut ByteWriter, ctx: &EncodeContext<'_>) {
        if flags.contains(text::ENABLED) {
            writer.write_bool(self.enabled);
        }
        if flags.contains(text::TEXT) {
            writer.write_str(&self.text);
        }
        if flags.contains(text::FONT) {
            ctx.write_asset(writer, AssetKind::Font, self.font.as_ref());
        }
        if flags.contains(text::FONT_SIZE) {
            writer.write_f32(self.font_size);
        }
        if flags.contains(text::COLOR) {
            writer.write_color(self.color);
        }
        if flags.contains(text::ALIGNMENT) {
            writer.write_u16(self.alignment);
        }
    }

    fn decode(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        ctx: &DecodeContext<'_>,
    ) -> CodecResult<()> {
        if flags.contains(text::ENABLED) {
            self.enabled = reader.read_bool()?;
        }
        if flags.contains(text::TEXT) {
            self.text = ctx.read_string(reader)?;
        }
        if flags.contains(text::FONT) {
            self.font = ctx.read_asset(reader, AssetKind::Font)?;
        }
        if flags.contains(text::FONT_SIZE) {
            self.font_size = reader.read_f32()?;
        }
        if flags.contains(text::COLOR) {
            self.color = reader.read_color()?;
        }
        if flags.contains(text::ALIGNMENT) {
            self.alignment = reader.read_u16()?;
        }
        Ok(())
    }

    fn blend(&mut self, target: &Self, flags: ChangeFlags, t: f32) {
        if flags.contains(text::FONT_SIZE) {
            self.font_size = lerp_f32(self.font_size, target.font_size, t);
        }
        if flags.contains(text::COLOR) {
            self.color = self.color.lerp(target.color, t);
        }
    }
}
