//! UI image.

use assets::{AssetKind, AssetRef};
use bytestream::{ByteReader, ByteWriter, Color32};
use schema::{image, ChangeFlags, ComponentKind};

use crate::context::{DecodeContext, EncodeContext};
use crate::error::CodecResult;
use crate::state::{color32_changed, f32_changed, lerp_f32, ComponentState};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageState {
    pub enabled: bool,
    pub sprite: Option<AssetRef>,
    pub material: Option<AssetRef>,
    pub color: Color32,
    pub fill_amount: f32,
    pub preserve_aspect: bool,
}

impl Default for ImageState {
    fn default() -> Self {
        Self {
            enabled: true,
            sprite: None,
            material: None,
            color: Color32::WHITE,
            fill_amount: 1.0,
            preserve_aspect: false,
        }
    }
}

impl ComponentState for ImageState {
    const KIND: ComponentKind = ComponentKind::Image;

    fn diff(&self, baseline: &Self) -> ChangeFlags {
        let mut flags = ChangeFlags::EMPTY;
        flags.set_if(image::ENABLED, self.enabled != baseline.enabled);
        flags.set_if(image::SPRITE, self.sprite != baseline.sprite);
        flags.set_if(image::MATERIAL, self.material != baseline.material);
        flags.set_if(image::COLOR, color32_changed(self.color, baseline.color));
        flags.set_if(
            image::FILL_AMOUNT,
            f32_changed(self.fill_amount, baseline.fill_amount),
        );
        flags.set_if(
            image::PRESERVE_ASPECT,
            self.preserve_aspect != baseline.preserve_aspect,
        );
        flags
    }

    fn copy_from(&mut self, source: &Self, flags: ChangeFlags) {
        if flags.contains(image::ENABLED) {
            self.enabled = source.enabled;
        }
        if flags.contains(image::SPRITE) {
            self.sprite.clone_from(&source.sprite);
        }
        if flags.contains(image::MATERIAL) {
            self.material.clone_from(&source.material);
        }
        if flags.contains(image::COLOR) {
            self.color = source.color;
        }
        if flags.contains(image::FILL_AMOUNT) {
            self.fill_amount = source.fill_amount;
        }
        if flags.contains(image::PRESERVE_ASPECT) {
            self.preserve_aspect = source.preserve_aspect;
        }
    }

    fn encode(&self, flags: ChangeFlags, writer: &mut ByteWriter, ctx: &EncodeContext<'_>) {
        if flags.contains(image::ENABLED) {
            writer.write_bool(self.enabled);
        }
        if flags.contains(image::SPRITE) {
            ctx.write_asset(writer, AssetKind::Sprite, self.sprite.as_ref());
        }
        if flags.contains(image::MATERIAL) {
            ctx.write_asset(writer, AssetKind::Material, self.material.as_ref());
        }
        if flags.contains(image::COLOR) {
            writer.write_color32(self.color);
        }
        if flags.contains(image::FILL_AMOUNT) {
            writer.write_f32(self.fill_amount);
        }
        if flags.contains(image::PRESERVE_ASPECT) {
            writer.write_bool(self.preserve_aspect);
        }
    }

    fn decode(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        ctx: &DecodeContext<'_>,
    ) -> CodecResult<()> {
        if flags.contains(image::ENABLED) {
            self.enabled = reader.read_bool()?;
        }
        if flags.contains(image::SPRITE) {
            self.sprite = ctx.read_asset(reader, AssetKind::Sprite)?;
        }
        if flags.contains(image::MATERIAL) {
            self.material = ctx.read_asset(reader, AssetKind::Material)?;
        }
        if flags.contains(image::COLOR) {
            self.color = reader.read_color32()?;
        }
        if flags.contains(image::FILL_AMOUNT) {
            self.fill_amount = reader.read_f32()?;
        }
        if flags.contains(image::PRESERVE_ASPECT) {
            self.preserve_aspect = reader.read_bool()?;
        }
        Ok(())
    }

    fn blend(&mut self, target: &Self, flags: ChangeFlags, t: f32) {
        if flags.contains(image::COLOR) {
            self.color = self.color.lerp(target.color, t);
        }
        if flags.contains(image::FILL_AMOUNT) {
            self.fill_amount = lerp_f32(self.fill_amount, target.fill_amount, t);
        }
    }
}
