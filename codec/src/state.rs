//! The per-kind component state contract.

use bytestream::{ByteReader, ByteWriter, Color, Color32, Quat, Vec2, Vec3, Vec4};
use schema::{ChangeFlags, ComponentKind};

use crate::context::{DecodeContext, EncodeContext};
use crate::error::CodecResult;

/// A replicated component state.
///
/// `encode` and `decode` visit the fields of set flags in the same order, so
/// a reader always consumes exactly what the writer produced.
pub trait ComponentState: Clone + PartialEq + Default {
    const KIND: ComponentKind;

    /// Flags of every field where `self` differs from `baseline`.
    fn diff(&self, baseline: &Self) -> ChangeFlags;

    /// Copies the fields named by `flags` from `source`.
    fn copy_from(&mut self, source: &Self, flags: ChangeFlags);

    /// Writes the fields named by `flags`.
    fn encode(&self, flags: ChangeFlags, writer: &mut ByteWriter, ctx: &EncodeContext<'_>);

    /// Reads the fields named by `flags` into `self`.
    fn decode(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        ctx: &DecodeContext<'_>,
    ) -> CodecResult<()>;

    /// Blends the lerpable fields named by `flags` toward `target`.
    fn blend(&mut self, target: &Self, flags: ChangeFlags, t: f32);

    /// Reads like [`decode`](Self::decode) but interpolates.
    ///
    /// When every set flag is lerpable the result is `lerp(self, received, t)`;
    /// otherwise the message is applied as-is.
    fn decode_lerp(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        ctx: &DecodeContext<'_>,
        t: f32,
    ) -> CodecResult<()> {
        let mut target = self.clone();
        target.decode(flags, reader, ctx)?;
        if flags.is_subset_of(Self::KIND.lerp_flags()) {
            self.blend(&target, flags, clamp_t(t));
        } else {
            *self = target;
        }
        Ok(())
    }
}

/// Clamps an interpolation factor to `[0, 1]`; NaN snaps to the target.
#[must_use]
pub fn clamp_t(t: f32) -> f32 {
    if t.is_nan() {
        1.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

// Float comparisons are bitwise so a NaN field does not report a change every tick.

pub(crate) fn f32_changed(a: f32, b: f32) -> bool {
    a.to_bits() != b.to_bits()
}

pub(crate) fn vec2_changed(a: Vec2, b: Vec2) -> bool {
    f32_changed(a.x, b.x) || f32_changed(a.y, b.y)
}

pub(crate) fn vec3_changed(a: Vec3, b: Vec3) -> bool {
    f32_changed(a.x, b.x) || f32_changed(a.y, b.y) || f32_changed(a.z, b.z)
}

pub(crate) fn vec4_changed(a: Vec4, b: Vec4) -> bool {
    vec3_changed(a.truncate(), b.truncate()) || f32_changed(a.w, b.w)
}

pub(crate) fn quat_changed(a: Quat, b: Quat) -> bool {
    vec4_changed(Vec4::from(a), Vec4::from(b))
}

pub(crate) fn color_changed(a: Color, b: Color) -> bool {
    f32_changed(a.r, b.r) || f32_changed(a.g, b.g) || f32_changed(a.b, b.b) || f32_changed(a.a, b.a)
}

pub(crate) fn color32_changed(a: Color32, b: Color32) -> bool {
    a != b
}

pub(crate) fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
