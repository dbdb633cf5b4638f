//! Per-message change flags.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Bit set naming which fields of a component a message carries.
///
/// Bits are interpreted per [`ComponentKind`](crate::ComponentKind); the
/// constants live in the per-kind modules ([`transform`], [`text`], ...).
/// An empty set means "no change" and suppresses emission.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChangeFlags(u8);

impl ChangeFlags {
    pub const EMPTY: Self = Self(0);

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if no bit outside `other` is set.
    #[must_use]
    pub const fn is_subset_of(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Sets `flag` when `changed` is true.
    pub fn set_if(&mut self, flag: Self, changed: bool) {
        if changed {
            self.insert(flag);
        }
    }
}

impl BitOr for ChangeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for ChangeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl BitAnd for ChangeFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for ChangeFlags {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for ChangeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChangeFlags({:#010b})", self.0)
    }
}

impl fmt::Display for ChangeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

macro_rules! flag_set {
    ($(#[$meta:meta])* $module:ident { $($name:ident = $bit:expr),+ $(,)? }) => {
        $(#[$meta])*
        pub mod $module {
            use super::ChangeFlags;

            $(pub const $name: ChangeFlags = ChangeFlags::from_bits(1 << $bit);)+
        }
    };
}

flag_set!(
    /// Transform flags.
    transform {
        NAME = 0,
        LAYER = 1,
        PARENT = 2,
        POSITION = 3,
        ROTATION = 4,
        SCALE = 5,
        ACTIVE = 6,
    }
);

flag_set!(
    /// Mesh filter flags.
    mesh_filter { MESH = 0 }
);

flag_set!(
    /// Mesh renderer flags.
    mesh_renderer {
        ENABLED = 0,
        MATERIALS = 1,
        SHADOWS = 2,
        COLOR = 3,
        LIGHTMAP = 4,
    }
);

flag_set!(
    /// Canvas flags.
    canvas {
        ENABLED = 0,
        RENDER_MODE = 1,
        SORTING_ORDER = 2,
        SCALE_FACTOR = 3,
        REFERENCE_RESOLUTION = 4,
    }
);

flag_set!(
    /// Image flags.
    image {
        ENABLED = 0,
        SPRITE = 1,
        MATERIAL = 2,
        COLOR = 3,
        FILL_AMOUNT = 4,
        PRESERVE_ASPECT = 5,
    }
);

flag_set!(
    /// Mask flags.
    mask {
        ENABLED = 0,
        SHOW_GRAPHIC = 1,
    }
);

flag_set!(
    /// Text flags.
    text {
        ENABLED = 0,
        TEXT = 1,
        FONT = 2,
        FONT_SIZE = 3,
        COLOR = 4,
        ALIGNMENT = 5,
    }
);

flag_set!(
    /// Skinned mesh flags.
    skinned_mesh {
        ENABLED = 0,
        MESH = 1,
        MATERIALS = 2,
        BONES = 3,
        UPDATE_OFFSCREEN = 4,
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flags() {
        assert!(ChangeFlags::EMPTY.is_empty());
        assert!(ChangeFlags::default().is_empty());
        assert!(!transform::NAME.is_empty());
    }

    #[test]
    fn flag_values_match_bit_positions() {
        assert_eq!(transform::NAME.bits(), 1);
        assert_eq!(transform::POSITION.bits(), 8);
        assert_eq!(transform::ACTIVE.bits(), 64);
        assert_eq!(skinned_mesh::UPDATE_OFFSCREEN.bits(), 16);
    }

    #[test]
    fn subset_and_contains() {
        let lerp = transform::POSITION | transform::ROTATION | transform::SCALE;
        assert!(transform::POSITION.is_subset_of(lerp));
        assert!(!(transform::POSITION | transform::NAME).is_subset_of(lerp));
        assert!(lerp.contains(transform::ROTATION));
        assert!(lerp.intersects(transform::SCALE | transform::NAME));
        assert!(ChangeFlags::EMPTY.is_subset_of(lerp));
    }

    #[test]
    fn set_if_only_sets_when_changed() {
        let mut flags = ChangeFlags::EMPTY;
        flags.set_if(text::TEXT, false);
        assert!(flags.is_empty());
        flags.set_if(text::TEXT, true);
        assert_eq!(flags, text::TEXT);
    }

    #[test]
    fn formatting() {
        assert_eq!(format!("{:?}", mask::SHOW_GRAPHIC), "ChangeFlags(0b00000010)");
        assert_eq!(mask::SHOW_GRAPHIC.to_string(), "0x02");
    }
}
