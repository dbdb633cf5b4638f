//! Field layout descriptions.

use crate::flags::ChangeFlags;

/// Encoded shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldType {
    Bool,
    U8,
    U16,
    I32,
    F32,
    Str,
    /// Entity id as `u32`, `0` for none.
    EntityRef,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    Color,
    Color32,
    Asset,
    /// Varint count followed by asset ids.
    AssetList,
    /// Varint count followed by `u32` entity ids.
    EntityList,
    /// Cast mode `u8` followed by the receive flag.
    Shadows,
}

impl FieldType {
    /// Encoded size in bytes for fixed-size types.
    #[must_use]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 => Some(1),
            Self::U16 | Self::Shadows => Some(2),
            Self::I32 | Self::F32 | Self::EntityRef | Self::Color32 => Some(4),
            Self::Vec2 => Some(8),
            Self::Vec3 => Some(12),
            Self::Vec4 | Self::Quat | Self::Color | Self::Asset => Some(16),
            Self::Str | Self::AssetList | Self::EntityList => None,
        }
    }
}

/// One field of a component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub flag: ChangeFlags,
    pub ty: FieldType,
    /// Whether interpolated reads blend this field.
    pub lerp: bool,
}
