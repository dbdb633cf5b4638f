//! The fixed set of replicated component kinds.

use std::fmt;

use wire::KindCode;

use crate::field::{FieldDef, FieldType};
use crate::flags::{
    canvas, image, mask, mesh_filter, mesh_renderer, skinned_mesh, text, transform, ChangeFlags,
};

/// A replicated component kind.
///
/// Declaration order is dependency order: kinds that reference other
/// entities come after the transforms they reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ComponentKind {
    Transform,
    MeshFilter,
    MeshRenderer,
    Canvas,
    Image,
    Mask,
    Text,
    SkinnedMesh,
}

impl ComponentKind {
    /// Every kind, in dependency order.
    pub const ALL: [Self; 8] = [
        Self::Transform,
        Self::MeshFilter,
        Self::MeshRenderer,
        Self::Canvas,
        Self::Image,
        Self::Mask,
        Self::Text,
        Self::SkinnedMesh,
    ];

    /// Wire code of this kind.
    #[must_use]
    pub const fn code(self) -> KindCode {
        KindCode::from_bytes(match self {
            Self::Transform => *b"TRN",
            Self::MeshFilter => *b"MFL",
            Self::MeshRenderer => *b"MRD",
            Self::Canvas => *b"CNV",
            Self::Image => *b"IMG",
            Self::Mask => *b"MSK",
            Self::Text => *b"TXT",
            Self::SkinnedMesh => *b"SMR",
        })
    }

    /// Looks up the kind for a wire code.
    #[must_use]
    pub fn from_code(code: KindCode) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::MeshFilter => "mesh_filter",
            Self::MeshRenderer => "mesh_renderer",
            Self::Canvas => "canvas",
            Self::Image => "image",
            Self::Mask => "mask",
            Self::Text => "text",
            Self::SkinnedMesh => "skinned_mesh",
        }
    }

    /// Field layout in serialization order.
    #[must_use]
    pub const fn fields(self) -> &'static [FieldDef] {
        match self {
            Self::Transform => TRANSFORM_FIELDS,
            Self::MeshFilter => MESH_FILTER_FIELDS,
            Self::MeshRenderer => MESH_RENDERER_FIELDS,
            Self::Canvas => CANVAS_FIELDS,
            Self::Image => IMAGE_FIELDS,
            Self::Mask => MASK_FIELDS,
            Self::Text => TEXT_FIELDS,
            Self::SkinnedMesh => SKINNED_MESH_FIELDS,
        }
    }

    /// Union of every flag the kind defines; a complete message carries all of them.
    #[must_use]
    pub fn all_flags(self) -> ChangeFlags {
        self.fields()
            .iter()
            .fold(ChangeFlags::EMPTY, |acc, field| acc | field.flag)
    }

    /// Flags whose fields can be interpolated.
    #[must_use]
    pub fn lerp_flags(self) -> ChangeFlags {
        self.fields()
            .iter()
            .filter(|field| field.lerp)
            .fold(ChangeFlags::EMPTY, |acc, field| acc | field.flag)
    }

    /// Returns `true` if messages of this kind reference other entities and
    /// must wait for them to be broadcast first.
    #[must_use]
    pub fn has_entity_dependencies(self) -> bool {
        self.fields()
            .iter()
            .any(|field| field.ty == FieldType::EntityList)
    }

    /// Returns `flags` with bits this kind does not define removed.
    #[must_use]
    pub fn mask(self, flags: ChangeFlags) -> ChangeFlags {
        flags & self.all_flags()
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn field(name: &'static str, flag: ChangeFlags, ty: FieldType) -> FieldDef {
    FieldDef {
        name,
        flag,
        ty,
        lerp: false,
    }
}

const fn lerp(name: &'static str, flag: ChangeFlags, ty: FieldType) -> FieldDef {
    FieldDef {
        name,
        flag,
        ty,
        lerp: true,
    }
}

const TRANSFORM_FIELDS: &[FieldDef] = &[
    field("name", transform::NAME, FieldType::Str),
    field("layer", transform::LAYER, FieldType::I32),
    field("parent", transform::PARENT, FieldType::EntityRef),
    lerp("position", transform::POSITION, FieldType::Vec3),
    lerp("rotation", transform::ROTATION, FieldType::Quat),
    lerp("scale", transform::SCALE, FieldType::Vec3),
    field("active", transform::ACTIVE, FieldType::Bool),
];

const MESH_FILTER_FIELDS: &[FieldDef] = &[field("mesh", mesh_filter::MESH, FieldType::Asset)];

const MESH_RENDERER_FIELDS: &[FieldDef] = &[
    field("enabled", mesh_renderer::ENABLED, FieldType::Bool),
    field("materials", mesh_renderer::MATERIALS, FieldType::AssetList),
    field("shadows", mesh_renderer::SHADOWS, FieldType::Shadows),
    lerp("color", mesh_renderer::COLOR, FieldType::Color),
    lerp("lightmap_scale_offset", mesh_renderer::LIGHTMAP, FieldType::Vec4),
];

const CANVAS_FIELDS: &[FieldDef] = &[
    field("enabled", canvas::ENABLED, FieldType::Bool),
    field("render_mode", canvas::RENDER_MODE, FieldType::U8),
    field("sorting_order", canvas::SORTING_ORDER, FieldType::I32),
    lerp("scale_factor", canvas::SCALE_FACTOR, FieldType::F32),
    lerp(
        "reference_resolution",
        canvas::REFERENCE_RESOLUTION,
        FieldType::Vec2,
    ),
];

const IMAGE_FIELDS: &[FieldDef] = &[
    field("enabled", image::ENABLED, FieldType::Bool),
    field("sprite", image::SPRITE, FieldType::Asset),
    field("material", image::MATERIAL, FieldType::Asset),
    lerp("color", image::COLOR, FieldType::Color32),
    lerp("fill_amount", image::FILL_AMOUNT, FieldType::F32),
    field("preserve_aspect", image::PRESERVE_ASPECT, FieldType::Bool),
];

const MASK_FIELDS: &[FieldDef] = &[
    field("enabled", mask::ENABLED, FieldType::Bool),
    field("show_graphic", mask::SHOW_GRAPHIC, FieldType::Bool),
];

const TEXT_FIELDS: &[FieldDef] = &[
    field("enabled", text::ENABLED, FieldType::Bool),
    field("text", text::TEXT, FieldType::Str),
    field("font", text::FONT, FieldType::Asset),
    lerp("font_size", text::FONT_SIZE, FieldType::F32),
    lerp("color", text::COLOR, FieldType::Color),
    field("alignment", text::ALIGNMENT, FieldType::U16),
];

const SKINNED_MESH_FIELDS: &[FieldDef] = &[
    field("enabled", skinned_mesh::ENABLED, FieldType::Bool),
    field("mesh", skinned_mesh::MESH, FieldType::Asset),
    field("materials", skinned_mesh::MATERIALS, FieldType::AssetList),
    field("bones", skinned_mesh::BONES, FieldType::EntityList),
    field(
        "update_when_offscreen",
        skinned_mesh::UPDATE_OFFSCREEN,
        FieldType::Bool,
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for kind in ComponentKind::ALL {
            assert_eq!(ComponentKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ComponentKind::from_code(KindCode::DESTROY), None);
    }

    #[test]
    fn codes_are_unique_and_valid() {
        let mut codes: Vec<_> = ComponentKind::ALL.iter().map(|k| k.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), ComponentKind::ALL.len());
        for code in codes {
            assert!(KindCode::parse(*code.as_bytes()).is_ok());
        }
    }

    #[test]
    fn field_flags_are_distinct_and_ordered() {
        for kind in ComponentKind::ALL {
            let mut last = 0u8;
            for field in kind.fields() {
                assert_eq!(field.flag.bits().count_ones(), 1, "{kind}.{}", field.name);
                assert!(field.flag.bits() > last, "{kind} fields must ascend");
                last = field.flag.bits();
            }
        }
    }

    #[test]
    fn lerp_flags_per_kind() {
        assert_eq!(
            ComponentKind::Transform.lerp_flags(),
            transform::POSITION | transform::ROTATION | transform::SCALE
        );
        assert_eq!(
            ComponentKind::MeshRenderer.lerp_flags(),
            mesh_renderer::COLOR | mesh_renderer::LIGHTMAP
        );
        assert_eq!(
            ComponentKind::Canvas.lerp_flags(),
            canvas::SCALE_FACTOR | canvas::REFERENCE_RESOLUTION
        );
        assert_eq!(
            ComponentKind::Image.lerp_flags(),
            image::COLOR | image::FILL_AMOUNT
        );
        assert_eq!(
            ComponentKind::Text.lerp_flags(),
            text::FONT_SIZE | text::COLOR
        );
        assert!(ComponentKind::Mask.lerp_flags().is_empty());
        assert!(ComponentKind::MeshFilter.lerp_flags().is_empty());
        assert!(ComponentKind::SkinnedMesh.lerp_flags().is_empty());
    }

    #[test]
    fn all_flags_counts() {
        assert_eq!(ComponentKind::Transform.all_flags().bits(), 0x7F);
        assert_eq!(ComponentKind::MeshFilter.all_flags().bits(), 0x01);
        assert_eq!(ComponentKind::SkinnedMesh.all_flags().bits(), 0x1F);
    }

    #[test]
    fn only_skinned_mesh_has_dependencies() {
        for kind in ComponentKind::ALL {
            assert_eq!(
                kind.has_entity_dependencies(),
                kind == ComponentKind::SkinnedMesh
            );
        }
        assert_eq!(ComponentKind::ALL.last(), Some(&ComponentKind::SkinnedMesh));
    }

    #[test]
    fn mask_drops_undefined_bits() {
        let flags = ChangeFlags::from_bits(0xFF);
        assert_eq!(ComponentKind::Mask.mask(flags).bits(), 0x03);
    }
}
