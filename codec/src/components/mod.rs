//! Component states and the tagged [`ComponentData`] wrapper.

mod canvas;
mod image;
mod mask;
mod mesh_filter;
mod mesh_renderer;
mod skinned_mesh;
mod text;
mod transform;

pub use canvas::CanvasState;
pub use image::ImageState;
pub use mask::MaskState;
pub use mesh_filter::MeshFilterState;
pub use mesh_renderer::MeshRendererState;
pub use skinned_mesh::SkinnedMeshState;
pub use text::TextState;
pub use transform::TransformState;

use bytestream::{ByteReader, ByteWriter};
use schema::{ChangeFlags, ComponentKind};

use crate::context::{DecodeContext, EncodeContext};
use crate::error::{CodecError, CodecResult};
use crate::state::ComponentState;

/// State of one component of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentData {
    Transform(TransformState),
    MeshFilter(MeshFilterState),
    MeshRenderer(MeshRendererState),
    Canvas(CanvasState),
    Image(ImageState),
    Mask(MaskState),
    Text(TextState),
    SkinnedMesh(SkinnedMeshState),
}

macro_rules! dispatch {
    ($value:expr, $state:ident => $body:expr) => {
        match $value {
            ComponentData::Transform($state) => $body,
            ComponentData::MeshFilter($state) => $body,
            ComponentData::MeshRenderer($state) => $body,
            ComponentData::Canvas($state) => $body,
            ComponentData::Image($state) => $body,
            ComponentData::Mask($state) => $body,
            ComponentData::Text($state) => $body,
            ComponentData::SkinnedMesh($state) => $body,
        }
    };
}

macro_rules! same_kind {
    ($left:expr, $right:expr, $a:ident, $b:ident => $body:expr, _ => $fallback:expr) => {
        match ($left, $right) {
            (ComponentData::Transform($a), ComponentData::Transform($b)) => $body,
            (ComponentData::MeshFilter($a), ComponentData::MeshFilter($b)) => $body,
            (ComponentData::MeshRenderer($a), ComponentData::MeshRenderer($b)) => $body,
            (ComponentData::Canvas($a), ComponentData::Canvas($b)) => $body,
            (ComponentData::Image($a), ComponentData::Image($b)) => $body,
            (ComponentData::Mask($a), ComponentData::Mask($b)) => $body,
            (ComponentData::Text($a), ComponentData::Text($b)) => $body,
            (ComponentData::SkinnedMesh($a), ComponentData::SkinnedMesh($b)) => $body,
            _ => $fallback,
        }
    };
}

impl ComponentData {
    /// Default state of `kind`; the starting point of every observer component.
    #[must_use]
    pub fn default_for(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Transform => Self::Transform(TransformState::default()),
            ComponentKind::MeshFilter => Self::MeshFilter(MeshFilterState::default()),
            ComponentKind::MeshRenderer => Self::MeshRenderer(MeshRendererState::default()),
            ComponentKind::Canvas => Self::Canvas(CanvasState::default()),
            ComponentKind::Image => Self::Image(ImageState::default()),
            ComponentKind::Mask => Self::Mask(MaskState::default()),
            ComponentKind::Text => Self::Text(TextState::default()),
            ComponentKind::SkinnedMesh => Self::SkinnedMesh(SkinnedMeshState::default()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Transform(_) => ComponentKind::Transform,
            Self::MeshFilter(_) => ComponentKind::MeshFilter,
            Self::MeshRenderer(_) => ComponentKind::MeshRenderer,
            Self::Canvas(_) => ComponentKind::Canvas,
            Self::Image(_) => ComponentKind::Image,
            Self::Mask(_) => ComponentKind::Mask,
            Self::Text(_) => ComponentKind::Text,
            Self::SkinnedMesh(_) => ComponentKind::SkinnedMesh,
        }
    }

    /// Flags where `self` differs from `baseline`; all flags if the kinds differ.
    #[must_use]
    pub fn diff(&self, baseline: &Self) -> ChangeFlags {
        same_kind!(self, baseline, live, base => live.diff(base), _ => self.kind().all_flags())
    }

    /// Copies the flagged fields of `source`; replaces `self` if the kinds differ.
    pub fn copy_from(&mut self, source: &Self, flags: ChangeFlags) {
        let replaced = same_kind!(&mut *self, source, dst, src => {
            dst.copy_from(src, flags);
            false
        }, _ => true);
        if replaced {
            *self = source.clone();
        }
    }

    pub fn encode(&self, flags: ChangeFlags, writer: &mut ByteWriter, ctx: &EncodeContext<'_>) {
        dispatch!(self, state => state.encode(flags, writer, ctx));
    }

    /// Reads exactly the fields named by `flags`.
    pub fn decode(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        ctx: &DecodeContext<'_>,
    ) -> CodecResult<()> {
        self.check_flags(flags)?;
        dispatch!(self, state => state.decode(flags, reader, ctx))
    }

    /// Reads like [`decode`](Self::decode), interpolating lerpable fields by `t`.
    pub fn decode_lerp(
        &mut self,
        flags: ChangeFlags,
        reader: &mut ByteReader<'_>,
        ctx: &DecodeContext<'_>,
        t: f32,
    ) -> CodecResult<()> {
        self.check_flags(flags)?;
        dispatch!(self, state => state.decode_lerp(flags, reader, ctx, t))
    }

    fn check_flags(&self, flags: ChangeFlags) -> CodecResult<()> {
        let kind = self.kind();
        if flags.is_subset_of(kind.all_flags()) {
            Ok(())
        } else {
            Err(CodecError::UndefinedFlags {
                kind,
                flags: flags.bits(),
            })
        }
    }

    #[must_use]
    pub const fn as_transform(&self) -> Option<&TransformState> {
        match self {
            Self::Transform(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_transform_mut(&mut self) -> Option<&mut TransformState> {
        match self {
            Self::Transform(state) => Some(state),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_skinned_mesh(&self) -> Option<&SkinnedMeshState> {
        match self {
            Self::SkinnedMesh(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_skinned_mesh_mut(&mut self) -> Option<&mut SkinnedMeshState> {
        match self {
            Self::SkinnedMesh(state) => Some(state),
            _ => None,
        }
    }
}

macro_rules! impl_from_state {
    ($($variant:ident($state:ty)),+ $(,)?) => {
        $(
            impl From<$state> for ComponentData {
                fn from(state: $state) -> Self {
                    Self::$variant(state)
                }
            }
        )+
    };
}

impl_from_state!(
    Transform(TransformState),
    MeshFilter(MeshFilterState),
    MeshRenderer(MeshRendererState),
    Canvas(CanvasState),
    Image(ImageState),
    Mask(MaskState),
    Text(TextState),
    SkinnedMesh(SkinnedMeshState),
);
