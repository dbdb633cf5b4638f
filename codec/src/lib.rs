//! Component state encoding, decoding, diffing and interpolation.
//!
//! This crate ties together bytestream, wire, schema and assets. Each
//! component kind has a state struct implementing [`ComponentState`]; the
//! tagged [`ComponentData`] wraps them for code that handles any kind.
//!
//! # Features
//!
//! - Complete and delta payloads selected by [`ChangeFlags`](schema::ChangeFlags)
//! - Baseline diffing and flagged copies for change tracking
//! - Interpolated reads for lerpable fields (slerp for rotations)
//! - Asset references resolved through [`assets::AssetCache`]
//!
//! # Design Principles
//!
//! - **Symmetric** - Reads consume exactly the bytes writes produce, per flag.
//! - **Total lookups** - Unknown assets degrade to empty ids and `None`, with a warning.
//! - **Bounded decoding** - String and list sizes are checked against [`CodecLimits`].

mod components;
mod context;
mod error;
mod limits;
mod message;
mod state;
mod types;

pub use components::{
    CanvasState, ComponentData, ImageState, MaskState, MeshFilterState, MeshRendererState,
    SkinnedMeshState, TextState, TransformState,
};
pub use context::{DecodeContext, EncodeContext};
pub use error::{CodecError, CodecResult, LimitKind};
pub use limits::CodecLimits;
pub use message::{encode_message, encode_tombstone};
pub use state::{clamp_t, ComponentState};
pub use types::EntityId;
pub use wire::Limits as WireLimits;
