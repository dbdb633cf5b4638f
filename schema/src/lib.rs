//! Component kinds, change flags and field layout for scenecast.
//!
//! This crate defines the fixed set of replicated component kinds:
//! - [`ComponentKind`] with its three-letter wire code and dependency order
//! - [`ChangeFlags`] and the per-kind flag constants
//! - [`FieldDef`] tables giving serialization order and lerpable subsets
//! - a deterministic [`protocol_hash`] of the whole table
//!
//! # Design Principles
//!
//! - **Closed set** - Kinds are an enum; adding one is a protocol change.
//! - **One table** - Flag order, types and lerp subsets come from the same field table.

mod field;
mod flags;
mod hash;
mod kind;

pub use field::{FieldDef, FieldType};
pub use flags::{
    canvas, image, mask, mesh_filter, mesh_renderer, skinned_mesh, text, transform, ChangeFlags,
};
pub use hash::protocol_hash;
pub use kind::ComponentKind;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = ComponentKind::ALL;
        let _ = ChangeFlags::EMPTY;
        let _ = transform::POSITION;
        let _ = protocol_hash();
    }

    #[test]
    fn dependency_order_starts_with_transform() {
        assert_eq!(ComponentKind::ALL[0], ComponentKind::Transform);
    }
}
