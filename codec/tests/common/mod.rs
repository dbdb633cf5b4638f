#![allow(dead_code)]

use assets::{AssetCache, AssetKind, AssetRef, MemoryAssetSource};
use bytestream::{Color, Color32, Quat, Vec2, Vec3, Vec4};
use codec::{
    CanvasState, ComponentData, EntityId, ImageState, MaskState, MeshFilterState,
    MeshRendererState, SkinnedMeshState, TextState, TransformState,
};
use proptest::prelude::*;
use schema::{ChangeFlags, ComponentKind};

pub const KEYS: [&str; 3] = ["alpha", "beta", "gamma"];

/// Cache knowing every key of every kind.
pub fn asset_cache() -> AssetCache {
    let mut source = MemoryAssetSource::new();
    for kind in AssetKind::ALL {
        for key in KEYS {
            source.insert(kind, key);
        }
    }
    AssetCache::build(&source)
}

fn float() -> impl Strategy<Value = f32> {
    -1000.0f32..1000.0
}

fn vec2() -> impl Strategy<Value = Vec2> {
    (float(), float()).prop_map(|(x, y)| Vec2::new(x, y))
}

fn vec3() -> impl Strategy<Value = Vec3> {
    (float(), float(), float()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn vec4() -> impl Strategy<Value = Vec4> {
    (float(), float(), float(), float()).prop_map(|(x, y, z, w)| Vec4::new(x, y, z, w))
}

fn quat() -> impl Strategy<Value = Quat> {
    vec4().prop_map(Quat::from_vec4)
}

fn color() -> impl Strategy<Value = Color> {
    (0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0)
        .prop_map(|(r, g, b, a)| Color::new(r, g, b, a))
}

fn color32() -> impl Strategy<Value = Color32> {
    any::<[u8; 4]>().prop_map(|[r, g, b, a]| Color32::new(r, g, b, a))
}

fn asset() -> impl Strategy<Value = Option<AssetRef>> {
    prop::option::of(prop::sample::select(KEYS.to_vec()).prop_map(|key| AssetRef::new(key)))
}

fn assets(max: usize) -> impl Strategy<Value = Vec<Option<AssetRef>>> {
    prop::collection::vec(asset(), 0..max)
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _é]{0,32}"
}

fn entity() -> impl Strategy<Value = EntityId> {
    any::<u32>().prop_map(EntityId::new)
}

pub fn transform_state() -> impl Strategy<Value = TransformState> {
    (text(), any::<i32>(), entity(), vec3(), quat(), vec3(), any::<bool>()).prop_map(
        |(name, layer, parent, position, rotation, scale, active)| TransformState {
            name,
            layer,
            parent,
            position,
            rotation,
            scale,
            active,
        },
    )
}

pub fn mesh_filter_state() -> impl Strategy<Value = MeshFilterState> {
    asset().prop_map(|mesh| MeshFilterState { mesh })
}

pub fn mesh_renderer_state() -> impl Strategy<Value = MeshRendererState> {
    (
        any::<bool>(),
        assets(6),
        any::<u8>(),
        any::<bool>(),
        color(),
        vec4(),
    )
        .prop_map(
            |(enabled, materials, shadow_casting, receive_shadows, color, lightmap)| {
                MeshRendererState {
                    enabled,
                    materials,
                    shadow_casting,
                    receive_shadows,
                    color,
                    lightmap_scale_offset: lightmap,
                }
            },
        )
}

pub fn canvas_state() -> impl Strategy<Value = CanvasState> {
    (any::<bool>(), any::<u8>(), any::<i32>(), float(), vec2()).prop_map(
        |(enabled, render_mode, sorting_order, scale_factor, reference_resolution)| CanvasState {
            enabled,
            render_mode,
            sorting_order,
            scale_factor,
            reference_resolution,
        },
    )
}

pub fn image_state() -> impl Strategy<Value = ImageState> {
    (
        any::<bool>(),
        asset(),
        asset(),
        color32(),
        0.0f32..1.0,
        any::<bool>(),
    )
        .prop_map(
            |(enabled, sprite, material, color, fill_amount, preserve_aspect)| ImageState {
                enabled,
                sprite,
                material,
                color,
                fill_amount,
                preserve_aspect,
            },
        )
}

pub fn mask_state() -> impl Strategy<Value = MaskState> {
    (any::<bool>(), any::<bool>()).prop_map(|(enabled, show_graphic)| MaskState {
        enabled,
        show_graphic,
    })
}

pub fn text_state() -> impl Strategy<Value = TextState> {
    (
        any::<bool>(),
        text(),
        asset(),
        float(),
        color(),
        any::<u16>(),
    )
        .prop_map(|(enabled, text, font, font_size, color, alignment)| TextState {
            enabled,
            text,
            font,
            font_size,
            color,
            alignment,
        })
}

pub fn skinned_mesh_state() -> impl Strategy<Value = SkinnedMeshState> {
    (
        any::<bool>(),
        asset(),
        assets(6),
        prop::collection::vec(entity(), 0..24),
        any::<bool>(),
    )
        .prop_map(
            |(enabled, mesh, materials, bones, update_when_offscreen)| SkinnedMeshState {
                enabled,
                mesh,
                materials,
                bones,
                update_when_offscreen,
            },
        )
}

pub fn component_data() -> impl Strategy<Value = ComponentData> {
    prop_oneof![
        transform_state().prop_map(ComponentData::from),
        mesh_filter_state().prop_map(ComponentData::from),
        mesh_renderer_state().prop_map(ComponentData::from),
        canvas_state().prop_map(ComponentData::from),
        image_state().prop_map(ComponentData::from),
        mask_state().prop_map(ComponentData::from),
        text_state().prop_map(ComponentData::from),
        skinned_mesh_state().prop_map(ComponentData::from),
    ]
}

/// Same-kind pair of states.
pub fn component_pair() -> impl Strategy<Value = (ComponentData, ComponentData)> {
    prop_oneof![
        (transform_state(), transform_state()).prop_map(|(a, b)| (ComponentData::from(a), ComponentData::from(b))),
        (mesh_filter_state(), mesh_filter_state()).prop_map(|(a, b)| (ComponentData::from(a), ComponentData::from(b))),
        (mesh_renderer_state(), mesh_renderer_state()).prop_map(|(a, b)| (ComponentData::from(a), ComponentData::from(b))),
        (canvas_state(), canvas_state()).prop_map(|(a, b)| (ComponentData::from(a), ComponentData::from(b))),
        (image_state(), image_state()).prop_map(|(a, b)| (ComponentData::from(a), ComponentData::from(b))),
        (mask_state(), mask_state()).prop_map(|(a, b)| (ComponentData::from(a), ComponentData::from(b))),
        (text_state(), text_state()).prop_map(|(a, b)| (ComponentData::from(a), ComponentData::from(b))),
        (skinned_mesh_state(), skinned_mesh_state()).prop_map(|(a, b)| (ComponentData::from(a), ComponentData::from(b))),
    ]
}

/// Random subset of the kind's defined flags.
pub fn flags_for(kind: ComponentKind, raw: u8) -> ChangeFlags {
    kind.mask(ChangeFlags::from_bits(raw))
}
