//! A small animated scene for the `host` command.

use assets::{AssetKind, MemoryAssetSource};
use bytestream::{Color, Color32};
use codec::{
    CanvasState, ComponentData, ImageState, MaskState, MeshFilterState, MeshRendererState,
    SkinnedMeshState, TextState, TransformState,
};
use glam::{Quat, Vec2, Vec3};
use scene::{MemoryScene, SourceId};
use schema::ComponentKind;

const WORLD: SourceId = SourceId(1);
const CRATE: SourceId = SourceId(2);
const RIG: SourceId = SourceId(10);
const BONES: [SourceId; 4] = [SourceId(11), SourceId(12), SourceId(13), SourceId(14)];
const BODY: SourceId = SourceId(15);
const HUD: SourceId = SourceId(20);
const PANEL: SourceId = SourceId(21);
const SCORE: SourceId = SourceId(22);

/// Assets referenced by [`DemoScene`].
pub fn demo_assets() -> MemoryAssetSource {
    MemoryAssetSource::new()
        .with(AssetKind::Mesh, "meshes/crate")
        .with(AssetKind::Mesh, "meshes/body")
        .with(AssetKind::Material, "materials/wood")
        .with(AssetKind::Material, "materials/skin")
        .with(AssetKind::Sprite, "sprites/panel")
        .with(AssetKind::Font, "fonts/mono")
}

/// Hierarchy, renderers, a skinned rig and a HUD, animated by [`advance`](Self::advance).
#[derive(Debug, Clone)]
pub struct DemoScene {
    scene: MemoryScene,
    score: u32,
}

impl Default for DemoScene {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoScene {
    pub fn new() -> Self {
        let mut scene = MemoryScene::new();

        scene.spawn(WORLD, None);
        scene.insert(WORLD, named("world"));

        scene.spawn(CRATE, Some(WORLD));
        scene.insert(
            CRATE,
            TransformState {
                position: Vec3::new(0.0, 0.5, 2.0),
                ..named("crate")
            },
        );
        scene.insert(
            CRATE,
            MeshFilterState {
                mesh: Some("meshes/crate".into()),
            },
        );
        scene.insert(
            CRATE,
            MeshRendererState {
                materials: vec![Some("materials/wood".into())],
                ..MeshRendererState::default()
            },
        );

        scene.spawn(RIG, Some(WORLD));
        scene.insert(RIG, named("rig"));
        let mut parent = RIG;
        for (i, bone) in BONES.into_iter().enumerate() {
            scene.spawn(bone, Some(parent));
            scene.insert(
                bone,
                TransformState {
                    position: Vec3::Y * 0.5,
                    ..named(&format!("bone{i}"))
                },
            );
            parent = bone;
        }
        scene.spawn(BODY, Some(RIG));
        scene.insert(BODY, named("body"));
        scene.insert(
            BODY,
            SkinnedMeshState {
                mesh: Some("meshes/body".into()),
                materials: vec![Some("materials/skin".into())],
                ..SkinnedMeshState::default()
            },
        );
        scene.set_references(BODY, ComponentKind::SkinnedMesh, BONES.to_vec());

        scene.spawn(HUD, None);
        scene.insert(HUD, named("hud"));
        scene.insert(
            HUD,
            CanvasState {
                reference_resolution: Vec2::new(1920.0, 1080.0),
                ..CanvasState::default()
            },
        );
        scene.spawn(PANEL, Some(HUD));
        scene.insert(PANEL, named("panel"));
        scene.insert(
            PANEL,
            ImageState {
                sprite: Some("sprites/panel".into()),
                color: Color32::new(20, 20, 40, 200),
                ..ImageState::default()
            },
        );
        scene.insert(
            PANEL,
            MaskState {
                enabled: true,
                show_graphic: true,
            },
        );
        scene.spawn(SCORE, Some(PANEL));
        scene.insert(SCORE, named("score"));
        scene.insert(
            SCORE,
            TextState {
                text: "score: 0".into(),
                font: Some("fonts/mono".into()),
                color: Color::WHITE,
                ..TextState::default()
            },
        );

        Self { scene, score: 0 }
    }

    pub const fn scene(&self) -> &MemoryScene {
        &self.scene
    }

    /// Moves the scene to time `t` seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance(&mut self, t: f32) {
        if let Some(crate_transform) = self.transform_mut(CRATE) {
            crate_transform.rotation = Quat::from_rotation_y(t);
        }
        for (i, bone) in BONES.into_iter().enumerate() {
            let phase = t * 2.0 + i as f32 * 0.4;
            if let Some(transform) = self.transform_mut(bone) {
                transform.rotation = Quat::from_rotation_z(phase.sin() * 0.3);
            }
        }
        if let Some(ComponentData::Image(image)) =
            self.scene.component_mut(PANEL, ComponentKind::Image)
        {
            image.fill_amount = 0.5f32.mul_add((t * 0.5).sin(), 0.5);
        }
        let score = t.max(0.0) as u32;
        if score != self.score {
            self.score = score;
            if let Some(ComponentData::Text(text)) =
                self.scene.component_mut(SCORE, ComponentKind::Text)
            {
                text.text = format!("score: {score}");
            }
        }
    }

    fn transform_mut(&mut self, source: SourceId) -> Option<&mut TransformState> {
        self.scene
            .component_mut(source, ComponentKind::Transform)?
            .as_transform_mut()
    }
}

fn named(name: &str) -> TransformState {
    TransformState {
        name: name.to_owned(),
        ..TransformState::default()
    }
}
