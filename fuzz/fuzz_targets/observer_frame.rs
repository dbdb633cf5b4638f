#![no_main]

use assets::{AssetCache, AssetKind, MemoryAssetSource};
use codec::{CodecLimits, DecodeContext};
use libfuzzer_sys::fuzz_target;
use scene::{apply_frame, MirrorScene, ServiceRegistry};

fuzz_target!(|data: &[u8]| {
    let cache = AssetCache::build(
        &MemoryAssetSource::new()
            .with(AssetKind::Mesh, "meshes/cube")
            .with(AssetKind::Font, "fonts/mono"),
    );
    let limits = CodecLimits::for_testing();
    let ctx = DecodeContext::new(&cache, &limits);
    let registry = ServiceRegistry::default();
    let mut scene = MirrorScene::new();

    // The first byte selects an interpolated apply.
    let (lerp, frame) = match data.split_first() {
        Some((selector, rest)) if selector % 2 == 1 => (Some(f32::from(*selector) / 255.0), rest),
        Some((_, rest)) => (None, rest),
        None => return,
    };
    let _ = apply_frame(&mut scene, &registry, &ctx, frame, lerp, None);
    let _ = apply_frame(&mut scene, &registry, &ctx, frame, None, None);
});
