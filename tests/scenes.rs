//! End-to-end coverage for each built-in scene preset: renders a handful of
//! samples at a tiny resolution and checks the output is well-formed. No
//! reference images are available in this environment, so these are
//! coarse sanity checks (finite colors, non-degenerate brightness, seed
//! reproducibility) rather than pixel-exact regression tests.

use photon_core::presets::ScenePreset;
use photon_core::render::{render, RenderConfig};

const PRESETS: [ScenePreset; 5] = [
    ScenePreset::Showcase,
    ScenePreset::Cornell,
    ScenePreset::Minimal,
    ScenePreset::Gallery,
    ScenePreset::Stress,
];

#[test]
fn every_preset_renders_finite_nonblack_output_at_low_resolution() {
    for preset in PRESETS {
        let built = preset.build(24, 16, 8);
        let config = RenderConfig {
            samples_per_pixel: 4,
            max_bounces: 4,
            ..RenderConfig::default()
        };
        let (fb, stats) = render(&built.scene, &config);

        assert_eq!(fb.pixels.len(), 24 * 16);
        assert!(
            fb.pixels.iter().all(|c| c.x.is_finite() && c.y.is_finite() && c.z.is_finite()),
            "{} produced a non-finite pixel",
            built.name
        );
        let total_luminance: f64 = fb.pixels.iter().map(|c| c.x + c.y + c.z).sum();
        assert!(total_luminance > 0.0, "{} rendered as pure black", built.name);
        assert_eq!(stats.total_rays, 24 * 16 * 4);
    }
}

#[test]
fn disabling_the_hierarchy_still_renders_the_same_shape() {
    let with_hierarchy = ScenePreset::Minimal.build(16, 16, 8);
    let without_hierarchy = ScenePreset::Minimal.build(16, 16, 0);
    let config = RenderConfig {
        samples_per_pixel: 1,
        max_bounces: 4,
        seed: 1,
        ..RenderConfig::default()
    };

    let (a, _) = render(&with_hierarchy.scene, &config);
    let (b, _) = render(&without_hierarchy.scene, &config);

    for (pa, pb) in a.pixels.iter().zip(b.pixels.iter()) {
        assert!((pa.x - pb.x).abs() < 1e-9);
        assert!((pa.y - pb.y).abs() < 1e-9);
        assert!((pa.z - pb.z).abs() < 1e-9);
    }
}
