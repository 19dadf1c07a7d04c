//! End-to-end checks of the reference ray marcher against generated fields.
//!
//! These run entirely on the CPU, so they need no adapter.

use cumulus_core::march::CENTERED_JITTER;
use cumulus_core::{
    march, DensityField, NoiseParameters, PermutationTable, Ray, RayMarchParams, ShadingFeatures,
    Vec3, VolumeSampler,
};
use proptest::prelude::*;

fn cloud_volume(resolution: u32) -> VolumeSampler {
    let field =
        DensityField::generate(&NoiseParameters::cloud(resolution), &PermutationTable::classic())
            .unwrap();
    VolumeSampler::new(field)
}

/// Linear falloff from 255 at the center to 0 at half the grid size.
fn radial_volume(resolution: u32) -> VolumeSampler {
    let center = (resolution - 1) as f32 / 2.0;
    let radius = resolution as f32 / 2.0;
    let field = DensityField::from_fn(resolution, |x, y, z| {
        let d = Vec3::new(x as f32, y as f32, z as f32).distance(Vec3::splat(center)) / radius;
        (255.0 * (1.0 - d)).clamp(0.0, 255.0) as u8
    })
    .unwrap();
    VolumeSampler::new(field)
}

fn params(steps: u32) -> RayMarchParams {
    RayMarchParams {
        threshold: 0.25,
        opacity: 0.25,
        range: 0.1,
        steps,
        ..RayMarchParams::default()
    }
}

fn axis_ray(x: f32, y: f32) -> Ray {
    Ray::new(Vec3::new(x, y, 2.0), Vec3::NEG_Z)
}

#[test]
fn test_cloud_center_ray_is_visible() {
    let volume = cloud_volume(128);
    let ray = Ray::through(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO);
    let result = march(
        &ray,
        &volume,
        &params(100),
        ShadingFeatures::default(),
        CENTERED_JITTER,
    );
    assert!(result.opacity > 0.0, "center ray accumulated nothing");
    assert!(result.opacity <= 1.0);
}

#[test]
fn test_ray_missing_box_is_transparent() {
    let volume = cloud_volume(32);
    let ray = Ray::new(Vec3::new(2.0, 2.0, 2.0), Vec3::X);
    for features in [
        ShadingFeatures::default(),
        ShadingFeatures {
            shaded: true,
            jitter: true,
        },
    ] {
        let result = march(&ray, &volume, &params(100), features, 0.3);
        assert_eq!(result.opacity, 0.0);
        assert_eq!(result.samples, 0);
    }
}

#[test]
fn test_single_step_stays_valid() {
    let volume = cloud_volume(64);
    let ray = axis_ray(0.0, 0.0);
    let shaded = ShadingFeatures {
        shaded: true,
        jitter: false,
    };
    let coarse = march(&ray, &volume, &params(1), shaded, CENTERED_JITTER);
    assert_eq!(coarse.samples, 1);
    assert!((0.0..=1.0).contains(&coarse.opacity));
    assert!(coarse.color.is_finite());

    let fine = march(&ray, &volume, &params(100), shaded, CENTERED_JITTER);
    assert!((0.0..=1.0).contains(&fine.opacity));
}

#[test]
fn test_generation_is_deterministic() {
    let noise = NoiseParameters::cloud(48);
    let table = PermutationTable::from_seed(42);
    let a = DensityField::generate(&noise, &table).unwrap();
    let b = DensityField::generate(&noise, &table).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());

    let other = DensityField::generate(&noise, &PermutationTable::from_seed(43)).unwrap();
    assert_ne!(a.as_bytes(), other.as_bytes());
}

#[test]
fn test_shaded_color_converges_with_steps() {
    let volume = radial_volume(64);
    let shaded = ShadingFeatures {
        shaded: true,
        jitter: false,
    };
    for (x, y) in [(0.0, 0.0), (-0.1, 0.1), (0.15, -0.05)] {
        let ray = axis_ray(x, y);
        let coarse = march(&ray, &volume, &params(1024), shaded, CENTERED_JITTER);
        let fine = march(&ray, &volume, &params(4096), shaded, CENTERED_JITTER);
        assert!(
            (coarse.color - fine.color).abs().max_element() < 0.02,
            "ray ({x}, {y}): {:?} vs {:?}",
            coarse.color,
            fine.color
        );
        assert!((coarse.opacity - fine.opacity).abs() < 0.02);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_opacity_is_monotonic(
        low in 0.0f32..1.0,
        extra in 0.0f32..1.0,
        x in -0.45f32..0.45,
        y in -0.45f32..0.45,
        shaded in any::<bool>(),
    ) {
        let volume = radial_volume(16);
        let high = (low + extra).min(1.0);
        let features = ShadingFeatures { shaded, jitter: false };
        let ray = axis_ray(x, y);

        let mut p = params(32);
        p.opacity = low;
        let a = march(&ray, &volume, &p, features, CENTERED_JITTER);
        p.opacity = high;
        let b = march(&ray, &volume, &p, features, CENTERED_JITTER);

        prop_assert!(b.opacity >= a.opacity);
        prop_assert!((0.0..=1.0).contains(&b.opacity));
    }

    #[test]
    fn prop_jittered_march_stays_in_range(
        jitter in 0.0f32..1.0,
        steps in 1u32..256,
        ox in -2.0f32..2.0,
        oy in -2.0f32..2.0,
    ) {
        let volume = radial_volume(16);
        let ray = Ray::through(Vec3::new(ox, oy, 2.0), Vec3::ZERO);
        let result = march(
            &ray,
            &volume,
            &params(steps),
            ShadingFeatures { shaded: true, jitter: true },
            jitter,
        );
        prop_assert!((0.0..=1.0).contains(&result.opacity));
        prop_assert!(result.samples <= steps);
    }
}
