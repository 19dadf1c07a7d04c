//! World placement of the bounding box.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Translation, rotation and scale of the unit box in world space, plus a
/// slow cosmetic spin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeTransform {
    /// Translation component.
    pub translation: Vec3,
    /// Rotation component as a quaternion.
    pub rotation: Quat,
    /// Scale component.
    pub scale: Vec3,
    /// Spin axis (world space).
    pub spin_axis: Vec3,
    /// Spin rate in radians per second. Zero disables the spin.
    pub spin_speed: f32,
}

impl Default for VolumeTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            spin_axis: Vec3::Y,
            spin_speed: 0.0,
        }
    }
}

impl VolumeTransform {
    /// Creates an identity transform spinning at `spin_speed` about +Y.
    #[must_use]
    pub fn spinning(spin_speed: f32) -> Self {
        Self {
            spin_speed,
            ..Default::default()
        }
    }

    /// Model matrix taking box-local points to world space.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Takes a world-space point into the box's local space.
    #[must_use]
    pub fn world_to_local(&self, point: Vec3) -> Vec3 {
        self.to_matrix().inverse().transform_point3(point)
    }

    /// Advances the spin by `dt` seconds.
    pub fn spin(&mut self, dt: f32) {
        if self.spin_speed == 0.0 || dt <= 0.0 {
            return;
        }
        let axis = self.spin_axis.normalize_or(Vec3::Y);
        self.rotation = (Quat::from_axis_angle(axis, self.spin_speed * dt) * self.rotation)
            .normalize();
    }

    /// World-space corners of the box's axis-aligned bounds.
    #[must_use]
    pub fn world_bounds(&self) -> (Vec3, Vec3) {
        let m = self.to_matrix();
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for i in 0..8u32 {
            let corner = Vec3::new(
                if i & 1 == 0 { -0.5 } else { 0.5 },
                if i & 2 == 0 { -0.5 } else { 0.5 },
                if i & 4 == 0 { -0.5 } else { 0.5 },
            );
            let p = m.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }
}
