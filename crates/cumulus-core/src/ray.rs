//! Rays in the bounding box's local space.

use glam::{Mat4, Vec3};

/// Half extent of the local bounding cube `[-0.5, 0.5]^3`.
pub const HALF_EXTENT: f32 = 0.5;

/// Direction components smaller than this are nudged away from zero before the
/// slab test divides by them.
const MIN_DIRECTION: f32 = 1e-8;

/// A ray with a normalized direction, expressed in box-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `origin` heading through `target`.
    #[must_use]
    pub fn through(origin: Vec3, target: Vec3) -> Self {
        Self::new(origin, target - origin)
    }

    /// Builds the local-space ray for a world-space camera position looking at
    /// a local-space point on the box, given the box's world transform.
    #[must_use]
    pub fn from_camera(model: Mat4, camera_world: Vec3, target_local: Vec3) -> Self {
        let origin = model.inverse().transform_point3(camera_world);
        Self::through(origin, target_local)
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab intersection with the unit cube.
    ///
    /// Returns `(t_enter, t_exit)` with `t_enter` clipped to zero, so an origin
    /// inside the cube starts at the origin. `None` when the cube is missed or
    /// lies entirely behind the origin.
    #[must_use]
    pub fn intersect_unit_cube(&self) -> Option<(f32, f32)> {
        let dir = Vec3::select(
            self.direction.abs().cmplt(Vec3::splat(MIN_DIRECTION)),
            Vec3::select(
                self.direction.cmpge(Vec3::ZERO),
                Vec3::splat(MIN_DIRECTION),
                Vec3::splat(-MIN_DIRECTION),
            ),
            self.direction,
        );
        let inv = dir.recip();
        let t_a = (Vec3::splat(-HALF_EXTENT) - self.origin) * inv;
        let t_b = (Vec3::splat(HALF_EXTENT) - self.origin) * inv;
        let t_min = t_a.min(t_b);
        let t_max = t_a.max(t_b);

        let t_enter = t_min.max_element().max(0.0);
        let t_exit = t_max.min_element();

        if t_enter > t_exit || !t_exit.is_finite() {
            None
        } else {
            Some((t_enter, t_exit))
        }
    }
}

/// Whether a local-space point lies in the unit cube, with a small tolerance
/// for points computed on its faces.
#[must_use]
pub fn inside_unit_cube(p: Vec3) -> bool {
    p.abs().max_element() <= HALF_EXTENT + 1e-4
}
