//! Orbit camera.

use glam::{Mat4, Vec3};

/// A perspective camera orbiting a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Camera {
    /// Creates a camera two box-lengths in front of the origin.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 2.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect_ratio,
            near: 0.01,
            far: 100.0,
        }
    }

    /// Sets the aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Orbits the camera around the target.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let radius = (self.position - self.target).length();
        let mut theta = (self.position.x - self.target.x).atan2(self.position.z - self.target.z);
        let mut phi = ((self.position.y - self.target.y) / radius).acos();

        theta -= delta_x;
        phi = (phi - delta_y).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Moves toward (positive `delta`) or away from the target. The camera may
    /// end up inside the box.
    pub fn zoom(&mut self, delta: f32) {
        let direction = self.forward();
        let distance = (self.position - self.target).length();
        let new_distance = (distance - delta).max(0.1);
        self.position = self.target - direction * new_distance;
    }

    /// Frames the given bounding box from the front.
    pub fn look_at_box(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let size = (max - min).length();

        self.target = center;
        self.position = center + Vec3::new(0.0, 0.0, size * 1.5);
        self.near = size * 0.001;
        self.far = size * 100.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::default();
        assert_eq!(camera.target, Vec3::ZERO);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_orbit_keeps_radius() {
        let mut camera = Camera::new(1.0);
        let radius = camera.position.distance(camera.target);
        camera.orbit(0.7, -0.3);
        assert!((camera.position.distance(camera.target) - radius).abs() < 1e-4);
        assert!(camera.position.x.abs() > 0.1);
    }

    #[test]
    fn test_zoom_perspective() {
        let mut camera = Camera::new(1.0);
        camera.position = Vec3::new(0.0, 0.0, 5.0);

        let initial_distance = camera.position.distance(camera.target);
        camera.zoom(1.0);
        let new_distance = camera.position.distance(camera.target);

        assert!(new_distance < initial_distance, "zoom in should decrease distance");
    }

    #[test]
    fn test_zoom_can_enter_box() {
        let mut camera = Camera::new(1.0);
        camera.zoom(10.0);
        assert!((camera.position.distance(camera.target) - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_look_at_box() {
        let mut camera = Camera::new(1.0);
        camera.look_at_box(Vec3::splat(-0.5), Vec3::splat(0.5));
        assert_eq!(camera.target, Vec3::ZERO);
        assert!(camera.position.z > 2.0);
    }
}
