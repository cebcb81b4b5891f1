//! Perspective camera for projecting the scene onto the window.

use glam::{Mat4, Vec3};

pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 50.0, 250.0);
pub const FOV_Y_DEGREES: f32 = 60.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 2000.0;

/// A world point mapped into window coordinates (origin at the centre,
/// y up), plus how many pixels one world unit spans at that depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
    pub pixels_per_unit: f32,
}

pub struct Camera {
    view: Mat4,
    focal: f32,
    width: f32,
    height: f32,
}

impl Camera {
    pub fn new(width: f32, height: f32) -> Self {
        let mut camera = Self {
            view: Mat4::look_at_rh(CAMERA_POSITION, Vec3::ZERO, Vec3::Y),
            focal: 1.0 / (FOV_Y_DEGREES.to_radians() / 2.0).tan(),
            width: 1.0,
            height: 1.0,
        };
        camera.resize(width, height);
        camera
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    /// None for points outside the near/far range.
    pub fn project(&self, world: Vec3) -> Option<Projected> {
        let view = self.view.transform_point3(world);
        let depth = -view.z;
        if !(NEAR..=FAR).contains(&depth) {
            return None;
        }

        let aspect = self.width / self.height;
        let ndc_x = self.focal * view.x / (aspect * depth);
        let ndc_y = self.focal * view.y / depth;
        Some(Projected {
            x: ndc_x * self.width / 2.0,
            y: ndc_y * self.height / 2.0,
            depth,
            pixels_per_unit: self.focal * self.height / 2.0 / depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_centre() {
        let camera = Camera::new(800.0, 600.0);
        let p = camera.project(Vec3::ZERO).unwrap();
        assert!(p.x.abs() < 1e-3 && p.y.abs() < 1e-3);
        assert!((p.depth - CAMERA_POSITION.length()).abs() < 1e-2);
    }

    #[test]
    fn test_behind_camera_is_culled() {
        let camera = Camera::new(800.0, 600.0);
        assert!(camera.project(Vec3::new(0.0, 50.0, 300.0)).is_none());
    }

    #[test]
    fn test_nearer_points_are_larger() {
        let camera = Camera::new(800.0, 600.0);
        let near = camera.project(Vec3::new(0.0, 0.0, 100.0)).unwrap();
        let far = camera.project(Vec3::new(0.0, 0.0, -100.0)).unwrap();
        assert!(near.pixels_per_unit > far.pixels_per_unit);
        // +x stays to the right
        assert!(camera.project(Vec3::new(10.0, 0.0, 0.0)).unwrap().x > 0.0);
    }
}
