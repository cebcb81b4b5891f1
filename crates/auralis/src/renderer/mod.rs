//! Draws the core [`Scene`] with nannou.

mod camera;
mod hud;

pub use hud::{BeatFlash, Hud};

use auralis_core::color::Rgb;
use auralis_core::{Geometry, MeshShape, Scene, SceneObject};
use glam::Vec3;
use nannou::prelude::*;

use camera::{Camera, Projected};

/// Background clear color, #000011
pub const BACKGROUND: (f32, f32, f32) = (0.0, 0.0, 17.0 / 255.0);

/// Resolution settings for renderers
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Resolution {
    pub fn debug() -> Self {
        Self {
            width: 1024,
            height: 640,
            fullscreen: false,
        }
    }

    pub fn release() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: true,
        }
    }

    pub fn current(windowed: bool) -> Self {
        if windowed || cfg!(debug_assertions) {
            Self::debug()
        } else {
            Self::release()
        }
    }
}

/// Unit icosahedron corners; edges join vertices whose distance is 2.
fn icosahedron() -> ([Vec3; 12], Vec<(usize, usize)>) {
    let phi = (1.0 + 5f32.sqrt()) / 2.0;
    let raw = [
        (-1.0, phi, 0.0),
        (1.0, phi, 0.0),
        (-1.0, -phi, 0.0),
        (1.0, -phi, 0.0),
        (0.0, -1.0, phi),
        (0.0, 1.0, phi),
        (0.0, -1.0, -phi),
        (0.0, 1.0, -phi),
        (phi, 0.0, -1.0),
        (phi, 0.0, 1.0),
        (-phi, 0.0, -1.0),
        (-phi, 0.0, 1.0),
    ];
    let vertices = raw.map(|(x, y, z)| Vec3::new(x, y, z));

    let mut edges = Vec::with_capacity(30);
    for a in 0..vertices.len() {
        for b in (a + 1)..vertices.len() {
            if (vertices[a].distance(vertices[b]) - 2.0).abs() < 1e-3 {
                edges.push((a, b));
            }
        }
    }
    let norm = vertices[0].length();
    (vertices.map(|v| v / norm), edges)
}

const CUBOID_EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 3), (3, 2), (2, 0),
    (4, 5), (5, 7), (7, 6), (6, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

fn cuboid_corners(size: Vec3) -> [Vec3; 8] {
    let h = size / 2.0;
    let mut corners = [Vec3::ZERO; 8];
    for (i, corner) in corners.iter_mut().enumerate() {
        *corner = Vec3::new(
            if i & 1 == 0 { -h.x } else { h.x },
            if i & 2 == 0 { -h.y } else { h.y },
            if i & 4 == 0 { -h.z } else { h.z },
        );
    }
    corners
}

fn rgba_of(color: Rgb, alpha: f32) -> Rgba {
    rgba(color[0], color[1], color[2], alpha)
}

pub struct SceneRenderer {
    camera: Camera,
    ico_vertices: [Vec3; 12],
    ico_edges: Vec<(usize, usize)>,
}

impl SceneRenderer {
    pub fn new(width: f32, height: f32) -> Self {
        let (ico_vertices, ico_edges) = icosahedron();
        Self {
            camera: Camera::new(width, height),
            ico_vertices,
            ico_edges,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    pub fn draw(&self, draw: &Draw, scene: &Scene) {
        for object in scene.visible() {
            match &object.geometry {
                Geometry::Points(cloud) => {
                    for ((position, color), size) in cloud.positions.iter().zip(&cloud.colors).zip(&cloud.sizes) {
                        let Some(p) = self.camera.project(object.transform.apply(*position)) else {
                            continue;
                        };
                        let radius = (size * p.pixels_per_unit * 0.5).clamp(0.5, 40.0);
                        draw.ellipse()
                            .x_y(p.x, p.y)
                            .radius(radius)
                            .color(rgba_of(*color, object.opacity));
                    }
                }
                Geometry::Line(line) => {
                    let points: Vec<Point2> = line
                        .positions
                        .iter()
                        .filter_map(|&v| self.camera.project(object.transform.apply(v)))
                        .map(|p| pt2(p.x, p.y))
                        .collect();
                    if points.len() > 1 {
                        draw.polyline()
                            .weight(2.0)
                            .points(points)
                            .color(rgba_of(object.color, object.opacity));
                    }
                }
                Geometry::Mesh(shape) => self.draw_mesh(draw, object, shape),
            }
        }
    }

    fn draw_mesh(&self, draw: &Draw, object: &SceneObject, shape: &MeshShape) {
        let transform = &object.transform;
        let color = rgba_of(object.color, object.opacity);

        match *shape {
            MeshShape::Sphere { radius } => {
                if let Some(p) = self.camera.project(transform.position) {
                    draw.ellipse()
                        .x_y(p.x, p.y)
                        .radius(radius * transform.scale.x * p.pixels_per_unit)
                        .color(color);
                }
            }
            // drawn as the base wireframe whatever the detail level
            MeshShape::Icosahedron { radius, .. } => {
                let projected: Vec<Option<Projected>> = self
                    .ico_vertices
                    .iter()
                    .map(|&v| self.camera.project(transform.apply(v * radius)))
                    .collect();
                self.draw_edges(draw, &projected, &self.ico_edges, color);
            }
            MeshShape::Cuboid { size } => {
                let projected: Vec<Option<Projected>> = cuboid_corners(size)
                    .iter()
                    .map(|&v| self.camera.project(transform.apply(v)))
                    .collect();
                // front face (+z) filled, everything else as edges
                if let [Some(a), Some(b), Some(c), Some(d)] =
                    [projected[4], projected[5], projected[7], projected[6]]
                {
                    draw.quad()
                        .points(pt2(a.x, a.y), pt2(b.x, b.y), pt2(c.x, c.y), pt2(d.x, d.y))
                        .color(color);
                }
                self.draw_edges(draw, &projected, &CUBOID_EDGES, color);
            }
        }
    }

    fn draw_edges(&self, draw: &Draw, projected: &[Option<Projected>], edges: &[(usize, usize)], color: Rgba) {
        for &(a, b) in edges {
            if let (Some(start), Some(end)) = (projected[a], projected[b]) {
                draw.line()
                    .start(pt2(start.x, start.y))
                    .end(pt2(end.x, end.y))
                    .weight(1.0)
                    .color(color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icosahedron_has_thirty_edges() {
        let (vertices, edges) = icosahedron();
        assert_eq!(edges.len(), 30);
        assert!(vertices.iter().all(|v| (v.length() - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_cuboid_corners_span_size() {
        let corners = cuboid_corners(Vec3::new(2.0, 1.0, 2.0));
        assert_eq!(corners[0], Vec3::new(-1.0, -0.5, -1.0));
        assert_eq!(corners[7], Vec3::new(1.0, 0.5, 1.0));
        for (a, b) in CUBOID_EDGES {
            let d = corners[a] - corners[b];
            // every edge runs along exactly one axis
            assert_eq!(d.to_array().iter().filter(|c| **c != 0.0).count(), 1);
        }
    }
}
