//! Rings of points rushing towards the camera.

use glam::Vec3;

use super::{FrameInput, ModeKind, ModeObjects, Visualization};
use crate::color::hsl_to_rgb;
use crate::scene::{Geometry, ObjectId, PointCloud, Scene, SceneObject, Transform};

pub const RING_COUNT: usize = 20;
pub const POINTS_PER_RING: usize = 50;
const RING_SPACING: f32 = 10.0;
/// Depth of the farthest ring; rings passing `NEAR_Z` go back here
pub const FAR_Z: f32 = -100.0;
pub const NEAR_Z: f32 = 50.0;
const BASE_RADIUS: f32 = 20.0;
const RADIUS_STEP: f32 = 2.0;
const RADIUS_SWING: f32 = 10.0;
const POINT_SIZE: f32 = 2.0;

struct Ring {
    id: ObjectId,
    base_radius: f32,
}

#[derive(Default)]
pub struct Tunnel {
    objects: ModeObjects,
    rings: Vec<Ring>,
}

impl Tunnel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ring_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.rings.iter().map(|r| r.id)
    }

    pub fn forward_speed(bass: f32) -> f32 {
        0.5 + bass / 255.0 * 2.0
    }
}

fn ring_points(radius: f32, color: [f32; 3]) -> PointCloud {
    let mut cloud = PointCloud::with_len(POINTS_PER_RING);
    for i in 0..POINTS_PER_RING {
        let angle = i as f32 / POINTS_PER_RING as f32 * std::f32::consts::TAU;
        cloud.positions[i] = Vec3::new(angle.cos() * radius, angle.sin() * radius, 0.0);
        cloud.colors[i] = color;
        cloud.sizes[i] = POINT_SIZE;
    }
    cloud
}

impl Visualization for Tunnel {
    fn kind(&self) -> ModeKind {
        ModeKind::Tunnel
    }

    fn objects(&self) -> &ModeObjects {
        &self.objects
    }

    fn objects_mut(&mut self) -> &mut ModeObjects {
        &mut self.objects
    }

    fn create(&mut self, scene: &mut Scene) {
        if self.objects.is_created() {
            return;
        }
        self.rings.clear();

        for ring in 0..RING_COUNT {
            let base_radius = BASE_RADIUS + ring as f32 * RADIUS_STEP;
            let color = hsl_to_rgb(ring as f32 / RING_COUNT as f32, 1.0, 0.5);
            let z = ring as f32 * RING_SPACING + FAR_Z;

            let object = SceneObject::new(Geometry::Points(ring_points(base_radius, color)))
                .with_transform(Transform::at(Vec3::new(0.0, 0.0, z)))
                .with_opacity(0.8);
            let id = self.objects.add(scene, object);
            self.rings.push(Ring { id, base_radius });
        }

        self.objects.mark_created();
    }

    fn animate(&mut self, scene: &mut Scene, input: &FrameInput<'_>) {
        if !input.has_audio() {
            return;
        }
        let speed = Self::forward_speed(input.bands.bass);
        let twist = input.settings.rotation_speed + input.bands.treble / 255.0 * 0.05;
        let spectrum = input.spectrum;

        for (ring_index, ring) in self.rings.iter().enumerate() {
            let Some(object) = scene.get_mut(ring.id) else {
                continue;
            };

            object.transform.position.z += speed;
            if object.transform.position.z > NEAR_Z {
                object.transform.position.z = FAR_Z;
            }
            object.transform.rotation.z += twist;

            let Some(cloud) = object.points_mut() else {
                continue;
            };
            for (i, (position, size)) in cloud.positions.iter_mut().zip(cloud.sizes.iter_mut()).enumerate() {
                let angle = i as f32 / POINTS_PER_RING as f32 * std::f32::consts::TAU;
                let radius = ring.base_radius + spectrum.influence(ring_index + i) * RADIUS_SWING;
                position.x = angle.cos() * radius;
                position.y = angle.sin() * radius;
                *size = POINT_SIZE * input.settings.particle_size;
            }
        }
    }

    fn destroy(&mut self, scene: &mut Scene) {
        self.objects.destroy(scene);
        self.rings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::FrequencyBands;
    use crate::modes::test_support::frame_input;
    use crate::settings::Settings;
    use crate::spectrum::SpectrumFrame;

    fn ring_z(tunnel: &Tunnel, scene: &Scene) -> Vec<f32> {
        tunnel
            .ring_ids()
            .map(|id| scene.get(id).unwrap().transform.position.z)
            .collect()
    }

    #[test]
    fn test_rings_start_spaced() {
        let mut scene = Scene::new();
        let mut tunnel = Tunnel::new();
        tunnel.create(&mut scene);
        let z = ring_z(&tunnel, &scene);
        assert_eq!(z.len(), RING_COUNT);
        assert_eq!(z[0], FAR_Z);
        assert_eq!(z[RING_COUNT - 1], 90.0);
    }

    #[test]
    fn test_rings_wrap_within_bounds() {
        let mut scene = Scene::new();
        let mut tunnel = Tunnel::new();
        tunnel.create(&mut scene);
        tunnel.show(&mut scene);

        let settings = Settings::default();
        let bands = FrequencyBands {
            bass: 255.0,
            mid: 0.0,
            treble: 0.0,
        };
        let spectrum = SpectrumFrame::from_bins(vec![128; 64]);

        let before = ring_z(&tunnel, &scene);
        tunnel.animate(&mut scene, &frame_input(&spectrum, &bands, &settings, 0.0));
        let after = ring_z(&tunnel, &scene);

        for (b, a) in before.iter().zip(&after) {
            if b + 2.5 > NEAR_Z {
                assert_eq!(*a, FAR_Z);
            } else {
                assert!((a - (b + 2.5)).abs() < 1e-4);
            }
        }

        for _ in 0..500 {
            tunnel.animate(&mut scene, &frame_input(&spectrum, &bands, &settings, 0.0));
        }
        assert!(ring_z(&tunnel, &scene).iter().all(|z| (FAR_Z..=NEAR_Z).contains(z)));
    }

    #[test]
    fn test_radius_follows_spectrum() {
        let mut scene = Scene::new();
        let mut tunnel = Tunnel::new();
        tunnel.create(&mut scene);

        let settings = Settings::default();
        let bands = FrequencyBands::default();
        let spectrum = SpectrumFrame::from_bins(vec![255; 8]);
        tunnel.animate(&mut scene, &frame_input(&spectrum, &bands, &settings, 0.0));

        let first = tunnel.ring_ids().next().unwrap();
        let cloud = scene.get(first).and_then(SceneObject::points).unwrap();
        for p in &cloud.positions {
            let r = Vec3::new(p.x, p.y, 0.0).length();
            assert!((r - (BASE_RADIUS + RADIUS_SWING)).abs() < 1e-3);
        }
    }
}
