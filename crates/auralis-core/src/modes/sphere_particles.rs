//! Pulsing icosahedron inside a shell of particles.
//!
//! The core scales and tints with the bands. The particle shell scatters
//! while the music is loud and eases back to its rest shape otherwise.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{FrameInput, ModeKind, ModeObjects, Visualization};
use crate::color::{hsl_to_rgb, rgb_from_bands};
use crate::scene::{Geometry, MeshShape, ObjectId, PointCloud, Scene, SceneObject};

const PARTICLE_COUNT: usize = 1000;
const SPHERE_RADIUS: f32 = 10.0;
const SPHERE_DETAIL: u32 = 3;
/// Particles sit between the sphere radius and this much further out
const SHELL_THICKNESS: f32 = 2.0;
/// Fraction of the remaining distance covered per frame when returning home
const RETURN_RATE: f32 = 0.05;
const DISPERSAL_STRENGTH: f32 = 20.0;
const BOB_HEIGHT: f32 = 10.0;

pub struct SphereParticles {
    objects: ModeObjects,
    rng: StdRng,
    sphere: Option<ObjectId>,
    particles: Option<ObjectId>,
    /// Rest position of each particle, fixed at creation
    origins: Vec<Vec3>,
}

impl SphereParticles {
    pub fn new(seed: u64) -> Self {
        Self {
            objects: ModeObjects::default(),
            rng: StdRng::seed_from_u64(seed),
            sphere: None,
            particles: None,
            origins: Vec::new(),
        }
    }

    pub fn sphere_id(&self) -> Option<ObjectId> {
        self.sphere
    }

    pub fn particles_id(&self) -> Option<ObjectId> {
        self.particles
    }

    pub fn origins(&self) -> &[Vec3] {
        &self.origins
    }

    fn create_particles(&mut self) -> PointCloud {
        let mut cloud = PointCloud::with_len(PARTICLE_COUNT);
        self.origins.clear();

        for i in 0..PARTICLE_COUNT {
            // uniform on the sphere
            let theta = std::f32::consts::TAU * self.rng.random::<f32>();
            let phi = (2.0 * self.rng.random::<f32>() - 1.0).acos();
            let radius = SPHERE_RADIUS + self.rng.random::<f32>() * SHELL_THICKNESS;

            let position = Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            );
            cloud.positions[i] = position;
            cloud.colors[i] = hsl_to_rgb(i as f32 / PARTICLE_COUNT as f32, 1.0, 0.5);
            self.origins.push(position);
        }
        cloud
    }
}

impl Visualization for SphereParticles {
    fn kind(&self) -> ModeKind {
        ModeKind::SphereParticles
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

        let sphere = SceneObject::new(Geometry::Mesh(MeshShape::Icosahedron {
            radius: SPHERE_RADIUS,
            detail: SPHERE_DETAIL,
        }))
        .with_color([0.0, 1.0, 1.0]);
        self.sphere = Some(self.objects.add(scene, sphere));

        let cloud = self.create_particles();
        let particles = SceneObject::new(Geometry::Points(cloud)).with_opacity(0.8);
        self.particles = Some(self.objects.add(scene, particles));

        self.objects.mark_created();
    }

    fn animate(&mut self, scene: &mut Scene, input: &FrameInput<'_>) {
        if !input.has_audio() {
            return;
        }
        let bands = input.bands;
        let settings = input.settings;

        if let Some(sphere) = self.sphere.and_then(|id| scene.get_mut(id)) {
            let scale = 1.0 + bands.bass / 255.0 * 2.0;
            sphere.transform.scale = Vec3::splat(scale);
            sphere.color = rgb_from_bands(bands.bass, bands.mid, bands.treble);
            sphere.transform.rotation.x += settings.rotation_speed;
            sphere.transform.rotation.y += settings.rotation_speed;
            sphere.transform.position.y = (input.time.sin() as f32) * (bands.bass / 255.0) * BOB_HEIGHT;
        }

        let Some(cloud) = self
            .particles
            .and_then(|id| scene.get_mut(id))
            .and_then(SceneObject::points_mut)
        else {
            return;
        };

        let loud = input.spectrum.energy() > settings.loudness_gate;
        let spectrum = input.spectrum;

        for (i, (position, origin)) in cloud.positions.iter_mut().zip(&self.origins).enumerate() {
            let influence = spectrum.influence(i);
            if loud {
                let dispersal = influence * DISPERSAL_STRENGTH;
                let jitter = Vec3::new(
                    self.rng.random::<f32>() - 0.5,
                    self.rng.random::<f32>() - 0.5,
                    self.rng.random::<f32>() - 0.5,
                );
                *position += jitter * dispersal;
            } else {
                *position += (*origin - *position) * RETURN_RATE;
            }
        }

        for (i, size) in cloud.sizes.iter_mut().enumerate() {
            *size = (1.0 + spectrum.influence(i) * 3.0) * settings.particle_size;
        }
    }

    fn destroy(&mut self, scene: &mut Scene) {
        self.objects.destroy(scene);
        self.sphere = None;
        self.particles = None;
        self.origins.clear();
    }
}
