//! Four-armed spiral galaxy around a glowing core.

use std::f32::consts::PI;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{FrameInput, ModeKind, ModeObjects, Visualization};
use crate::color::{hsl_to_rgb, Rgb};
use crate::scene::{Geometry, MeshShape, ObjectId, PointCloud, Scene, SceneObject};
use crate::settings::DEFAULT_ROTATION_SPEED;

const STAR_COUNT: usize = 2500;
const ARM_COUNT: usize = 4;
const ARM_TURNS: f32 = 3.0;
const MAX_RADIUS: f32 = 80.0;
const RADIUS_JITTER: f32 = 15.0;
const DISK_HEIGHT: f32 = 8.0;
const ARM_SPREAD: f32 = 6.0;
const CORE_RADIUS: f32 = 2.0;
/// Amplitude of the per-star wobble at full bin magnitude
const WOBBLE: f32 = 1.2;

/// Base hue per arm at the core.
const ARM_HUES: [f32; ARM_COUNT] = [0.6, 0.8, 0.1, 0.3];
/// Hue shift per unit of normalized distance towards the rim.
const ARM_HUE_SLOPES: [f32; ARM_COUNT] = [-0.2, -0.2, 0.2, -0.2];

pub struct Galaxy {
    objects: ModeObjects,
    rng: StdRng,
    stars: Option<ObjectId>,
    core: Option<ObjectId>,
    origins: Vec<Vec3>,
}

impl Galaxy {
    pub fn new(seed: u64) -> Self {
        Self {
            objects: ModeObjects::default(),
            rng: StdRng::seed_from_u64(seed),
            stars: None,
            core: None,
            origins: Vec::new(),
        }
    }

    pub fn stars_id(&self) -> Option<ObjectId> {
        self.stars
    }

    pub fn core_id(&self) -> Option<ObjectId> {
        self.core
    }

    pub fn origins(&self) -> &[Vec3] {
        &self.origins
    }

    fn create_stars(&mut self) -> PointCloud {
        let mut cloud = PointCloud::with_len(STAR_COUNT);
        self.origins.clear();

        for i in 0..STAR_COUNT {
            let arm = i % ARM_COUNT;
            let progress = i as f32 / STAR_COUNT as f32;
            let angle = arm as f32 * (2.0 * PI / ARM_COUNT as f32) + progress * ARM_TURNS * 2.0 * PI;
            let radius = progress * MAX_RADIUS + self.rng.random::<f32>() * RADIUS_JITTER;

            let height = (self.rng.random::<f32>() - 0.5) * DISK_HEIGHT;
            // jitter along the arm ray keeps stars on their arm
            let offset = (self.rng.random::<f32>() - 0.5) * ARM_SPREAD;

            let position = Vec3::new(
                angle.cos() * (radius + offset),
                height,
                angle.sin() * (radius + offset),
            );

            cloud.positions[i] = position;
            cloud.colors[i] = arm_color(arm, radius / MAX_RADIUS);
            cloud.sizes[i] = self.rng.random::<f32>() * 2.0 + 0.3;
            self.origins.push(position);
        }
        cloud
    }
}

fn arm_color(arm: usize, distance: f32) -> Rgb {
    let arm = arm % ARM_COUNT;
    let hue = ARM_HUES[arm] + ARM_HUE_SLOPES[arm] * distance;
    hsl_to_rgb(hue, 1.0, (0.5 + 0.5 * distance).min(1.0))
}

impl Visualization for Galaxy {
    fn kind(&self) -> ModeKind {
        ModeKind::Galaxy
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

        let cloud = self.create_stars();
        let stars = SceneObject::new(Geometry::Points(cloud)).with_opacity(0.9);
        self.stars = Some(self.objects.add(scene, stars));

        let core = SceneObject::new(Geometry::Mesh(MeshShape::Sphere {
            radius: CORE_RADIUS,
        }))
        .with_color([1.0, 0.667, 0.0])
        .with_opacity(0.9);
        self.core = Some(self.objects.add(scene, core));

        self.objects.mark_created();
    }

    fn animate(&mut self, scene: &mut Scene, input: &FrameInput<'_>) {
        if !input.has_audio() {
            return;
        }
        let [bass, mid, treble] = input.bands.normalized();
        let settings = input.settings;

        let speed_scale = settings.rotation_speed / DEFAULT_ROTATION_SPEED;
        let spin = (0.001 + bass * 0.008) * speed_scale;

        if let Some(stars) = self.stars.and_then(|id| scene.get_mut(id)) {
            stars.transform.rotation.y += spin;
        }

        if let Some(core) = self.core.and_then(|id| scene.get_mut(id)) {
            core.transform.rotation.y -= spin * 1.5;
            core.transform.scale = Vec3::splat(1.0 + bass * 1.5);
            core.color = [
                (0.8 + treble * 0.2).min(1.0),
                (0.4 + mid * 0.6).min(1.0),
                (0.1 + bass * 0.4).min(1.0),
            ];
        }

        let Some(cloud) = self
            .stars
            .and_then(|id| scene.get_mut(id))
            .and_then(SceneObject::points_mut)
        else {
            return;
        };

        let t = input.time as f32 * 0.8;
        let spectrum = input.spectrum;

        // positions are recomputed from the origins every frame so stars never drift
        for (i, (position, origin)) in cloud.positions.iter_mut().zip(&self.origins).enumerate() {
            let influence = spectrum.influence(i);
            let phase = t + i as f32 * 0.008;
            let wobble = Vec3::new(phase.sin(), phase.cos(), (t * 0.4 + i as f32 * 0.008).sin());
            *position = *origin + wobble * influence * WOBBLE;
        }

        for (i, size) in cloud.sizes.iter_mut().enumerate() {
            *size = (0.3 + spectrum.influence(i) * 2.5) * settings.particle_size;
        }
    }

    fn destroy(&mut self, scene: &mut Scene) {
        self.objects.destroy(scene);
        self.stars = None;
        self.core = None;
        self.origins.clear();
    }
}
