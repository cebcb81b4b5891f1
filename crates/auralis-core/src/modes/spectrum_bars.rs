//! A row of bars, one per resampled spectrum slot.

use glam::Vec3;

use super::{FrameInput, ModeKind, ModeObjects, Visualization};
use crate::color::hsl_to_rgb;
use crate::math::modulation;
use crate::scene::{Geometry, MeshShape, ObjectId, Scene, SceneObject, Transform};

pub const BAR_COUNT: usize = 64;
const BAR_SPACING: f32 = 3.0;
const BASELINE: f32 = -30.0;
const MIN_HEIGHT: f32 = 1.0;
const MAX_HEIGHT: f32 = 50.0;
/// Hue drift in turns per second
const HUE_DRIFT: f32 = 0.1;

#[derive(Default)]
pub struct SpectrumBars {
    objects: ModeObjects,
    bars: Vec<ObjectId>,
}

impl SpectrumBars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bar_ids(&self) -> &[ObjectId] {
        &self.bars
    }

    /// Spectrum bin shown by bar `bar` when the frame has `len` bins.
    pub fn bin_for_bar(bar: usize, len: usize) -> usize {
        let idx = modulation(bar as f32, 0.0, BAR_COUNT as f32, 0.0, len as f32).floor() as usize;
        idx.min(len.saturating_sub(1))
    }

    /// Bar height for a bin magnitude.
    pub fn height_for(magnitude: u8) -> f32 {
        modulation(magnitude as f32, 0.0, 255.0, MIN_HEIGHT, MAX_HEIGHT)
    }
}

impl Visualization for SpectrumBars {
    fn kind(&self) -> ModeKind {
        ModeKind::SpectrumBars
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
        self.bars.clear();

        for i in 0..BAR_COUNT {
            let x = (i as f32 - BAR_COUNT as f32 / 2.0) * BAR_SPACING;
            let bar = SceneObject::new(Geometry::Mesh(MeshShape::Cuboid {
                size: Vec3::new(2.0, 1.0, 2.0),
            }))
            .with_transform(Transform::at(Vec3::new(x, BASELINE, 0.0)))
            .with_color(hsl_to_rgb(i as f32 / BAR_COUNT as f32, 1.0, 0.5))
            .with_opacity(0.8);
            let id = self.objects.add(scene, bar);
            self.bars.push(id);
        }

        self.objects.mark_created();
    }

    fn animate(&mut self, scene: &mut Scene, input: &FrameInput<'_>) {
        if !input.has_audio() {
            return;
        }
        let bins = input.spectrum.as_slice();
        let time = input.time as f32;

        for (i, &id) in self.bars.iter().enumerate() {
            let Some(bar) = scene.get_mut(id) else {
                continue;
            };
            let height = Self::height_for(bins[Self::bin_for_bar(i, bins.len())]);

            bar.transform.scale.y = height;
            // keep the bottom edge on the baseline
            bar.transform.position.y = BASELINE + height / 2.0;
            bar.transform.rotation.y += input.settings.rotation_speed;

            let hue = (i as f32 / BAR_COUNT as f32 + time * HUE_DRIFT) % 1.0;
            bar.color = hsl_to_rgb(hue, 1.0, 0.5);
        }
    }

    fn destroy(&mut self, scene: &mut Scene) {
        self.objects.destroy(scene);
        self.bars.clear();
    }
}
