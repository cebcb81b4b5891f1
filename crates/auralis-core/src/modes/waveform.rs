//! Oscilloscope-style line drawn from the spectrum bins.

use glam::Vec3;

use super::{FrameInput, ModeKind, ModeObjects, Visualization};
use crate::color::hsl_to_rgb;
use crate::math::modulation;
use crate::scene::{Geometry, ObjectId, Polyline, Scene, SceneObject};

pub const POINT_COUNT: usize = 512;
const POINT_SPACING: f32 = 0.5;
pub const AMPLITUDE: f32 = 20.0;

#[derive(Default)]
pub struct Waveform {
    objects: ModeObjects,
    line: Option<ObjectId>,
}

impl Waveform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_id(&self) -> Option<ObjectId> {
        self.line
    }
}

impl Visualization for Waveform {
    fn kind(&self) -> ModeKind {
        ModeKind::Waveform
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

        let positions = (0..POINT_COUNT)
            .map(|i| Vec3::new((i as f32 - POINT_COUNT as f32 / 2.0) * POINT_SPACING, 0.0, 0.0))
            .collect();
        let line = SceneObject::new(Geometry::Line(Polyline { positions }))
            .with_color([0.0, 1.0, 0.0])
            .with_opacity(0.8);
        self.line = Some(self.objects.add(scene, line));

        self.objects.mark_created();
    }

    fn animate(&mut self, scene: &mut Scene, input: &FrameInput<'_>) {
        if !input.has_audio() {
            return;
        }
        let Some(object) = self.line.and_then(|id| scene.get_mut(id)) else {
            return;
        };
        let bins = input.spectrum.as_slice();
        let len = bins.len();

        object.color = hsl_to_rgb((input.time as f32 * 0.1) % 1.0, 1.0, 0.5);
        object.transform.rotation.z += input.settings.rotation_speed * 0.5;

        let Some(line) = object.line_mut() else {
            return;
        };
        for (i, position) in line.positions.iter_mut().enumerate() {
            let idx = modulation(i as f32, 0.0, POINT_COUNT as f32, 0.0, len as f32).floor() as usize;
            let value = bins[idx.min(len - 1)];
            position.y = modulation(value as f32, 0.0, 255.0, -AMPLITUDE, AMPLITUDE);
        }
    }

    fn destroy(&mut self, scene: &mut Scene) {
        self.objects.destroy(scene);
        self.line = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::FrequencyBands;
    use crate::modes::test_support::frame_input;
    use crate::settings::Settings;
    use crate::spectrum::SpectrumFrame;

    #[test]
    fn test_line_tracks_bins() {
        let mut scene = Scene::new();
        let mut waveform = Waveform::new();
        waveform.create(&mut scene);
        waveform.show(&mut scene);

        let mut bins = vec![0u8; 256];
        bins[128..].fill(255);
        let spectrum = SpectrumFrame::from_bins(bins);
        let settings = Settings::default();
        let bands = FrequencyBands::default();
        waveform.animate(&mut scene, &frame_input(&spectrum, &bands, &settings, 0.0));

        let line = scene.get(waveform.line_id().unwrap()).and_then(SceneObject::line).unwrap();
        assert_eq!(line.positions.len(), POINT_COUNT);
        assert_eq!(line.positions[0].y, -AMPLITUDE);
        assert_eq!(line.positions[POINT_COUNT - 1].y, AMPLITUDE);
        assert_eq!(line.positions[0].x, -128.0);
    }

    #[test]
    fn test_single_bin_frame() {
        let mut scene = Scene::new();
        let mut waveform = Waveform::new();
        waveform.create(&mut scene);

        let spectrum = SpectrumFrame::from_bins(vec![255]);
        let settings = Settings::default();
        let bands = FrequencyBands::default();
        waveform.animate(&mut scene, &frame_input(&spectrum, &bands, &settings, 0.0));

        let line = scene.get(waveform.line_id().unwrap()).and_then(SceneObject::line).unwrap();
        assert!(line.positions.iter().all(|p| p.y == AMPLITUDE));
    }
}
