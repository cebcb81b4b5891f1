//! Per-frame pipeline: sample, split into bands, detect beats, animate.

use std::time::Instant;

use crate::bands::{BandAnalyzer, FrequencyBands};
use crate::beat::{BeatDetector, BeatEvent, SubscriptionId};
use crate::error::{FrameError, UnknownMode};
use crate::modes::{FrameInput, ModeKind};
use crate::registry::ModeRegistry;
use crate::scene::Scene;
use crate::settings::Settings;
use crate::spectrum::{SpectrumFrame, SpectrumSampler, SpectrumSource};

const DEFAULT_SEED: u64 = 0x5eed;

/// What happened during one [`Visualizer::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSummary {
    pub frame_id: u64,
    /// Bands before the per-band boosts
    pub bands: FrequencyBands,
    pub energy: f32,
    pub beat: bool,
    pub mode: ModeKind,
}

pub struct Visualizer {
    sampler: SpectrumSampler,
    analyzer: BandAnalyzer,
    detector: BeatDetector,
    registry: ModeRegistry,
    scene: Scene,
    settings: Settings,
    frame_id: u64,
    started: Option<Instant>,
}

impl Visualizer {
    pub fn new(initial: ModeKind, settings: Settings) -> Self {
        Self::with_seed(initial, settings, DEFAULT_SEED)
    }

    /// Same as [`Visualizer::new`] with a fixed seed for particle placement.
    pub fn with_seed(initial: ModeKind, settings: Settings, seed: u64) -> Self {
        let settings = settings.sanitized();
        let mut scene = Scene::new();
        let registry = ModeRegistry::new(&mut scene, initial, seed);

        Self {
            sampler: SpectrumSampler::new(),
            analyzer: BandAnalyzer::new(),
            detector: BeatDetector::with_sensitivity(settings.beat_sensitivity),
            registry,
            scene,
            settings,
            frame_id: 0,
            started: None,
        }
    }

    /// Replaces the audio source. Beat history restarts with the new source.
    pub fn attach_source(&mut self, source: Box<dyn SpectrumSource>) {
        self.sampler.attach(source);
        self.detector.reset();
    }

    pub fn detach_source(&mut self) -> Option<Box<dyn SpectrumSource>> {
        self.detector.reset();
        self.sampler.detach()
    }

    pub fn has_source(&self) -> bool {
        self.sampler.has_source()
    }

    pub fn is_playing(&self) -> bool {
        self.sampler.is_playing()
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.sampler.set_playing(playing);
    }

    pub fn toggle_playing(&mut self) -> bool {
        let playing = !self.is_playing();
        self.set_playing(playing);
        playing
    }

    pub fn switch_mode(&mut self, kind: ModeKind) -> bool {
        self.registry.switch(&mut self.scene, kind)
    }

    pub fn switch_mode_by_name(&mut self, name: &str) -> Result<ModeKind, UnknownMode> {
        self.registry.switch_by_name(&mut self.scene, name)
    }

    pub fn cycle_next(&mut self) -> ModeKind {
        self.registry.cycle_next(&mut self.scene)
    }

    pub fn active_mode(&self) -> ModeKind {
        self.registry.active()
    }

    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Changes apply from the next tick.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Restores every tunable to its default.
    pub fn reset_settings(&mut self) {
        self.settings = Settings::default();
    }

    pub fn spectrum(&self) -> &SpectrumFrame {
        self.sampler.frame()
    }

    pub fn bands(&self) -> &FrequencyBands {
        self.analyzer.bands()
    }

    pub fn beat_detector(&self) -> &BeatDetector {
        &self.detector
    }

    pub fn subscribe_beats(&mut self, callback: impl FnMut(&BeatEvent) + 'static) -> SubscriptionId {
        self.detector.subscribe(callback)
    }

    pub fn unsubscribe_beats(&mut self, id: SubscriptionId) -> bool {
        self.detector.unsubscribe(id)
    }

    /// Runs one frame at `now`.
    ///
    /// A source error aborts the frame before any mode is animated; the
    /// next tick samples afresh.
    pub fn tick(&mut self, now: Instant) -> Result<FrameSummary, FrameError> {
        self.frame_id += 1;
        let started = *self.started.get_or_insert(now);
        let time = now.saturating_duration_since(started).as_secs_f64();

        let spectrum = self.sampler.sample(self.frame_id)?;
        let bands = self.analyzer.analyze(spectrum);

        self.detector.set_sensitivity(self.settings.beat_sensitivity);
        let beat = self.detector.detect_at(spectrum, &bands, now);

        let boosted = self.settings.boost(&bands);
        let input = FrameInput {
            spectrum,
            bands: &boosted,
            beat: if beat { self.detector.last_event() } else { None },
            time,
            settings: &self.settings,
        };
        self.registry.animate_active(&mut self.scene, &input);

        Ok(FrameSummary {
            frame_id: self.frame_id,
            bands,
            energy: spectrum.energy(),
            beat,
            mode: self.registry.active(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::StaticSource;

    #[test]
    fn test_tick_without_source_is_noop() {
        let mut viz = Visualizer::new(ModeKind::Galaxy, Settings::default());
        let before: Vec<_> = viz.scene().iter().map(|(_, o)| o.clone()).collect();

        let summary = viz.tick(Instant::now()).unwrap();
        assert!(!summary.beat);
        assert_eq!(summary.energy, 0.0);
        assert_eq!(summary.bands, FrequencyBands::default());

        let after: Vec<_> = viz.scene().iter().map(|(_, o)| o.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_boost_does_not_leak_into_summary() {
        let mut settings = Settings::default();
        settings.set_boosts(2.0, 1.0, 1.0);
        let mut viz = Visualizer::new(ModeKind::SpectrumBars, settings);
        viz.attach_source(Box::new(StaticSource::new(vec![100; 64])));

        let summary = viz.tick(Instant::now()).unwrap();
        assert_eq!(summary.bands.bass, 100.0);
        assert_eq!(summary.energy, 100.0);
        assert_eq!(summary.mode, ModeKind::SpectrumBars);
    }

    #[test]
    fn test_pause_yields_zero_frame() {
        let mut viz = Visualizer::new(ModeKind::Waveform, Settings::default());
        viz.attach_source(Box::new(StaticSource::new(vec![200; 32])));
        assert!(!viz.toggle_playing());

        let summary = viz.tick(Instant::now()).unwrap();
        assert_eq!(summary.energy, 0.0);
        assert_eq!(viz.spectrum().len(), 32);
    }

    #[test]
    fn test_reset_settings_restores_defaults() {
        let mut settings = Settings::default();
        settings.set_beat_sensitivity(2.8);
        settings.set_boosts(3.0, 0.5, 2.0);
        settings.set_rotation_speed(0.08);
        let mut viz = Visualizer::new(ModeKind::Tunnel, settings);
        assert_ne!(viz.settings(), &Settings::default());

        viz.reset_settings();
        assert_eq!(viz.settings(), &Settings::default());
        assert_eq!(viz.active_mode(), ModeKind::Tunnel);
    }
}
