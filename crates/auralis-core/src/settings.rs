//! Runtime-tunable parameters consulted by the analysis stages and modes.

use serde::{Deserialize, Serialize};

use crate::bands::FrequencyBands;

pub const DEFAULT_BEAT_SENSITIVITY: f32 = 1.5;
pub const DEFAULT_ROTATION_SPEED: f32 = 0.01;
/// Mean magnitude (0-255) above which particle modes switch from returning
/// home to dispersing.
pub const DEFAULT_LOUDNESS_GATE: f32 = 100.0;

pub const BEAT_SENSITIVITY_RANGE: (f32, f32) = (0.5, 3.0);
pub const BOOST_RANGE: (f32, f32) = (0.1, 3.0);
pub const PARTICLE_SIZE_RANGE: (f32, f32) = (0.1, 5.0);
pub const ROTATION_SPEED_RANGE: (f32, f32) = (0.0, 0.1);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Multiplier on the rolling energy average a frame must exceed to be a beat
    pub beat_sensitivity: f32,
    pub bass_boost: f32,
    pub mid_boost: f32,
    pub treble_boost: f32,
    /// Scales every per-particle size a mode computes
    pub particle_size: f32,
    /// Base per-frame rotation increment in radians
    pub rotation_speed: f32,
    pub loudness_gate: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            beat_sensitivity: DEFAULT_BEAT_SENSITIVITY,
            bass_boost: 1.0,
            mid_boost: 1.0,
            treble_boost: 1.0,
            particle_size: 1.0,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            loudness_gate: DEFAULT_LOUDNESS_GATE,
        }
    }
}

fn clamp_to(value: f32, range: (f32, f32)) -> f32 {
    value.clamp(range.0, range.1)
}

impl Settings {
    pub fn set_beat_sensitivity(&mut self, value: f32) {
        self.beat_sensitivity = clamp_to(value, BEAT_SENSITIVITY_RANGE);
    }

    pub fn set_boosts(&mut self, bass: f32, mid: f32, treble: f32) {
        self.bass_boost = clamp_to(bass, BOOST_RANGE);
        self.mid_boost = clamp_to(mid, BOOST_RANGE);
        self.treble_boost = clamp_to(treble, BOOST_RANGE);
    }

    pub fn set_particle_size(&mut self, value: f32) {
        self.particle_size = clamp_to(value, PARTICLE_SIZE_RANGE);
    }

    pub fn set_rotation_speed(&mut self, value: f32) {
        self.rotation_speed = clamp_to(value, ROTATION_SPEED_RANGE);
    }

    pub fn set_loudness_gate(&mut self, value: f32) {
        self.loudness_gate = value.clamp(0.0, 255.0);
    }

    /// Clamp every field into its allowed range. Used after deserializing.
    pub fn sanitized(mut self) -> Self {
        self.set_beat_sensitivity(self.beat_sensitivity);
        self.set_boosts(self.bass_boost, self.mid_boost, self.treble_boost);
        self.set_particle_size(self.particle_size);
        self.set_rotation_speed(self.rotation_speed);
        self.set_loudness_gate(self.loudness_gate);
        self
    }

    /// Applies the per-band boost multipliers. The result may exceed 255.
    pub fn boost(&self, bands: &FrequencyBands) -> FrequencyBands {
        FrequencyBands {
            bass: bands.bass * self.bass_boost,
            mid: bands.mid * self.mid_boost,
            treble: bands.treble * self.treble_boost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.beat_sensitivity, 1.5);
        assert_eq!(settings.loudness_gate, 100.0);
        assert_eq!(settings.rotation_speed, 0.01);
    }

    #[test]
    fn test_setters_clamp() {
        let mut settings = Settings::default();
        settings.set_beat_sensitivity(10.0);
        assert_eq!(settings.beat_sensitivity, 3.0);
        settings.set_particle_size(0.0);
        assert_eq!(settings.particle_size, 0.1);
        settings.set_boosts(0.0, 2.0, 9.0);
        assert_eq!((settings.bass_boost, settings.mid_boost, settings.treble_boost), (0.1, 2.0, 3.0));
    }

    #[test]
    fn test_boost() {
        let mut settings = Settings::default();
        settings.set_boosts(2.0, 1.0, 0.5);
        let boosted = settings.boost(&FrequencyBands {
            bass: 200.0,
            mid: 100.0,
            treble: 50.0,
        });
        assert_eq!(boosted.bass, 400.0);
        assert_eq!(boosted.mid, 100.0);
        assert_eq!(boosted.treble, 25.0);
    }
}
