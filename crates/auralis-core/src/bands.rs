//! Bass/mid/treble decomposition of a spectrum frame.

use serde::{Deserialize, Serialize};

use crate::math;
use crate::spectrum::SpectrumFrame;

/// Fraction of the spectrum, from the bottom, covered by the bass band.
pub const BASS_END: f32 = 0.1;
/// Fraction of the spectrum, from the bottom, at which treble begins.
pub const MID_END: f32 = 0.4;

/// Mean magnitude (0-255 scale) in each of the three bands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBands {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
}

impl FrequencyBands {
    /// Each band scaled to `0..=1` (may exceed 1 once boosted).
    pub fn normalized(&self) -> [f32; 3] {
        [self.bass / 255.0, self.mid / 255.0, self.treble / 255.0]
    }
}

/// Splits a frame at fixed cut points: bass `[0, 10%)`, mid `[10%, 40%)`,
/// treble `[40%, 100%)`.
#[derive(Debug, Default)]
pub struct BandAnalyzer {
    bands: FrequencyBands,
}

impl BandAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index ranges `(bass_end, mid_end)` for a spectrum of `len` bins.
    pub fn cut_points(len: usize) -> (usize, usize) {
        let bass_end = (len as f32 * BASS_END).floor() as usize;
        let mid_end = (len as f32 * MID_END).floor() as usize;
        (bass_end.min(len), mid_end.clamp(bass_end, len))
    }

    /// Recompute the bands for `frame`. An empty sub-range yields 0.
    pub fn analyze(&mut self, frame: &SpectrumFrame) -> FrequencyBands {
        let bins = frame.as_slice();
        let (bass_end, mid_end) = Self::cut_points(bins.len());

        self.bands = FrequencyBands {
            bass: math::average(&bins[..bass_end]),
            mid: math::average(&bins[bass_end..mid_end]),
            treble: math::average(&bins[mid_end..]),
        };
        self.bands
    }

    /// Result of the last `analyze` call.
    pub fn bands(&self) -> &FrequencyBands {
        &self.bands
    }
}
