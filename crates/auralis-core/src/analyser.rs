//! Frequency analysis primitive.
//!
//! Turns a block of time-domain samples into byte magnitudes the way a
//! browser analyser node does: Blackman window, FFT, temporal smoothing, then
//! a decibel range mapped onto 0-255.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Default FFT size; yields 512 magnitude bins.
pub const FFT_SIZE: usize = 1024;

const SMOOTHING_TIME_CONSTANT: f32 = 0.8;
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

pub struct Analyser {
    // FFT resources (pre-allocated)
    fft: Arc<dyn Fft<f32>>,
    fft_buffer: Vec<Complex<f32>>,
    window: Vec<f32>,

    /// Smoothed linear magnitude per bin, carried across frames
    smoothed: Vec<f32>,
    smoothing: f32,
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyser {
    pub fn new() -> Self {
        Self::with_fft_size(FFT_SIZE)
    }

    /// `fft_size` is rounded up to the next power of two (minimum 32).
    pub fn with_fft_size(fft_size: usize) -> Self {
        let fft_size = fft_size.max(32).next_power_of_two();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Blackman window
        let n = fft_size as f32;
        let window = (0..fft_size)
            .map(|i| {
                let x = std::f32::consts::TAU * i as f32 / n;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        Self {
            fft,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            window,
            smoothed: vec![0.0; fft_size / 2],
            smoothing: SMOOTHING_TIME_CONSTANT,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_buffer.len()
    }

    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Weight of the previous frame in the smoothed magnitude, `0..=1`.
    pub fn set_smoothing(&mut self, time_constant: f32) {
        self.smoothing = time_constant.clamp(0.0, 1.0);
    }

    /// Forget smoothing history (e.g. after switching devices).
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }

    /// Analyse the most recent `fft_size` samples and write one byte per bin
    /// into `out`. Short input is zero padded; extra `out` entries are zeroed.
    pub fn process(&mut self, samples: &[f32], out: &mut [u8]) {
        let fft_size = self.fft_size();
        let start = samples.len().saturating_sub(fft_size);
        let recent = &samples[start..];

        for (i, slot) in self.fft_buffer.iter_mut().enumerate() {
            let sample = recent.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let scale = 255.0 / (MAX_DECIBELS - MIN_DECIBELS);
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[k].norm() / fft_size as f32;
            *smoothed = self.smoothing * *smoothed + (1.0 - self.smoothing) * magnitude;

            if let Some(byte) = out.get_mut(k) {
                *byte = if *smoothed > 0.0 {
                    let db = 20.0 * smoothed.log10();
                    (scale * (db - MIN_DECIBELS)).clamp(0.0, 255.0) as u8
                } else {
                    0
                };
            }
        }

        if out.len() > self.smoothed.len() {
            out[self.smoothed.len()..].iter_mut().for_each(|b| *b = 0);
        }
    }
}
