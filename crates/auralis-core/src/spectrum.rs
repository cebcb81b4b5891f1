//! Per-frame spectrum sampling.
//!
//! A [`SpectrumSource`] is whatever supplies magnitudes (a live analyser, a
//! fixed test spectrum). [`SpectrumSampler`] wraps one and produces exactly one
//! [`SpectrumFrame`] per render frame, reusing its buffer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::SourceError;
use crate::math;

/// Magnitudes for one frame, one `u8` per frequency bin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumFrame {
    bins: Vec<u8>,
}

impl SpectrumFrame {
    pub fn from_bins(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    pub fn zeroed(len: usize) -> Self {
        Self { bins: vec![0; len] }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True before any audio source has started.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Mean magnitude across all bins (0-255 scale).
    pub fn energy(&self) -> f32 {
        math::average(self.bins.as_slice())
    }

    /// Bin magnitude as `0..=1`, with the index wrapping around the frame.
    ///
    /// Modes with more particles than bins use this to spread the spectrum
    /// over every particle. Returns 0 for an empty frame.
    pub fn influence(&self, index: usize) -> f32 {
        if self.bins.is_empty() {
            return 0.0;
        }
        self.bins[index % self.bins.len()] as f32 / 255.0
    }

    fn resize_zeroed(&mut self, len: usize) {
        self.bins.resize(len, 0);
        self.bins.iter_mut().for_each(|b| *b = 0);
    }
}

/// Supplies the current magnitude spectrum on demand.
pub trait SpectrumSource {
    /// Number of bins this source writes per frame.
    fn bin_count(&self) -> usize;

    /// Whether playback is running. A paused source is not read.
    fn is_playing(&self) -> bool {
        true
    }

    fn set_playing(&mut self, _playing: bool) {}

    /// Writes the latest magnitudes into `out`, which has `bin_count()` entries.
    fn fill_spectrum(&mut self, out: &mut [u8]) -> Result<(), SourceError>;
}

/// A source that is always playing and always silent.
pub struct SilentSource {
    bins: usize,
}

impl SilentSource {
    pub fn new(bins: usize) -> Self {
        Self { bins }
    }
}

impl SpectrumSource for SilentSource {
    fn bin_count(&self) -> usize {
        self.bins
    }

    fn fill_spectrum(&mut self, out: &mut [u8]) -> Result<(), SourceError> {
        out.iter_mut().for_each(|b| *b = 0);
        Ok(())
    }
}

/// A source replaying a fixed spectrum that can be swapped between frames.
///
/// Clones share the same spectrum and playback flag, so a test can keep a
/// handle after moving the source into a sampler.
#[derive(Clone)]
pub struct StaticSource {
    bins: Rc<RefCell<Vec<u8>>>,
    playing: Rc<Cell<bool>>,
}

impl StaticSource {
    pub fn new(bins: Vec<u8>) -> Self {
        Self {
            bins: Rc::new(RefCell::new(bins)),
            playing: Rc::new(Cell::new(true)),
        }
    }

    /// Replaces the spectrum. The length must stay the same.
    pub fn set_bins(&self, bins: &[u8]) {
        let mut current = self.bins.borrow_mut();
        let n = current.len().min(bins.len());
        current[..n].copy_from_slice(&bins[..n]);
    }

    pub fn fill(&self, value: u8) {
        self.bins.borrow_mut().iter_mut().for_each(|b| *b = value);
    }
}

impl SpectrumSource for StaticSource {
    fn bin_count(&self) -> usize {
        self.bins.borrow().len()
    }

    fn is_playing(&self) -> bool {
        self.playing.get()
    }

    fn set_playing(&mut self, playing: bool) {
        self.playing.set(playing);
    }

    fn fill_spectrum(&mut self, out: &mut [u8]) -> Result<(), SourceError> {
        out.copy_from_slice(&self.bins.borrow());
        Ok(())
    }
}

/// Produces one spectrum frame per render frame.
pub struct SpectrumSampler {
    source: Option<Box<dyn SpectrumSource>>,
    frame: SpectrumFrame,
    sampled_frame: Option<u64>,
}

impl Default for SpectrumSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumSampler {
    /// A sampler with no audio source; it yields empty frames until one is attached.
    pub fn new() -> Self {
        Self {
            source: None,
            frame: SpectrumFrame::default(),
            sampled_frame: None,
        }
    }

    pub fn with_source(source: Box<dyn SpectrumSource>) -> Self {
        let mut sampler = Self::new();
        sampler.attach(source);
        sampler
    }

    pub fn attach(&mut self, source: Box<dyn SpectrumSource>) {
        self.source = Some(source);
        self.sampled_frame = None;
    }

    pub fn detach(&mut self) -> Option<Box<dyn SpectrumSource>> {
        self.sampled_frame = None;
        self.source.take()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.is_playing())
    }

    pub fn set_playing(&mut self, playing: bool) {
        if let Some(source) = self.source.as_mut() {
            source.set_playing(playing);
        }
    }

    /// The most recently sampled frame.
    pub fn frame(&self) -> &SpectrumFrame {
        &self.frame
    }

    /// Samples the source for `frame_id`.
    ///
    /// Calling again with the same id returns the cached frame without reading
    /// the source. With no source attached the frame is empty; with a paused
    /// source, or after a read error, it is all zeros.
    pub fn sample(&mut self, frame_id: u64) -> Result<&SpectrumFrame, SourceError> {
        if self.sampled_frame == Some(frame_id) {
            return Ok(&self.frame);
        }
        self.sampled_frame = Some(frame_id);

        let Some(source) = self.source.as_mut() else {
            self.frame.bins.clear();
            return Ok(&self.frame);
        };

        self.frame.resize_zeroed(source.bin_count());
        if !source.is_playing() {
            return Ok(&self.frame);
        }

        if let Err(e) = source.fill_spectrum(&mut self.frame.bins) {
            self.frame.resize_zeroed(self.frame.len());
            return Err(e);
        }
        Ok(&self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSource {
        reads: Rc<Cell<u32>>,
    }

    impl SpectrumSource for CountingSource {
        fn bin_count(&self) -> usize {
            4
        }

        fn fill_spectrum(&mut self, out: &mut [u8]) -> Result<(), SourceError> {
            self.reads.set(self.reads.get() + 1);
            out.copy_from_slice(&[self.reads.get() as u8; 4]);
            Ok(())
        }
    }

    struct BrokenSource;

    impl SpectrumSource for BrokenSource {
        fn bin_count(&self) -> usize {
            8
        }

        fn fill_spectrum(&mut self, out: &mut [u8]) -> Result<(), SourceError> {
            out.iter_mut().for_each(|b| *b = 200);
            Err(SourceError::Disconnected)
        }
    }

    #[test]
    fn test_no_source_gives_empty_frame() {
        let mut sampler = SpectrumSampler::new();
        let frame = sampler.sample(0).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.energy(), 0.0);
        assert_eq!(frame.influence(3), 0.0);
    }

    #[test]
    fn test_same_frame_is_cached() {
        let reads = Rc::new(Cell::new(0));
        let mut sampler = SpectrumSampler::with_source(Box::new(CountingSource {
            reads: Rc::clone(&reads),
        }));

        let first = sampler.sample(7).unwrap().clone();
        let second = sampler.sample(7).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(reads.get(), 1);

        sampler.sample(8).unwrap();
        assert_eq!(reads.get(), 2);
        assert_eq!(sampler.frame().as_slice(), &[2, 2, 2, 2]);
    }

    #[test]
    fn test_paused_source_gives_zero_frame() {
        let source = StaticSource::new(vec![90; 16]);
        let mut sampler = SpectrumSampler::with_source(Box::new(source));
        assert_eq!(sampler.sample(0).unwrap().energy(), 90.0);

        sampler.set_playing(false);
        let frame = sampler.sample(1).unwrap();
        assert_eq!(frame.len(), 16);
        assert!(frame.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_read_error_zeroes_frame() {
        let mut sampler = SpectrumSampler::with_source(Box::new(BrokenSource));
        assert!(sampler.sample(0).is_err());
        assert_eq!(sampler.frame().len(), 8);
        assert_eq!(sampler.frame().energy(), 0.0);
        // cached for the rest of the frame
        assert!(sampler.sample(0).is_ok());
    }

    #[test]
    fn test_static_source_handle_is_shared() {
        let source = StaticSource::new(vec![0; 4]);
        let handle = source.clone();
        let mut sampler = SpectrumSampler::with_source(Box::new(source));
        handle.set_bins(&[1, 2, 3, 4]);
        assert_eq!(sampler.sample(0).unwrap().as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_influence_wraps() {
        let frame = SpectrumFrame::from_bins(vec![0, 255]);
        assert_eq!(frame.influence(1), 1.0);
        assert_eq!(frame.influence(2), 0.0);
        assert_eq!(frame.influence(3), 1.0);
    }
}
