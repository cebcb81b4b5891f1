//! Spectrum source backed by the capture ring buffer.

use auralis_core::{Analyser, SourceError, SpectrumSource};

use super::SampleBuffer;

pub struct LiveSource {
    buffer: SampleBuffer,
    analyser: Analyser,
    scratch: Vec<f32>,
    playing: bool,
}

impl LiveSource {
    pub fn new(buffer: SampleBuffer) -> Self {
        let analyser = Analyser::new();
        Self {
            buffer,
            scratch: Vec::with_capacity(analyser.fft_size()),
            analyser,
            playing: true,
        }
    }
}

impl SpectrumSource for LiveSource {
    fn bin_count(&self) -> usize {
        self.analyser.bin_count()
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn set_playing(&mut self, playing: bool) {
        if !playing {
            self.analyser.reset();
        }
        self.playing = playing;
    }

    fn fill_spectrum(&mut self, out: &mut [u8]) -> Result<(), SourceError> {
        if self.buffer.take_failure() {
            self.analyser.reset();
            return Err(SourceError::Stream("capture callback reported an error".to_string()));
        }
        self.buffer
            .snapshot(&mut self.scratch)
            .ok_or(SourceError::Disconnected)?;
        self.analyser.process(&self.scratch, out);
        Ok(())
    }
}
