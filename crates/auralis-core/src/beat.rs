//! Beat onset detection over a rolling window of frame energies.
//!
//! A frame is a beat when its mean magnitude exceeds the window average times
//! the sensitivity, and the previous beat is more than the refractory period
//! in the past. Subscribers are notified synchronously on each beat.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use crate::bands::FrequencyBands;
use crate::settings::DEFAULT_BEAT_SENSITIVITY;
use crate::spectrum::SpectrumFrame;

/// Energy samples kept for the rolling average (about one second at 43 fps).
pub const BEAT_HISTORY_LEN: usize = 43;
/// Minimum spacing between two reported beats.
pub const REFRACTORY_PERIOD: Duration = Duration::from_millis(200);

/// Payload delivered to beat subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatEvent {
    /// Mean magnitude of the frame that triggered the beat (0-255 scale)
    pub energy: f32,
    pub bands: FrequencyBands,
    pub at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type BeatCallback = Box<dyn FnMut(&BeatEvent)>;

pub struct BeatDetector {
    history: VecDeque<f32>,
    last_beat: Option<Instant>,
    sensitivity: f32,
    last_event: Option<BeatEvent>,
    subscribers: Vec<(SubscriptionId, BeatCallback)>,
    next_subscription: u64,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BeatDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeatDetector")
            .field("history_len", &self.history.len())
            .field("sensitivity", &self.sensitivity)
            .field("last_beat", &self.last_beat)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl BeatDetector {
    pub fn new() -> Self {
        Self::with_sensitivity(DEFAULT_BEAT_SENSITIVITY)
    }

    pub fn with_sensitivity(sensitivity: f32) -> Self {
        Self {
            history: VecDeque::with_capacity(BEAT_HISTORY_LEN + 1),
            last_beat: None,
            sensitivity,
            last_event: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Takes effect on the next frame; history is kept.
    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Mean of the energy history, or 0 before the first frame.
    pub fn rolling_average(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    pub fn last_event(&self) -> Option<&BeatEvent> {
        self.last_event.as_ref()
    }

    /// Clear history and cooldown (e.g. after switching audio sources).
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_beat = None;
        self.last_event = None;
    }

    /// Register a callback invoked synchronously on every beat.
    pub fn subscribe(&mut self, callback: impl FnMut(&BeatEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn detect(&mut self, frame: &SpectrumFrame, bands: &FrequencyBands) -> bool {
        self.detect_at(frame, bands, Instant::now())
    }

    /// Evaluate `frame` as if it arrived at `now`.
    ///
    /// Empty frames (no audio source yet) are ignored entirely.
    pub fn detect_at(&mut self, frame: &SpectrumFrame, bands: &FrequencyBands, now: Instant) -> bool {
        if frame.is_empty() {
            return false;
        }

        let energy = frame.energy();
        self.history.push_back(energy);
        if self.history.len() > BEAT_HISTORY_LEN {
            self.history.pop_front();
        }

        let above_threshold = energy > self.rolling_average() * self.sensitivity;
        if !above_threshold {
            return false;
        }

        let cooled_down = self
            .last_beat
            .map_or(true, |last| now.saturating_duration_since(last) > REFRACTORY_PERIOD);
        if !cooled_down {
            return false;
        }

        self.last_beat = Some(now);
        let event = BeatEvent {
            energy,
            bands: *bands,
            at: now,
        };
        log::debug!("beat: energy={:.1} bass={:.1}", energy, bands.bass);
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&event);
        }
        self.last_event = Some(event);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(16);

    fn frame_of(value: u8) -> SpectrumFrame {
        SpectrumFrame::from_bins(vec![value; 64])
    }

    #[test]
    fn test_no_beat_on_constant_energy() {
        let mut detector = BeatDetector::new();
        let start = Instant::now();
        for value in [0u8, 80, 255] {
            detector.reset();
            for i in 0..200 {
                let beat = detector.detect_at(&frame_of(value), &FrequencyBands::default(), start + FRAME * i);
                assert!(!beat, "constant energy {} fired a beat at frame {}", value, i);
            }
        }
    }

    #[test]
    fn test_history_is_capped() {
        let mut detector = BeatDetector::new();
        let start = Instant::now();
        for i in 0..100 {
            detector.detect_at(&frame_of((i % 7) as u8), &FrequencyBands::default(), start + FRAME * i);
            assert!(detector.history_len() <= BEAT_HISTORY_LEN);
        }
        assert_eq!(detector.history_len(), 43);
    }

    #[test]
    fn test_spike_after_silence_fires_once() {
        let mut detector = BeatDetector::new();
        let start = Instant::now();
        let bands = FrequencyBands::default();
        for i in 0..42 {
            assert!(!detector.detect_at(&frame_of(0), &bands, start + FRAME * i));
        }

        let spike_at = start + FRAME * 42;
        assert!(detector.detect_at(&frame_of(10), &bands, spike_at));
        assert_eq!(detector.last_event().map(|e| e.energy), Some(10.0));

        // still loud 100ms later, but inside the refractory window
        assert!(!detector.detect_at(&frame_of(200), &bands, spike_at + Duration::from_millis(100)));
        assert!(!detector.detect_at(&frame_of(255), &bands, spike_at + Duration::from_millis(200)));
    }

    #[test]
    fn test_beat_allowed_after_refractory_period() {
        let mut detector = BeatDetector::new();
        let start = Instant::now();
        let bands = FrequencyBands::default();
        for i in 0..42 {
            detector.detect_at(&frame_of(0), &bands, start + FRAME * i);
        }
        let first = start + FRAME * 42;
        assert!(detector.detect_at(&frame_of(5), &bands, first));
        for i in 1..20 {
            detector.detect_at(&frame_of(0), &bands, first + FRAME * i);
        }
        assert!(detector.detect_at(&frame_of(120), &bands, first + Duration::from_millis(400)));
    }

    #[test]
    fn test_sensitivity_change_keeps_history() {
        let mut detector = BeatDetector::new();
        let start = Instant::now();
        for i in 0..10 {
            detector.detect_at(&frame_of(50), &FrequencyBands::default(), start + FRAME * i);
        }
        detector.set_sensitivity(0.5);
        assert_eq!(detector.history_len(), 10);
        assert_eq!(detector.sensitivity(), 0.5);
        // 50 > 50 * 0.5
        assert!(detector.detect_at(&frame_of(50), &FrequencyBands::default(), start + FRAME * 10));
    }

    #[test]
    fn test_empty_frame_ignored() {
        let mut detector = BeatDetector::new();
        assert!(!detector.detect(&SpectrumFrame::default(), &FrequencyBands::default()));
        assert_eq!(detector.history_len(), 0);
    }

    #[test]
    fn test_subscribers_receive_beats() {
        let mut detector = BeatDetector::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = detector.subscribe(move |event| sink.borrow_mut().push(event.energy));

        let bands = FrequencyBands {
            bass: 1.0,
            mid: 2.0,
            treble: 3.0,
        };
        let start = Instant::now();
        detector.detect_at(&frame_of(0), &bands, start);
        assert!(detector.detect_at(&frame_of(100), &bands, start + FRAME));
        assert_eq!(*seen.borrow(), vec![100.0]);
        assert_eq!(detector.last_event().map(|e| e.bands), Some(bands));

        assert!(detector.unsubscribe(id));
        assert!(!detector.unsubscribe(id));
        detector.reset();
        detector.detect_at(&frame_of(0), &bands, start + FRAME * 2);
        assert!(detector.detect_at(&frame_of(100), &bands, start + FRAME * 3));
        assert_eq!(seen.borrow().len(), 1);
    }
}
