use thiserror::Error;

/// Numeric reductions that have no meaningful answer for their input.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum MathError {
    #[error("cannot reduce an empty sequence")]
    EmptyInput,
    #[error("degenerate range: min and max are both {0}")]
    DegenerateRange(f32),
}

/// Failures reported by a spectrum source while the animation is running.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("audio source disconnected")]
    Disconnected,
    #[error("audio stream error: {0}")]
    Stream(String),
}

/// Errors surfaced by a single frame tick. The host logs them and keeps ticking.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("spectrum sampling failed: {0}")]
    Sampling(#[from] SourceError),
}

/// Setup failures for the audio or render subsystems. Not retried automatically.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("no audio devices found")]
    NoAudioDevice,
    #[error("could not get a configuration for device {device}: {reason}")]
    DeviceConfig { device: String, reason: String },
    #[error("failed to start audio stream on {device}: {reason}")]
    StreamBuild { device: String, reason: String },
    #[error("render surface unavailable: {0}")]
    RenderSurface(String),
}

/// A mode name that does not match any visualization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown visualization mode: {0}")]
pub struct UnknownMode(pub String);
