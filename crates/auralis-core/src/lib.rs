//! Audio feature extraction and audio-to-visual mapping.
//!
//! Each frame the host calls [`Visualizer::tick`], which samples the current
//! spectrum, reduces it to bass/mid/treble energies, evaluates beat onsets and
//! hands all of it to the active visualization mode. Modes mutate geometry that
//! lives in a [`Scene`]; drawing that scene is left to the host.

pub mod analyser;
pub mod bands;
pub mod beat;
pub mod color;
pub mod engine;
pub mod error;
pub mod math;
pub mod modes;
pub mod registry;
pub mod scene;
pub mod settings;
pub mod spectrum;

pub use analyser::{Analyser, FFT_SIZE};
pub use bands::{BandAnalyzer, FrequencyBands};
pub use beat::{BeatDetector, BeatEvent, SubscriptionId, BEAT_HISTORY_LEN, REFRACTORY_PERIOD};
pub use engine::{FrameSummary, Visualizer};
pub use error::{FrameError, InitError, MathError, SourceError, UnknownMode};
pub use modes::{FrameInput, ModeKind, Visualization};
pub use registry::ModeRegistry;
pub use scene::{Geometry, MeshShape, ObjectId, PointCloud, Polyline, Scene, SceneObject, Transform};
pub use settings::Settings;
pub use spectrum::{SilentSource, SpectrumFrame, SpectrumSampler, SpectrumSource, StaticSource};
