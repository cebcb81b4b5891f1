//! Visualization modes.
//!
//! Every mode implements [`Visualization`]: it attaches its geometry to the
//! [`Scene`] once in `create`, mutates it in place in `animate`, and toggles
//! visibility in `show`/`hide` without releasing any buffers.

mod galaxy;
mod spectrum_bars;
mod sphere_particles;
mod tunnel;
mod waveform;

pub use galaxy::Galaxy;
pub use spectrum_bars::SpectrumBars;
pub use sphere_particles::SphereParticles;
pub use tunnel::Tunnel;
pub use waveform::Waveform;

use std::fmt;
use std::str::FromStr;

use crate::bands::FrequencyBands;
use crate::beat::BeatEvent;
use crate::error::UnknownMode;
use crate::scene::{ObjectId, Scene, SceneObject};
use crate::settings::Settings;
use crate::spectrum::SpectrumFrame;

/// Identifies one of the available visualizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Galaxy,
    SpectrumBars,
    Tunnel,
    Waveform,
    SphereParticles,
}

impl ModeKind {
    pub const ALL: [ModeKind; 5] = [
        ModeKind::Galaxy,
        ModeKind::SpectrumBars,
        ModeKind::Tunnel,
        ModeKind::Waveform,
        ModeKind::SphereParticles,
    ];

    /// Stable identifier used in config files.
    pub fn name(self) -> &'static str {
        match self {
            ModeKind::Galaxy => "galaxy",
            ModeKind::SpectrumBars => "spectrum_bars",
            ModeKind::Tunnel => "tunnel",
            ModeKind::Waveform => "waveform",
            ModeKind::SphereParticles => "sphere_particles",
        }
    }

    /// Human readable name for the HUD.
    pub fn label(self) -> &'static str {
        match self {
            ModeKind::Galaxy => "Galaxy",
            ModeKind::SpectrumBars => "Spectrum Bars",
            ModeKind::Tunnel => "Tunnel",
            ModeKind::Waveform => "Waveform",
            ModeKind::SphereParticles => "Sphere Particles",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&k| k == self).unwrap_or(0)
    }

    /// Builds the mode. `seed` fixes its random particle placement.
    pub fn build(self, seed: u64) -> Box<dyn Visualization> {
        match self {
            ModeKind::Galaxy => Box::new(Galaxy::new(seed)),
            ModeKind::SpectrumBars => Box::new(SpectrumBars::new()),
            ModeKind::Tunnel => Box::new(Tunnel::new()),
            ModeKind::Waveform => Box::new(Waveform::new()),
            ModeKind::SphereParticles => Box::new(SphereParticles::new(seed)),
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModeKind {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(|c: char| c == '-' || c == ' ', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// Everything a mode may read while animating one frame.
pub struct FrameInput<'a> {
    pub spectrum: &'a SpectrumFrame,
    /// Band energies with the per-band boosts already applied
    pub bands: &'a FrequencyBands,
    pub beat: Option<&'a BeatEvent>,
    /// Seconds since the visualizer started
    pub time: f64,
    pub settings: &'a Settings,
}

impl FrameInput<'_> {
    /// False during startup, before any audio source produced a frame.
    pub fn has_audio(&self) -> bool {
        !self.spectrum.is_empty()
    }
}

/// Book-keeping shared by all modes: which scene objects belong to the mode
/// and whether they are currently shown.
#[derive(Debug, Default)]
pub struct ModeObjects {
    ids: Vec<ObjectId>,
    visible: bool,
    created: bool,
}

impl ModeObjects {
    /// Attach `object` to the scene. It starts with the mode's visibility.
    pub fn add(&mut self, scene: &mut Scene, mut object: SceneObject) -> ObjectId {
        object.visible = self.visible;
        let id = scene.add(object);
        self.ids.push(id);
        id
    }

    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    pub fn mark_created(&mut self) {
        self.created = true;
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, scene: &mut Scene, visible: bool) {
        self.visible = visible;
        for &id in &self.ids {
            scene.set_visible(id, visible);
        }
    }

    /// Detach every object from the scene.
    pub fn destroy(&mut self, scene: &mut Scene) {
        for id in self.ids.drain(..) {
            scene.remove(id);
        }
        self.created = false;
    }
}

pub trait Visualization {
    fn kind(&self) -> ModeKind;

    fn objects(&self) -> &ModeObjects;

    fn objects_mut(&mut self) -> &mut ModeObjects;

    /// Allocate geometry and attach it to `scene`. Calling it again on a
    /// created mode does nothing.
    fn create(&mut self, scene: &mut Scene);

    /// Mutate this mode's geometry for one frame. A no-op when the input
    /// carries no audio yet.
    fn animate(&mut self, scene: &mut Scene, input: &FrameInput<'_>);

    fn show(&mut self, scene: &mut Scene) {
        self.objects_mut().set_visible(scene, true);
    }

    fn hide(&mut self, scene: &mut Scene) {
        self.objects_mut().set_visible(scene, false);
    }

    fn is_visible(&self) -> bool {
        self.objects().is_visible()
    }

    fn is_created(&self) -> bool {
        self.objects().is_created()
    }

    /// Release the geometry. The mode can be created again afterwards.
    fn destroy(&mut self, scene: &mut Scene) {
        self.objects_mut().destroy(scene);
    }
}
