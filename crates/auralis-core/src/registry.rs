//! Owns one instance of every visualization and tracks which is active.

use crate::error::UnknownMode;
use crate::modes::{FrameInput, ModeKind, Visualization};
use crate::scene::Scene;

/// Keeps every mode created; switching hides one and shows another so
/// returning to a mode finds its geometry exactly as it was left.
pub struct ModeRegistry {
    modes: Vec<Box<dyn Visualization>>,
    current_idx: usize,
}

impl ModeRegistry {
    /// Builds and creates all modes, showing `initial`.
    pub fn new(scene: &mut Scene, initial: ModeKind, seed: u64) -> Self {
        let mut modes: Vec<Box<dyn Visualization>> = ModeKind::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| kind.build(seed.wrapping_add(i as u64)))
            .collect();

        for mode in &mut modes {
            mode.create(scene);
            mode.hide(scene);
        }

        let current_idx = initial.index();
        modes[current_idx].show(scene);
        log::info!("Visualization: {}", initial.label());

        Self { modes, current_idx }
    }

    pub fn active(&self) -> ModeKind {
        self.modes[self.current_idx].kind()
    }

    pub fn active_mode(&self) -> &dyn Visualization {
        self.modes[self.current_idx].as_ref()
    }

    pub fn list(&self) -> impl Iterator<Item = ModeKind> + '_ {
        self.modes.iter().map(|m| m.kind())
    }

    pub fn get(&self, kind: ModeKind) -> Option<&dyn Visualization> {
        self.modes.iter().find(|m| m.kind() == kind).map(|m| m.as_ref())
    }

    /// Makes `kind` the active mode. Returns false if it already was.
    pub fn switch(&mut self, scene: &mut Scene, kind: ModeKind) -> bool {
        let Some(idx) = self.modes.iter().position(|m| m.kind() == kind) else {
            return false;
        };
        if idx == self.current_idx {
            return false;
        }

        self.modes[self.current_idx].hide(scene);
        // recreate if a host destroyed it behind our back
        self.modes[idx].create(scene);
        self.modes[idx].show(scene);
        self.current_idx = idx;
        log::info!("Visualization: {}", kind.label());
        true
    }

    /// Switches by config/CLI name. Unknown names leave the active mode alone.
    pub fn switch_by_name(&mut self, scene: &mut Scene, name: &str) -> Result<ModeKind, UnknownMode> {
        match name.parse::<ModeKind>() {
            Ok(kind) => {
                self.switch(scene, kind);
                Ok(kind)
            }
            Err(err) => {
                log::warn!("{}", err);
                Err(err)
            }
        }
    }

    pub fn cycle_next(&mut self, scene: &mut Scene) -> ModeKind {
        let next = self.modes[(self.current_idx + 1) % self.modes.len()].kind();
        self.switch(scene, next);
        next
    }

    /// Animates the active mode only. Hidden modes keep their last state.
    pub fn animate_active(&mut self, scene: &mut Scene, input: &FrameInput<'_>) {
        self.modes[self.current_idx].animate(scene, input);
    }

    /// Detaches every mode's geometry from `scene`.
    pub fn destroy_all(&mut self, scene: &mut Scene) {
        for mode in &mut self.modes {
            mode.destroy(scene);
        }
    }
}
