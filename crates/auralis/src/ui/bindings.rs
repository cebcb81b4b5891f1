//! Keyboard bindings and input handling.
//!
//! Centralizes all keyboard shortcuts and key mapping logic.

use auralis_core::ModeKind;
use nannou::prelude::*;

pub const SENSITIVITY_STEP: f32 = 0.1;
pub const PARTICLE_SIZE_STEP: f32 = 0.1;
pub const ROTATION_SPEED_STEP: f32 = 0.005;

/// Actions that can be triggered by key presses
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    // App-level
    Quit,
    ShowHelp,
    SaveSettings,
    ResetSettings,
    ToggleBands,
    TogglePause,

    // Visualization
    SelectMode(ModeKind),
    CycleNext,

    // Tuning, each carrying a signed step
    AdjustSensitivity(f32),
    AdjustParticleSize(f32),
    AdjustRotationSpeed(f32),
}

/// Number keys 1-5 in mode order
fn mode_for_key(key: Key) -> Option<ModeKind> {
    let idx = match key {
        Key::Key1 => 0,
        Key::Key2 => 1,
        Key::Key3 => 2,
        Key::Key4 => 3,
        Key::Key5 => 4,
        _ => return None,
    };
    ModeKind::ALL.get(idx).copied()
}

/// Parse a key into an action. With the help overlay open only closing
/// keys are honoured.
pub fn parse_key(key: Key, help_visible: bool) -> Option<Action> {
    // Global quit key
    if key == Key::Q {
        return Some(Action::Quit);
    }

    if help_visible {
        return match key {
            Key::H | Key::Escape => Some(Action::ShowHelp),
            _ => None,
        };
    }

    if let Some(kind) = mode_for_key(key) {
        return Some(Action::SelectMode(kind));
    }

    match key {
        Key::H => Some(Action::ShowHelp),
        Key::S => Some(Action::SaveSettings),
        Key::R => Some(Action::ResetSettings),
        Key::B => Some(Action::ToggleBands),
        Key::P => Some(Action::TogglePause),
        Key::Space => Some(Action::CycleNext),
        Key::Up => Some(Action::AdjustSensitivity(SENSITIVITY_STEP)),
        Key::Down => Some(Action::AdjustSensitivity(-SENSITIVITY_STEP)),
        Key::RBracket => Some(Action::AdjustParticleSize(PARTICLE_SIZE_STEP)),
        Key::LBracket => Some(Action::AdjustParticleSize(-PARTICLE_SIZE_STEP)),
        Key::Period => Some(Action::AdjustRotationSpeed(ROTATION_SPEED_STEP)),
        Key::Comma => Some(Action::AdjustRotationSpeed(-ROTATION_SPEED_STEP)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_keys_select_modes_in_order() {
        assert_eq!(parse_key(Key::Key1, false), Some(Action::SelectMode(ModeKind::Galaxy)));
        assert_eq!(
            parse_key(Key::Key5, false),
            Some(Action::SelectMode(ModeKind::SphereParticles))
        );
        assert_eq!(parse_key(Key::Key6, false), None);
    }

    #[test]
    fn test_tuning_keys_are_symmetric() {
        assert_eq!(parse_key(Key::Up, false), Some(Action::AdjustSensitivity(0.1)));
        assert_eq!(parse_key(Key::Down, false), Some(Action::AdjustSensitivity(-0.1)));
        assert_eq!(parse_key(Key::LBracket, false), Some(Action::AdjustParticleSize(-0.1)));
        assert_eq!(parse_key(Key::Period, false), Some(Action::AdjustRotationSpeed(0.005)));
    }

    #[test]
    fn test_help_swallows_other_keys() {
        assert_eq!(parse_key(Key::Space, true), None);
        assert_eq!(parse_key(Key::Escape, true), Some(Action::ShowHelp));
        assert_eq!(parse_key(Key::Q, true), Some(Action::Quit));
        assert_eq!(parse_key(Key::R, true), None);
    }

    #[test]
    fn test_reset_key() {
        assert_eq!(parse_key(Key::R, false), Some(Action::ResetSettings));
    }
}
