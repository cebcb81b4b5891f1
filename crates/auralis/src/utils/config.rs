//! Configuration file management.
//!
//! Handles loading and saving user preferences to `~/.auralis.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use auralis_core::{ModeKind, Settings};
use serde::{Deserialize, Serialize};

const DEFAULT_DEVICE_TIMEOUT_SECS: u64 = 3;
const DEFAULT_MODE: ModeKind = ModeKind::Galaxy;

const CONFIG_TEMPLATE: &str = r#"# auralis configuration file

# Visualization shown at startup (default: "galaxy")
# One of: galaxy, spectrum_bars, tunnel, waveform, sphere_particles
# default_mode = "galaxy"

# Timeout in seconds when opening an audio device (default: 3)
# device_timeout_secs = 3

# Last selected audio device (auto-saved)
# last_device = "Device Name"
# last_device_is_input = true

# =============================================================================
# Audio response
# =============================================================================

# beat_sensitivity = 1.5    # Energy must exceed average * this (0.5 - 3.0)
# bass_boost = 1.0          # Per-band multipliers (0.1 - 3.0)
# mid_boost = 1.0
# treble_boost = 1.0
# loudness_gate = 100       # Mean magnitude (0 - 255) where particles start to scatter

# =============================================================================
# Visual
# =============================================================================

# particle_size = 1.0       # 0.1 - 5.0
# rotation_speed = 0.01     # Radians per frame (0.0 - 0.1)
"#;

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
    pub default_mode: Option<String>,
    pub last_device: Option<String>,
    pub last_device_is_input: Option<bool>,
    pub device_timeout_secs: Option<u64>,

    pub beat_sensitivity: Option<f32>,
    pub bass_boost: Option<f32>,
    pub mid_boost: Option<f32>,
    pub treble_boost: Option<f32>,
    pub loudness_gate: Option<f32>,
    pub particle_size: Option<f32>,
    pub rotation_speed: Option<f32>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".auralis.toml"))
    }

    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Reads `path`, writing the commented template first if it is missing.
    /// A file that cannot be read or parsed yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            match fs::write(path, CONFIG_TEMPLATE) {
                Ok(()) => log::info!("Created config template at {:?}", path),
                Err(e) => log::warn!("Could not write config template {:?}: {}", path, e),
            }
        }

        let content = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Could not read config {:?}: {}", path, e);
                return Self::default();
            }
        };
        Self::parse(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring config {:?}: {}", path, e);
            Self::default()
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::path().context("no home directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string(self).context("serializing config")?;
        fs::write(path, content).with_context(|| format!("writing {:?}", path))?;
        log::info!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn device_timeout_secs(&self) -> u64 {
        self.device_timeout_secs.unwrap_or(DEFAULT_DEVICE_TIMEOUT_SECS)
    }

    /// Startup mode. Unknown names fall back to the default with a warning.
    pub fn default_mode(&self) -> ModeKind {
        let Some(name) = self.default_mode.as_deref() else {
            return DEFAULT_MODE;
        };
        name.parse().unwrap_or_else(|e| {
            log::warn!("{}, using {}", e, DEFAULT_MODE);
            DEFAULT_MODE
        })
    }

    /// Settings with every unset field at its default, clamped into range.
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            beat_sensitivity: self.beat_sensitivity.unwrap_or(defaults.beat_sensitivity),
            bass_boost: self.bass_boost.unwrap_or(defaults.bass_boost),
            mid_boost: self.mid_boost.unwrap_or(defaults.mid_boost),
            treble_boost: self.treble_boost.unwrap_or(defaults.treble_boost),
            particle_size: self.particle_size.unwrap_or(defaults.particle_size),
            rotation_speed: self.rotation_speed.unwrap_or(defaults.rotation_speed),
            loudness_gate: self.loudness_gate.unwrap_or(defaults.loudness_gate),
        }
        .sanitized()
    }

    pub fn set_settings(&mut self, settings: &Settings) {
        self.beat_sensitivity = Some(settings.beat_sensitivity);
        self.bass_boost = Some(settings.bass_boost);
        self.mid_boost = Some(settings.mid_boost);
        self.treble_boost = Some(settings.treble_boost);
        self.particle_size = Some(settings.particle_size);
        self.rotation_speed = Some(settings.rotation_speed);
        self.loudness_gate = Some(settings.loudness_gate);
    }

    pub fn set_mode(&mut self, mode: ModeKind) {
        self.default_mode = Some(mode.name().to_string());
    }

    pub fn set_device(&mut self, name: &str, is_input: bool) {
        self.last_device = Some(name.to_string());
        self.last_device_is_input = Some(is_input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::parse(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.settings(), Settings::default());
        assert_eq!(config.default_mode(), ModeKind::Galaxy);
        assert_eq!(config.device_timeout_secs(), DEFAULT_DEVICE_TIMEOUT_SECS);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse("default_mode = \"tunnel\"\nbass_boost = 2.0\nparticle_size = 50.0\n").unwrap();
        assert_eq!(config.default_mode(), ModeKind::Tunnel);
        let settings = config.settings();
        assert_eq!(settings.bass_boost, 2.0);
        assert_eq!(settings.mid_boost, 1.0);
        // clamped
        assert_eq!(settings.particle_size, 5.0);
    }

    #[test]
    fn test_unknown_mode_falls_back() {
        let config = Config::parse("default_mode = \"lasers\"").unwrap();
        assert_eq!(config.default_mode(), ModeKind::Galaxy);
    }

    #[test]
    fn test_settings_round_trip_through_toml() {
        let mut settings = Settings::default();
        settings.set_beat_sensitivity(2.5);
        settings.set_rotation_speed(0.05);

        let mut config = Config::default();
        config.set_settings(&settings);
        config.set_mode(ModeKind::Waveform);
        config.set_device("pulse", true);

        let text = toml::to_string(&config).unwrap();
        let back = Config::parse(&text).unwrap();
        assert_eq!(back.settings(), settings);
        assert_eq!(back.default_mode(), ModeKind::Waveform);
        assert_eq!(back.last_device.as_deref(), Some("pulse"));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("auralis-config-test-{}.toml", std::process::id()));
        let _ = fs::remove_file(&path);

        // first load writes the template
        let config = Config::load_from(&path);
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let mut config = config;
        config.loudness_gate = Some(80.0);
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).settings().loudness_gate, 80.0);

        fs::write(&path, "beat_sensitivity = [not toml").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        let _ = fs::remove_file(&path);
    }
}
