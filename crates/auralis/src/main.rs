mod audio;
mod renderer;
mod ui;
mod utils;

use std::env;
use std::time::{Duration, Instant};

use audio::{LiveSource, SourcePipe};
use auralis_core::{InitError, ModeKind, Visualizer};
use nannou::prelude::*;
use renderer::{BeatFlash, Hud, Resolution, SceneRenderer, BACKGROUND};
use ui::bindings::{parse_key, Action};
use ui::help_overlay::HelpOverlay;
use utils::Config;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--list-devices") {
        SourcePipe::list_devices();
        return;
    }

    nannou::app(model).update(update).run();
}

struct Model {
    visualizer: Visualizer,
    /// Keeps the capture stream alive; None when audio failed to start
    source: Option<SourcePipe>,
    config: Config,
    renderer: SceneRenderer,
    hud: Hud,
    help_overlay: HelpOverlay,
    beat_flash: BeatFlash,
}

/// Mode named after `--mode`, if any.
fn mode_from_args(args: &[String]) -> Option<&str> {
    args.iter()
        .position(|a| a == "--mode" || a == "-m")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Switches to the flagged mode. Returns a notice when the name is unknown.
fn apply_mode_flag(visualizer: &mut Visualizer, name: &str) -> Option<String> {
    visualizer
        .switch_mode_by_name(name)
        .err()
        .map(|e| format!("{}, showing {}", e, visualizer.active_mode().label()))
}

fn start_audio(config: &Config) -> Result<SourcePipe, InitError> {
    let last = config
        .last_device
        .as_deref()
        .map(|name| (name, config.last_device_is_input.unwrap_or(true)));
    SourcePipe::open(last, Duration::from_secs(config.device_timeout_secs()))
}

fn model(app: &App) -> Model {
    let args: Vec<String> = env::args().collect();
    let windowed = args.iter().any(|a| a == "--windowed" || a == "-w");
    let resolution = Resolution::current(windowed);
    app.set_exit_on_escape(false);

    let mut win = app
        .new_window()
        .title("auralis")
        .view(view)
        .key_pressed(key_pressed)
        .resized(resized)
        .size(resolution.width, resolution.height)
        .min_size(400, 400);

    if resolution.fullscreen {
        win = win.fullscreen();
    }

    // no window means nothing to draw into
    let window_id = win.build().expect("failed to create window");
    let (width, height) = app
        .window(window_id)
        .map(|w| w.inner_size_points())
        .unwrap_or((resolution.width as f32, resolution.height as f32));

    let mut config = Config::load();
    let mut visualizer = Visualizer::new(config.default_mode(), config.settings());
    let mut hud = Hud::new();
    if let Some(notice) = mode_from_args(&args).and_then(|name| apply_mode_flag(&mut visualizer, name)) {
        hud.show_notification(notice);
    }

    let source = match start_audio(&config) {
        Ok(pipe) => {
            visualizer.attach_source(Box::new(LiveSource::new(pipe.buffer())));
            let device = pipe.current_device();
            if config.last_device.as_deref() != Some(device.name.as_str()) {
                config.set_device(&device.name, device.is_input);
                if let Err(e) = config.save() {
                    log::warn!("Could not remember audio device: {:#}", e);
                }
            }
            Some(pipe)
        }
        Err(e) => {
            log::error!("Audio unavailable, running without a source: {}", e);
            None
        }
    };

    let beat_flash = BeatFlash::default();
    let subscriber = beat_flash.clone();
    visualizer.subscribe_beats(move |event| subscriber.on_beat(event));

    Model {
        visualizer,
        source,
        config,
        renderer: SceneRenderer::new(width, height),
        hud,
        help_overlay: HelpOverlay::default(),
        beat_flash,
    }
}

fn update(_app: &App, model: &mut Model, _update: Update) {
    model.hud.update();

    if let Err(e) = model.visualizer.tick(Instant::now()) {
        log::warn!("Frame skipped: {}", e);
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let bounds = app.window_rect();
    let (r, g, b) = BACKGROUND;
    draw.background().color(rgb(r, g, b));

    model.renderer.draw(&draw, model.visualizer.scene());

    let flash = model.beat_flash.intensity(Instant::now());
    model.hud.draw(
        &draw,
        bounds,
        model.visualizer.bands(),
        model.visualizer.active_mode(),
        flash,
    );
    model.help_overlay.draw(&draw, model.visualizer.settings());

    if let Err(e) = draw.to_frame(app, &frame) {
        log::error!("Failed to render frame: {:?}", e);
    }
}

fn resized(_app: &App, model: &mut Model, size: Vec2) {
    model.renderer.resize(size.x, size.y);
}

fn save_settings(model: &mut Model) {
    model.config.set_settings(model.visualizer.settings());
    model.config.set_mode(model.visualizer.active_mode());
    let msg = match model.config.save() {
        Ok(()) => "Settings saved".to_string(),
        Err(e) => {
            log::error!("Could not save settings: {:#}", e);
            "Saving settings FAILED".to_string()
        }
    };
    model.hud.show_notification(msg);
}

fn show_mode(model: &mut Model, kind: ModeKind) {
    model.hud.show_notification(format!("[{}] {}", kind.index() + 1, kind.label()));
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    let Some(action) = parse_key(key, model.help_overlay.visible) else {
        return;
    };

    match action {
        Action::Quit => app.quit(),
        Action::ShowHelp => model.help_overlay.toggle(),
        Action::SaveSettings => save_settings(model),
        Action::ResetSettings => {
            model.visualizer.reset_settings();
            model.hud.show_notification("Settings reset to defaults".to_string());
        }
        Action::ToggleBands => model.hud.show_bands = !model.hud.show_bands,
        Action::TogglePause => {
            if model.source.is_none() {
                model.hud.show_notification("No audio source".to_string());
                return;
            }
            let playing = model.visualizer.toggle_playing();
            model
                .hud
                .show_notification(if playing { "Audio resumed" } else { "Audio paused" }.to_string());
        }

        Action::SelectMode(kind) => {
            if model.visualizer.switch_mode(kind) {
                show_mode(model, kind);
            }
        }
        Action::CycleNext => {
            let kind = model.visualizer.cycle_next();
            show_mode(model, kind);
        }

        Action::AdjustSensitivity(step) => {
            let settings = model.visualizer.settings_mut();
            settings.set_beat_sensitivity(settings.beat_sensitivity + step);
            let value = settings.beat_sensitivity;
            model.hud.show_notification(format!("Beat sensitivity: {:.1}", value));
        }
        Action::AdjustParticleSize(step) => {
            let settings = model.visualizer.settings_mut();
            settings.set_particle_size(settings.particle_size + step);
            let value = settings.particle_size;
            model.hud.show_notification(format!("Particle size: {:.1}", value));
        }
        Action::AdjustRotationSpeed(step) => {
            let settings = model.visualizer.settings_mut();
            settings.set_rotation_speed(settings.rotation_speed + step);
            let value = settings.rotation_speed;
            model.hud.show_notification(format!("Rotation speed: {:.3}", value));
        }
    }
}
