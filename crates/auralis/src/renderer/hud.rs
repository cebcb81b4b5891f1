//! Band meters, beat indicator and transient notifications.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use auralis_core::{BeatEvent, FrequencyBands, ModeKind};
use nannou::prelude::*;

/// How long the beat indicator stays lit after a beat
pub const FLASH_DURATION: Duration = Duration::from_millis(200);
const NOTIFICATION_FRAMES: u32 = 180; // ~3 seconds at 60fps

/// Shared timestamp of the latest beat. Clones observe the same beat, so one
/// clone can live in a detector subscription while the HUD reads another.
#[derive(Clone, Default)]
pub struct BeatFlash {
    last_beat: Rc<Cell<Option<Instant>>>,
}

impl BeatFlash {
    pub fn on_beat(&self, event: &BeatEvent) {
        self.last_beat.set(Some(event.at));
    }

    /// Remaining brightness in `0..=1`, fading out over [`FLASH_DURATION`].
    pub fn intensity(&self, now: Instant) -> f32 {
        let Some(at) = self.last_beat.get() else {
            return 0.0;
        };
        let elapsed = now.saturating_duration_since(at);
        if elapsed >= FLASH_DURATION {
            return 0.0;
        }
        1.0 - elapsed.as_secs_f32() / FLASH_DURATION.as_secs_f32()
    }
}

#[derive(Default)]
pub struct Hud {
    pub show_bands: bool,
    notification_text: Option<String>,
    notification_frames: u32,
}

impl Hud {
    pub fn new() -> Self {
        Self {
            show_bands: true,
            ..Self::default()
        }
    }

    /// Shows a notification message for 3 seconds
    pub fn show_notification(&mut self, text: String) {
        self.notification_text = Some(text);
        self.notification_frames = NOTIFICATION_FRAMES;
    }

    pub fn update(&mut self) {
        if self.notification_frames > 0 {
            self.notification_frames -= 1;
            if self.notification_frames == 0 {
                self.notification_text = None;
            }
        }
    }

    pub fn draw(&self, draw: &Draw, bounds: Rect, bands: &FrequencyBands, mode: ModeKind, flash: f32) {
        if let Some(ref text) = self.notification_text {
            let alpha = (self.notification_frames as f32 / NOTIFICATION_FRAMES as f32).min(1.0);
            draw.text(text)
                .x_y(0.0, bounds.top() - 30.0)
                .color(rgba(1.0, 1.0, 1.0, alpha))
                .font_size(24);
        }

        if !self.show_bands {
            return;
        }

        let left = bounds.left() + 20.0;
        let bottom = bounds.bottom() + 20.0;
        let meter_width = 160.0;
        let meter_height = 10.0;

        draw.text(mode.label())
            .x_y(left + meter_width / 2.0, bottom + 4.0 * 18.0)
            .w(meter_width)
            .left_justify()
            .color(rgba(1.0, 1.0, 1.0, 0.8))
            .font_size(14);

        let meters = [
            ("B", bands.bass, rgb(1.0, 0.3, 0.3)),
            ("M", bands.mid, rgb(0.3, 1.0, 0.3)),
            ("T", bands.treble, rgb(0.3, 0.5, 1.0)),
        ];
        for (row, (label, value, color)) in meters.iter().enumerate() {
            let y = bottom + (2 - row) as f32 * 18.0;
            let fill = (value / 255.0).clamp(0.0, 1.0) * meter_width;

            draw.text(label)
                .x_y(left, y)
                .color(rgba(1.0, 1.0, 1.0, 0.7))
                .font_size(12);
            draw.rect()
                .x_y(left + 14.0 + meter_width / 2.0, y)
                .w_h(meter_width, meter_height)
                .color(rgba(1.0, 1.0, 1.0, 0.1));
            if fill > 0.0 {
                draw.rect()
                    .x_y(left + 14.0 + fill / 2.0, y)
                    .w_h(fill, meter_height)
                    .color(*color);
            }
        }

        // beat indicator
        draw.ellipse()
            .x_y(left + meter_width + 36.0, bottom + 18.0)
            .radius(8.0)
            .color(rgba(1.0, 0.9, 0.2, 0.15 + 0.85 * flash));
    }
}
