//! Help overlay showing keyboard shortcuts.

use auralis_core::{ModeKind, Settings};
use nannou::prelude::*;

#[derive(Default)]
pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn draw(&self, draw: &Draw, settings: &Settings) {
        if !self.visible {
            return;
        }

        let padding = 25.0;
        let line_height = 24.0;
        let font_size = 18;

        let sensitivity = format!("Beat sensitivity ({:.1})", settings.beat_sensitivity);
        let particle_size = format!("Particle size ({:.1})", settings.particle_size);
        let rotation = format!("Rotation speed ({:.3})", settings.rotation_speed);

        let mut shortcuts: Vec<(String, String)> = vec![
            ("h".into(), "Toggle this help".into()),
            ("q".into(), "Quit".into()),
            (String::new(), String::new()),
            ("--- Visualization ---".into(), String::new()),
        ];
        for (i, kind) in ModeKind::ALL.iter().enumerate() {
            shortcuts.push(((i + 1).to_string(), kind.label().to_string()));
        }
        shortcuts.extend([
            ("Space".into(), "Next visualization".into()),
            (String::new(), String::new()),
            ("--- Tuning ---".into(), String::new()),
            ("Up/Down".into(), sensitivity),
            ("[ / ]".into(), particle_size),
            (", / .".into(), rotation),
            ("s".into(), "Save settings".into()),
            ("r".into(), "Reset settings to defaults".into()),
            (String::new(), String::new()),
            ("--- Other ---".into(), String::new()),
            ("p".into(), "Pause / resume audio".into()),
            ("b".into(), "Toggle band meters".into()),
        ]);

        let overlay_height = line_height * (shortcuts.len() as f32) + padding * 2.0;
        let overlay_width = 520.0;
        let key_col_width = 120.0;

        // Semi-transparent background
        draw.rect()
            .x_y(0.0, 0.0)
            .w_h(overlay_width, overlay_height)
            .color(rgba(0.0, 0.0, 0.0, 0.9));

        draw.rect()
            .x_y(0.0, 0.0)
            .w_h(overlay_width, overlay_height)
            .stroke(rgba(1.0, 1.0, 1.0, 0.3))
            .stroke_weight(1.0)
            .no_fill();

        let start_y = overlay_height / 2.0 - padding - line_height / 2.0;
        let left_edge = -overlay_width / 2.0 + padding;
        let desc_width = overlay_width - key_col_width - padding * 2.0 - 15.0;

        for (i, (key, desc)) in shortcuts.iter().enumerate() {
            let y = start_y - (i as f32) * line_height;

            if key.is_empty() {
                continue;
            }

            if key.starts_with("---") {
                draw.text(key)
                    .xy(pt2(0.0, y))
                    .wh(pt2(overlay_width - padding * 2.0, line_height))
                    .center_justify()
                    .color(rgba(0.5, 0.8, 1.0, 0.8))
                    .font_size(font_size);
                continue;
            }

            draw.text(key)
                .xy(pt2(left_edge + key_col_width / 2.0, y))
                .wh(pt2(key_col_width, line_height))
                .right_justify()
                .color(rgb(0.3, 0.8, 1.0))
                .font_size(font_size);

            draw.text(desc)
                .xy(pt2(left_edge + key_col_width + 15.0 + desc_width / 2.0, y))
                .wh(pt2(desc_width, line_height))
                .left_justify()
                .color(rgb(1.0, 1.0, 1.0))
                .font_size(font_size);
        }
    }
}
