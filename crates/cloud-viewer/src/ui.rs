//! Heads-up overlay: error banner, load status and the interaction hint.

use egui::{Align2, Color32, RichText};

pub const DRAG_HINT: &str = "drag: rotate";
const ERROR_COLOR: Color32 = Color32::from_rgb(0xdc, 0x14, 0x3c); // crimson

/// Snapshot of what the overlay shows this frame.
#[derive(Debug, Clone, Default)]
pub struct HudState<'a> {
    pub source: Option<&'a str>,
    pub loading: bool,
    pub points: Option<usize>,
    pub error: Option<&'a str>,
}

/// One-line status for the current state; `None` when there is nothing to say.
pub fn status_text(state: &HudState<'_>) -> Option<String> {
    if state.loading {
        return Some(match state.source {
            Some(src) => format!("Loading {}…", src),
            None => "Loading…".to_string(),
        });
    }
    match state.points {
        Some(1) => Some("1 point".to_string()),
        Some(n) => Some(format!("{} points", n)),
        None if state.error.is_none() && state.source.is_none() => {
            Some("Drop a .ply file here".to_string())
        }
        None => None,
    }
}

pub fn draw_hud(ctx: &egui::Context, state: &HudState<'_>) {
    egui::Area::new(egui::Id::new("hud"))
        .anchor(Align2::LEFT_TOP, [12.0, 12.0])
        .interactable(false)
        .show(ctx, |ui| {
            if let Some(err) = state.error {
                ui.label(RichText::new(err).color(ERROR_COLOR).strong());
            }
            if let Some(status) = status_text(state) {
                ui.label(RichText::new(status).monospace());
            }
        });

    egui::Area::new(egui::Id::new("hint"))
        .anchor(Align2::LEFT_BOTTOM, [12.0, -12.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(RichText::new(DRAG_HINT).small().weak());
        });
}
