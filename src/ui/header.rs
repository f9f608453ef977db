// src/ui/header.rs
use eframe::egui;
use egui::{Color32, RichText};

use crate::state::AppState;

const BRAND: Color32 = Color32::from_rgb(0x25, 0x63, 0xeb);
const BADGE_BG: Color32 = Color32::from_rgb(0xfe, 0xf9, 0xc3);
const BADGE_FG: Color32 = Color32::from_rgb(0x85, 0x4d, 0x0e);

pub fn show_header(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("🛰").size(26.0).color(BRAND));
        ui.vertical(|ui| {
            ui.label(RichText::new("SatelliteVision").strong().size(18.0));
            ui.label(RichText::new("Change Detection Platform").weak());
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("ℹ About").on_hover_text("About this application").clicked() {
                state.show_info = true;
            }
            let label = format!("🕘 History ({})", state.history.len());
            if ui.button(label).on_hover_text("View analysis history").clicked() {
                state.history_open = !state.history_open;
            }
            if state.is_demo() {
                egui::Frame::none()
                    .fill(BADGE_BG)
                    .rounding(8.0)
                    .inner_margin(egui::Margin::symmetric(8.0, 2.0))
                    .show(ui, |ui| {
                        ui.label(RichText::new("DEMO MODE").small().color(BADGE_FG));
                    });
            }
        });
    });
}

pub fn show_demo_notice(ui: &mut egui::Ui) {
    egui::Frame::none()
        .fill(BADGE_BG)
        .rounding(6.0)
        .inner_margin(egui::Margin::same(8.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new(
                    "Demo Mode: this build generates mock change detection results. \
                     The full version connects to real satellite data processing services.",
                )
                .color(BADGE_FG),
            );
        });
}
