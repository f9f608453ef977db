// src/ui/controls.rs
use eframe::egui;
use egui::RichText;

use crate::state::AppState;
use crate::utils::format_coordinates;

pub fn show_controls(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("🗂 Analysis Controls");
    ui.add_space(8.0);

    ui.group(|ui| {
        ui.set_width(ui.available_width());
        ui.strong("📅 Time Period");
        ui.label("Comparing 2021 vs 2024 satellite imagery");
    });
    ui.add_space(8.0);

    if let Some(selection) = &state.selection {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.strong("Selected");
            ui.label(&selection.address);
            ui.label(RichText::new(format_coordinates(&selection.coords)).monospace().small());
            if let Some(km) = state.distance_from_last() {
                ui.label(RichText::new(format!("{:.1} km from last analysis", km)).weak());
            }
        });
        ui.add_space(8.0);
    }

    let busy = state.orchestrator.is_analyzing();
    let text = if busy {
        "Analyzing...".to_string()
    } else if state.is_demo() {
        "🛰 Start Demo Analysis".to_string()
    } else {
        "🛰 Start Analysis".to_string()
    };

    let button = egui::Button::new(RichText::new(text).strong())
        .min_size(egui::vec2(ui.available_width(), 36.0));
    ui.horizontal(|ui| {
        if ui.add_enabled(state.can_analyze(), button).clicked() {
            state.start_analysis();
        }
        if busy {
            ui.add(egui::Spinner::new());
        }
    });

    if state.selection.is_none() {
        ui.add_space(4.0);
        ui.label(
            RichText::new("Please select a location on the map or use the search bar to begin.")
                .small()
                .weak(),
        );
    }

    if let Some(last) = state.history.latest() {
        ui.add_space(16.0);
        ui.separator();
        ui.label(RichText::new("Latest analysis").weak());
        let id = last.analysis_id.clone();
        if ui.link(&last.address).clicked() {
            state.view_history_item(&id);
        }
    }
}
