// src/ui/history.rs
use eframe::egui;
use egui::RichText;
use rfd::FileDialog;

use crate::file::history::local_time;
use crate::state::AppState;
use crate::utils::short_coordinates;

pub fn show_history_panel(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.heading("🕘 Analysis History");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("✖").on_hover_text("Close").clicked() {
                state.history_open = false;
            }
        });
    });
    ui.separator();

    if state.history.is_empty() {
        ui.add_space(24.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("Your past analyses will appear here.").weak());
        });
        return;
    }

    let mut view = None;
    egui::ScrollArea::vertical()
        .id_source("history_scroll")
        .auto_shrink([false, false])
        .max_height(ui.available_height() - 40.0)
        .show(ui, |ui| {
            for item in state.history.entries() {
                ui.group(|ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.label(RichText::new(&item.address).strong())
                                .on_hover_text(&item.address);
                            ui.label(RichText::new(format!("📍 {}", short_coordinates(&item.location))).small());
                            ui.label(RichText::new(local_time(&item.timestamp)).small().weak());
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("View").clicked() {
                                view = Some(item.analysis_id.clone());
                            }
                        });
                    });
                });
            }
        });

    if let Some(id) = view {
        state.view_history_item(&id);
    }

    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("📄 Export CSV").clicked() {
            let dialog = FileDialog::new()
                .set_title("Export History")
                .add_filter("CSV", &["csv"])
                .set_file_name("analysis-history.csv");
            if let Some(path) = dialog.save_file() {
                state.export_history(&path);
            }
        }
        let clear = egui::Button::new(RichText::new("🗑 Clear All History").color(egui::Color32::RED));
        if ui.add(clear).clicked() {
            state.request_clear_history();
        }
    });
}
