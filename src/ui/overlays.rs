// src/ui/overlays.rs
use eframe::egui;
use egui::{Align2, RichText};

use crate::state::AppState;

const STEPS: [&str; 4] = [
    "Fetching 2021 imagery",
    "Fetching 2024 imagery",
    "Running change detection",
    "Generating results",
];

pub fn show_loading_overlay(ctx: &egui::Context, state: &AppState) {
    let Some(elapsed) = state.orchestrator.elapsed() else {
        return;
    };

    egui::Window::new("Processing")
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.set_width(320.0);
            ui.vertical_centered(|ui| {
                ui.add(egui::Spinner::new().size(36.0));
                ui.add_space(8.0);
                ui.label(RichText::new("Processing Satellite Data").strong().size(16.0));
                ui.label("Analyzing multi-temporal satellite imagery to detect changes...");
            });
            ui.add_space(8.0);
            for step in STEPS {
                ui.label(format!("• {}", step));
            }
            ui.add_space(8.0);
            ui.label(
                RichText::new(format!("Elapsed {:.0}s · this typically takes 30-60 seconds", elapsed.as_secs_f32()))
                    .small()
                    .weak(),
            );
        });

    ctx.request_repaint_after(std::time::Duration::from_millis(200));
}

pub fn show_info_window(ctx: &egui::Context, state: &mut AppState) {
    let mut open = state.show_info;

    egui::Window::new("About SatelliteVision")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.set_max_width(460.0);
            ui.label(RichText::new("Advanced Change Detection Platform").weak());
            ui.add_space(8.0);
            ui.label(
                "SatelliteVision analyzes satellite imagery to identify environmental and \
                 land-use changes over time, using Sentinel-2 data to show how a place has changed.",
            );
            ui.add_space(8.0);

            egui::Grid::new("about_features").num_columns(2).spacing([12.0, 6.0]).show(ui, |ui| {
                ui.strong("Temporal Analysis");
                ui.label("Compares 2021 and 2024 imagery over a 3-year period.");
                ui.end_row();
                ui.strong("High Resolution");
                ui.label("Sentinel-2 data at 10-15 meter resolution.");
                ui.end_row();
                ui.strong("Global Coverage");
                ui.label("Any location worldwide with satellite coverage.");
                ui.end_row();
                ui.strong("Fast Processing");
                ui.label("Results in under 60 seconds.");
                ui.end_row();
            });

            ui.add_space(8.0);
            ui.strong("How to Use");
            ui.label("1. Click on the map or search to select your area of interest");
            ui.label("2. Press \"Start Analysis\" to begin change detection");
            ui.label("3. Review the change map and save the image");

            ui.add_space(8.0);
            ui.strong("Technical Details");
            let mode = if state.is_demo() { "synthetic demo imagery" } else { "remote detection service" };
            let kept = if state.is_persistent() { "on this machine" } else { "for this session only" };
            ui.label(format!("Source: {} · history kept {}", mode, kept));
        });

    state.show_info = open;
}
