// src/app.rs
use eframe::egui;

use crate::state::AppState;
use crate::ui::{self, ResultViewer};

pub struct SatVisionApp {
    state: AppState,
    result_viewer: ResultViewer,
}

impl SatVisionApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            result_viewer: ResultViewer::default(),
        }
    }
}

impl eframe::App for SatVisionApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_analysis();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            ui::header::show_header(ui, &mut self.state);
            ui.add_space(4.0);
        });

        ui::dialog::show_status_bar(ctx, &mut self.state);

        if self.state.history_open {
            egui::SidePanel::right("history_panel")
                .resizable(true)
                .default_width(360.0)
                .show(ctx, |ui| {
                    ui::history::show_history_panel(ui, &mut self.state);
                });
        }

        egui::SidePanel::right("controls_panel")
            .resizable(false)
            .exact_width(300.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui::controls::show_controls(ui, &mut self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.is_demo() {
                ui::header::show_demo_notice(ui);
                ui.add_space(8.0);
            }
            ui::location::show_location_panel(ui, &mut self.state);
        });

        // Overlays
        ui::overlays::show_loading_overlay(ctx, &self.state);
        ui::overlays::show_info_window(ctx, &mut self.state);
        self.result_viewer.show(ctx, &mut self.state);
        ui::dialog::show_dialogs(ctx, &mut self.state);
    }
}
