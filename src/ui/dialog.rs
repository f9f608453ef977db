// src/ui/dialog.rs
use eframe::egui;
use egui::{Align2, Color32};

use crate::state::{AppState, DialogState};

pub fn show_dialogs(ctx: &egui::Context, state: &mut AppState) {
    match state.current_dialog {
        DialogState::None => {}
        DialogState::ConfirmClearHistory => show_confirm_clear(ctx, state),
    }

    show_error_toast(ctx, state);
}

fn show_confirm_clear(ctx: &egui::Context, state: &mut AppState) {
    egui::Window::new("Clear History")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Are you sure you want to delete all analysis history? This cannot be undone.");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button(egui::RichText::new("Delete").color(Color32::RED)).clicked() {
                    state.confirm_clear_history();
                }
                if ui.button("Cancel").clicked() {
                    state.cancel_dialog();
                }
            });
        });
}

fn show_error_toast(ctx: &egui::Context, state: &mut AppState) {
    let Some(error) = state.error_message.clone() else {
        return;
    };

    egui::Window::new("Error")
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::RIGHT_TOP, [-16.0, 72.0])
        .frame(egui::Frame::popup(&ctx.style()).fill(Color32::from_rgb(0xfe, 0xe2, 0xe2)))
        .show(ctx, |ui| {
            ui.set_max_width(360.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&error).color(Color32::from_rgb(0xb9, 0x1c, 0x1c)));
                if ui.small_button("✖").clicked() {
                    state.error_message = None;
                }
            });
        });
}

/// Must run before the central panel is laid out
pub fn show_status_bar(ctx: &egui::Context, state: &mut AppState) {
    let Some(status) = state.status_message.clone() else {
        return;
    };

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(status);
            if ui.small_button("✖").clicked() {
                state.status_message = None;
            }
        });
    });
}
