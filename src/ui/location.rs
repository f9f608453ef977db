// src/ui/location.rs
use eframe::egui;

use crate::state::AppState;

pub fn show_location_panel(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.heading("📍 Location Selection");
        if let Some(selection) = &state.selection {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(&selection.address).weak())
                    .on_hover_text(&selection.address);
            });
        }
    });
    ui.add_space(4.0);

    show_search(ui, state);
    ui.add_space(8.0);

    if let Some(coords) = state.map.show(ui) {
        state.handle_map_click(coords.lat, coords.lng);
    }
}

fn show_search(ui: &mut egui::Ui, state: &mut AppState) {
    if state.search.poll() {
        ui.ctx().request_repaint();
    }

    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.search.query)
                .hint_text("Search for a location or enter \"lat, lng\"...")
                .desired_width(ui.available_width() - 90.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        let searching = state.search.is_searching();
        if searching {
            ui.add(egui::Spinner::new());
        } else if ui.button("🔍 Search").clicked() || submitted {
            state.search.submit();
        }
    });

    if let Some(error) = state.search.error().map(str::to_string) {
        ui.horizontal(|ui| {
            ui.colored_label(egui::Color32::LIGHT_RED, error);
            if ui.small_button("✖").clicked() {
                state.search.dismiss();
            }
        });
    }

    let mut picked = None;
    if !state.search.results().is_empty() {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            for (idx, place) in state.search.results().iter().enumerate() {
                if ui.selectable_label(false, &place.display_name).clicked() {
                    picked = Some(idx);
                }
            }
        });
    }
    if let Some(place) = picked.and_then(|idx| state.search.pick(idx)) {
        state.handle_place(place);
    }

    if state.search.is_searching() {
        ui.ctx().request_repaint_after(std::time::Duration::from_millis(100));
    }
}
