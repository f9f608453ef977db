// src/ui/results.rs
use anyhow::{Result, Context};
use eframe::egui;
use egui::{Align2, Color32, RichText};
use rfd::FileDialog;
use tracing::warn;

use crate::analysis::AnalysisResult;
use crate::file::history::local_time;
use crate::state::AppState;
use crate::utils::format_coordinates;

const LEGEND: [(Color32, &str); 4] = [
    (Color32::from_rgb(0xef, 0x44, 0x44), "Significant Change"),
    (Color32::from_rgb(0xf5, 0x9e, 0x0b), "Moderate Change"),
    (Color32::from_rgb(0x2d, 0x50, 0x16), "No Change"),
    (Color32::from_rgb(0x3b, 0x82, 0xf6), "Water Bodies"),
];

pub fn decode_image(bytes: &[u8]) -> Result<egui::ColorImage> {
    let rgba = image::load_from_memory(bytes)
        .context("Unsupported image data")?
        .to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Keeps the texture for the result currently on screen
#[derive(Default)]
pub struct ResultViewer {
    loaded_id: Option<String>,
    texture: Option<egui::TextureHandle>,
    load_error: Option<String>,
}

impl ResultViewer {
    fn ensure_loaded(&mut self, ctx: &egui::Context, state: &AppState, result: &AnalysisResult) {
        if self.loaded_id.as_deref() == Some(result.analysis_id.as_str()) {
            return;
        }
        self.loaded_id = Some(result.analysis_id.clone());
        self.texture = None;
        self.load_error = None;

        let loaded = state.archive.read(&result.image_url).and_then(|bytes| decode_image(&bytes));
        match loaded {
            Ok(image) => {
                self.texture = Some(ctx.load_texture(&result.analysis_id, image, egui::TextureOptions::LINEAR));
            }
            Err(e) => {
                warn!("Failed to load result image: {:#}", e);
                self.load_error = Some(format!("{:#}", e));
            }
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, state: &mut AppState) {
        let Some(result) = state.viewing_result.clone() else {
            self.loaded_id = None;
            self.texture = None;
            return;
        };
        self.ensure_loaded(ctx, state, &result);

        let mut open = true;
        let mut download = false;

        egui::Window::new("✅ Analysis Complete")
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(900.0)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new(&result.address).weak());
                ui.add_space(4.0);

                ui.horizontal_top(|ui| {
                    ui.vertical(|ui| {
                        let max_width = (ui.available_width() - 240.0).max(320.0);
                        match (&self.texture, &self.load_error) {
                            (Some(texture), _) => {
                                let size = texture.size_vec2();
                                let scale = (max_width / size.x).min(1.0);
                                ui.image((texture.id(), size * scale));
                            }
                            (None, Some(error)) => {
                                ui.colored_label(Color32::LIGHT_RED, error);
                            }
                            (None, None) => {
                                ui.spinner();
                            }
                        }
                        ui.label(RichText::new("Change Detection Map").small().weak());
                    });

                    ui.vertical(|ui| {
                        ui.set_width(220.0);
                        ui.strong("Location");
                        ui.label(format_coordinates(&result.location));
                        ui.add_space(4.0);
                        ui.strong("Timestamp");
                        ui.label(local_time(&result.timestamp));
                        ui.add_space(4.0);
                        ui.strong("Data Source");
                        ui.label("Sentinel-2 Analysis");
                        ui.add_space(12.0);

                        ui.strong("Legend");
                        for (color, label) in LEGEND {
                            ui.horizontal(|ui| {
                                let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                                ui.painter().rect_filled(rect, 3.0, color);
                                ui.label(label);
                            });
                        }
                        ui.add_space(12.0);

                        if ui.button("⬇ Download Change Map").clicked() {
                            download = true;
                        }
                    });
                });
            });

        if download {
            let dialog = FileDialog::new()
                .set_title("Save Change Map")
                .set_file_name(result.download_name());
            if let Some(path) = dialog.save_file() {
                state.download_viewing(&path);
            }
        }

        if !open {
            state.viewing_result = None;
        }
    }
}
