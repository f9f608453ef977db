// src/main.rs
use eframe::egui;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod analysis;
mod app;
mod config;
mod file;
mod map;
mod state;
mod ui;
mod utils;

use crate::app::SatVisionApp;
use crate::config::AppConfig;
use crate::state::AppState;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load();
    let state = AppState::from_config(&config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("SatelliteVision"),
        ..Default::default()
    };

    eframe::run_native(
        "SatelliteVision",
        options,
        Box::new(|_cc| Box::new(SatVisionApp::new(state))),
    ).map_err(|e| anyhow::anyhow!("Failed to run application: {}", e))
}
