// src/ui/mod.rs
pub mod controls;
pub mod dialog;
pub mod header;
pub mod history;
pub mod location;
pub mod overlays;
pub mod results;

pub use results::ResultViewer;
