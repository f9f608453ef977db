// src/state/mod.rs
use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, Context};
use tempfile::TempDir;
use tracing::{error, warn};

use crate::analysis::{AnalysisOrchestrator, AnalysisResult, ImageProducer, Outcome, Selection};
use crate::config::AppConfig;
use crate::file::{DirStorage, HistoryStore, ImageArchive, MemoryStorage, Storage};
use crate::map::{Geocoder, LocationPicker, MapCanvas, Place, SearchBox};
use crate::utils::calculate_distance;

// Modal dialogs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialogState {
    None,
    ConfirmClearHistory,
}

// Core application state
pub struct AppState {
    // Selection
    pub selection: Option<Selection>,
    pub map: MapCanvas,
    pub picker: LocationPicker,
    pub search: SearchBox,

    // Analysis data
    pub orchestrator: AnalysisOrchestrator,
    pub history: HistoryStore,
    pub archive: ImageArchive,
    pub viewing_result: Option<AnalysisResult>,

    // Minimal UI state
    pub history_open: bool,
    pub show_info: bool,
    pub current_dialog: DialogState,
    pub error_message: Option<String>,
    pub status_message: Option<String>,

    // Fallback data directory, deleted on exit
    session_dir: Option<TempDir>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::open(
            config.build_producer()?,
            config.build_geocoder()?,
            &config.resolved_data_dir(),
        )
    }

    /// Uses `data_dir` if possible, otherwise a temporary directory for this session
    pub fn open(
        producer: Arc<dyn ImageProducer>,
        geocoder: Arc<dyn Geocoder>,
        data_dir: &Path,
    ) -> Result<Self> {
        match DirStorage::new(data_dir) {
            Ok(storage) => Ok(Self::new(producer, geocoder, Box::new(storage), data_dir)),
            Err(e) => {
                warn!("History will not persist this session: {:#}", e);
                let session_dir = tempfile::Builder::new()
                    .prefix("satvision-")
                    .tempdir()
                    .context("Failed to create a session directory")?;
                let mut state = Self::new(producer, geocoder, Box::new(MemoryStorage::new()), session_dir.path());
                state.session_dir = Some(session_dir);
                Ok(state)
            }
        }
    }

    pub fn new(
        producer: Arc<dyn ImageProducer>,
        geocoder: Arc<dyn Geocoder>,
        storage: Box<dyn Storage>,
        data_dir: &Path,
    ) -> Self {
        let history = HistoryStore::load(storage);
        let mut orchestrator = AnalysisOrchestrator::new(producer);
        orchestrator.resume_after(&history);

        Self {
            selection: None,
            map: MapCanvas::new(),
            picker: LocationPicker::new(),
            search: SearchBox::new(geocoder),
            orchestrator,
            history,
            archive: ImageArchive::new(data_dir),
            viewing_result: None,
            history_open: false,
            show_info: false,
            current_dialog: DialogState::None,
            error_message: None,
            status_message: None,
            session_dir: None,
        }
    }

    /// False when history lives only in a temporary session directory
    pub fn is_persistent(&self) -> bool {
        self.session_dir.is_none()
    }

    pub fn is_demo(&self) -> bool {
        self.orchestrator.is_demo()
    }

    pub fn can_analyze(&self) -> bool {
        self.selection.is_some() && !self.orchestrator.is_analyzing()
    }

    fn select(&mut self, selection: Selection) {
        self.selection = Some(selection);
        self.error_message = None;
    }

    pub fn handle_map_click(&mut self, lat: f64, lng: f64) {
        let selection = self.picker.on_map_click(&mut self.map, lat, lng);
        self.select(selection);
    }

    pub fn handle_place(&mut self, place: Place) {
        let selection = self.picker.on_place_selected(&mut self.map, place.coords, &place.display_name);
        self.select(selection);
    }

    pub fn start_analysis(&mut self) {
        match self.orchestrator.start(self.selection.as_ref()) {
            Ok(()) => self.error_message = None,
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    /// Called every frame; moves a finished analysis into view or into the error slot
    pub fn poll_analysis(&mut self) {
        if let Some(outcome) = self.orchestrator.poll(&mut self.history, &self.archive) {
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Succeeded(result) => self.viewing_result = Some(result),
            Outcome::Failed(message) => self.error_message = Some(message),
        }
    }

    /// Distance in km between the selection and the most recent analysis
    pub fn distance_from_last(&self) -> Option<f64> {
        let selection = self.selection.as_ref()?;
        let last = self.history.latest()?;
        Some(calculate_distance(&selection.coords, &last.location))
    }

    pub fn view_history_item(&mut self, analysis_id: &str) {
        if let Some(result) = self.history.get(analysis_id) {
            self.viewing_result = Some(result.clone());
            self.history_open = false;
        }
    }

    pub fn request_clear_history(&mut self) {
        self.current_dialog = DialogState::ConfirmClearHistory;
    }

    pub fn confirm_clear_history(&mut self) {
        self.current_dialog = DialogState::None;
        match self.history.clear() {
            Ok(removed) => {
                for entry in &removed {
                    if let Err(e) = self.archive.remove(&entry.image_url) {
                        warn!("{:#}", e);
                    }
                }
                self.viewing_result = None;
            }
            Err(e) => {
                error!("{:#}", e);
                self.error_message = Some(format!("{:#}", e));
            }
        }
    }

    pub fn cancel_dialog(&mut self) {
        self.current_dialog = DialogState::None;
    }

    pub fn download_viewing(&mut self, dest: &Path) {
        let Some(result) = &self.viewing_result else {
            return;
        };
        match self.archive.export(&result.image_url, dest) {
            Ok(()) => self.status_message = Some(format!("Saved {}", dest.display())),
            Err(e) => self.error_message = Some(format!("{:#}", e)),
        }
    }

    pub fn export_history(&mut self, dest: &Path) {
        match self.history.export_csv(dest) {
            Ok(()) => self.status_message = Some(format!("Exported {} analyses to {}", self.history.len(), dest.display())),
            Err(e) => self.error_message = Some(format!("{:#}", e)),
        }
    }
}
