// src/file/history.rs
use std::path::Path;

use anyhow::{Result, Context};
use chrono::{DateTime, Local};
use csv::Writer;
use tracing::{info, warn};

use super::Storage;
use crate::analysis::AnalysisResult;

pub const HISTORY_KEY: &str = "analysisHistory";

/// Past analyses, newest first, mirrored to durable storage
pub struct HistoryStore {
    storage: Box<dyn Storage>,
    entries: Vec<AnalysisResult>,
}

impl HistoryStore {
    /// Best-effort restore; anything unreadable yields an empty history
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let entries = match storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<AnalysisResult>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Failed to parse saved history, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read saved history, starting empty: {:#}", e);
                Vec::new()
            }
        };

        info!(count = entries.len(), "history loaded");
        Self { storage, entries }
    }

    pub fn entries(&self) -> &[AnalysisResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, analysis_id: &str) -> Option<&AnalysisResult> {
        self.entries.iter().find(|r| r.analysis_id == analysis_id)
    }

    pub fn latest(&self) -> Option<&AnalysisResult> {
        self.entries.first()
    }

    /// Prepends `result` and rewrites the stored copy.
    ///
    /// The in-memory list keeps the result even if persisting fails.
    pub fn append(&mut self, result: AnalysisResult) -> Result<()> {
        self.entries.insert(0, result);
        self.persist()
    }

    /// Callers confirm with the user first.
    ///
    /// Returns the removed entries; on failure nothing is removed.
    pub fn clear(&mut self) -> Result<Vec<AnalysisResult>> {
        self.storage.remove(HISTORY_KEY)
            .context("Failed to delete saved history")?;
        info!(count = self.entries.len(), "history cleared");
        Ok(std::mem::take(&mut self.entries))
    }

    fn persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.entries)?;
        self.storage.set(HISTORY_KEY, &raw)
            .context("Failed to save history")
    }

    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        writer.write_record(["analysis_id", "timestamp", "address", "lat", "lng", "image"])?;
        for entry in &self.entries {
            writer.write_record([
                entry.analysis_id.clone(),
                entry.timestamp.clone(),
                entry.address.clone(),
                entry.location.lat.to_string(),
                entry.location.lng.to_string(),
                entry.image_url.clone(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Renders an RFC 3339 timestamp in local time, or the raw text if unparseable
pub fn local_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}
