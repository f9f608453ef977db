// src/analysis/orchestrator.rs
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{SecondsFormat, Utc};
use tracing::{error, info, warn};

use super::error::AnalysisError;
use super::producer::{ImageProducer, ProducedImage};
use super::types::{AnalysisResult, Selection};
use crate::file::{HistoryStore, ImageArchive};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnalysisPhase {
    Idle,
    Analyzing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded(AnalysisResult),
    Failed(String),
}

/// `analysis_<unix millis>`, strictly increasing within the process
#[derive(Debug, Default)]
struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    fn next(&mut self, now_ms: i64) -> String {
        self.last = now_ms.max(self.last + 1);
        format!("analysis_{}", self.last)
    }

    /// Keeps later ids above one that was already issued
    fn observe(&mut self, analysis_id: &str) {
        if let Some(ms) = analysis_id.strip_prefix("analysis_").and_then(|n| n.parse::<i64>().ok()) {
            self.last = self.last.max(ms);
        }
    }
}

type WorkerResult = Result<ProducedImage, AnalysisError>;

struct PendingAnalysis {
    selection: Selection,
    started: Instant,
    rx: Receiver<WorkerResult>,
}

/// Drives one analysis at a time from a selection to a stored result
pub struct AnalysisOrchestrator {
    producer: Arc<dyn ImageProducer>,
    pending: Option<PendingAnalysis>,
    last_error: Option<String>,
    ids: IdGenerator,
}

impl AnalysisOrchestrator {
    pub fn new(producer: Arc<dyn ImageProducer>) -> Self {
        Self {
            producer,
            pending: None,
            last_error: None,
            ids: IdGenerator::default(),
        }
    }

    /// Continues numbering after the ids already in `history`
    pub fn resume_after(&mut self, history: &HistoryStore) {
        for entry in history.entries() {
            self.ids.observe(&entry.analysis_id);
        }
    }

    pub fn phase(&self) -> AnalysisPhase {
        if self.pending.is_some() {
            AnalysisPhase::Analyzing
        } else {
            AnalysisPhase::Idle
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.phase() == AnalysisPhase::Analyzing
    }

    pub fn is_demo(&self) -> bool {
        self.producer.is_demo()
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.started.elapsed())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Kicks off the producer on a worker thread.
    ///
    /// Without a selection this records the validation message and stays idle.
    pub fn start(&mut self, selection: Option<&Selection>) -> Result<(), AnalysisError> {
        if self.pending.is_some() {
            return Err(AnalysisError::Busy);
        }

        let Some(selection) = selection else {
            let err = AnalysisError::NoSelection;
            self.last_error = Some(err.to_string());
            return Err(err);
        };

        self.last_error = None;
        info!(address = %selection.address, lat = selection.coords.lat, lng = selection.coords.lng, "analysis started");

        let (tx, rx) = mpsc::channel();
        let producer = Arc::clone(&self.producer);
        let coords = selection.coords;
        thread::spawn(move || {
            // receiver may be gone if the app closed mid-analysis
            let _ = tx.send(producer.produce(coords));
        });

        self.pending = Some(PendingAnalysis {
            selection: selection.clone(),
            started: Instant::now(),
            rx,
        });
        Ok(())
    }

    /// Non-blocking; returns the outcome once the worker reports back
    pub fn poll(&mut self, history: &mut HistoryStore, archive: &ImageArchive) -> Option<Outcome> {
        let received = match &self.pending {
            None => return None,
            Some(pending) => match pending.rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Err(worker_lost()),
            },
        };
        Some(self.finish(received, history, archive))
    }

    /// Blocks until the in-flight analysis completes
    pub fn wait(&mut self, history: &mut HistoryStore, archive: &ImageArchive) -> Option<Outcome> {
        let received = match &self.pending {
            None => return None,
            Some(pending) => pending.rx.recv().unwrap_or_else(|_| Err(worker_lost())),
        };
        Some(self.finish(received, history, archive))
    }

    fn finish(&mut self, received: WorkerResult, history: &mut HistoryStore, archive: &ImageArchive) -> Outcome {
        let Some(pending) = self.pending.take() else {
            return Outcome::Failed(worker_lost().to_string());
        };

        match received.and_then(|image| self.store(&pending.selection, image, history, archive)) {
            Ok(result) => {
                info!(
                    analysis_id = %result.analysis_id,
                    elapsed_ms = pending.started.elapsed().as_millis() as u64,
                    "analysis succeeded"
                );
                Outcome::Succeeded(result)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(%message, "analysis failed");
                self.last_error = Some(message.clone());
                Outcome::Failed(message)
            }
        }
    }

    fn store(
        &mut self,
        selection: &Selection,
        image: ProducedImage,
        history: &mut HistoryStore,
        archive: &ImageArchive,
    ) -> Result<AnalysisResult, AnalysisError> {
        let now = Utc::now();
        let analysis_id = self.ids.next(now.timestamp_millis());

        let path = archive.save(&analysis_id, image.extension, &image.bytes)
            .map_err(|e| AnalysisError::Storage(format!("{:#}", e)))?;

        let result = AnalysisResult {
            image_url: path.to_string_lossy().into_owned(),
            location: selection.coords,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            analysis_id,
            address: selection.address.clone(),
        };

        if let Err(e) = history.append(result.clone()) {
            error!("Failed to persist history: {:#}", e);
        }
        Ok(result)
    }
}

fn worker_lost() -> AnalysisError {
    AnalysisError::Image("analysis worker stopped unexpectedly".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use crate::analysis::{Coordinates, MockProducer};
    use crate::file::MemoryStorage;

    struct Fixture {
        _tmp: tempfile::TempDir,
        history: HistoryStore,
        archive: ImageArchive,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let archive = ImageArchive::new(tmp.path());
        Fixture {
            _tmp: tmp,
            history: HistoryStore::load(Box::new(MemoryStorage::new())),
            archive,
        }
    }

    fn selection(lat: f64, lng: f64) -> Selection {
        Selection::new(Coordinates::new(lat, lng), Some("Test site".into()))
    }

    struct FailingProducer(u16);

    impl ImageProducer for FailingProducer {
        fn produce(&self, _location: Coordinates) -> Result<ProducedImage, AnalysisError> {
            Err(AnalysisError::Server {
                status: self.0,
                message: crate::analysis::producer::failure_message(self.0, b""),
            })
        }
    }

    /// Blocks until the test releases it
    struct GatedProducer(Mutex<Receiver<()>>);

    impl ImageProducer for GatedProducer {
        fn produce(&self, _location: Coordinates) -> Result<ProducedImage, AnalysisError> {
            let _ = self.0.lock().unwrap().recv();
            Ok(ProducedImage { bytes: vec![1, 2, 3], extension: "png" })
        }
    }

    struct PanickingProducer;

    impl ImageProducer for PanickingProducer {
        fn produce(&self, _location: Coordinates) -> Result<ProducedImage, AnalysisError> {
            panic!("boom");
        }
    }

    #[test]
    fn no_selection_is_rejected_and_stays_idle() {
        let mut f = fixture();
        let mut orchestrator = AnalysisOrchestrator::new(Arc::new(MockProducer::instant()));

        assert_eq!(orchestrator.start(None), Err(AnalysisError::NoSelection));
        assert_eq!(orchestrator.phase(), AnalysisPhase::Idle);
        assert_eq!(orchestrator.last_error(), Some("Please select a location on the map first"));
        assert_eq!(orchestrator.poll(&mut f.history, &f.archive), None);
        assert!(f.history.is_empty());
    }

    #[test]
    fn success_prepends_result_with_location() {
        let mut f = fixture();
        let mut orchestrator = AnalysisOrchestrator::new(Arc::new(MockProducer::instant()));

        orchestrator.start(Some(&selection(10.0, 20.0))).unwrap();
        assert!(orchestrator.is_analyzing());
        let outcome = orchestrator.wait(&mut f.history, &f.archive).unwrap();

        let Outcome::Succeeded(result) = outcome else {
            panic!("expected success, got {:?}", outcome);
        };
        assert_eq!(orchestrator.phase(), AnalysisPhase::Idle);
        assert_eq!(f.history.entries()[0].location, Coordinates::new(10.0, 20.0));
        assert_eq!(f.history.entries()[0], result);
        assert_eq!(result.address, "Test site");
        assert!(result.analysis_id.starts_with("analysis_"));
        assert!(chrono::DateTime::parse_from_rfc3339(&result.timestamp).is_ok());
        assert!(std::path::Path::new(&result.image_url).exists());
    }

    #[test]
    fn ids_are_unique_across_runs() {
        let mut f = fixture();
        let mut orchestrator = AnalysisOrchestrator::new(Arc::new(MockProducer::instant()));

        for _ in 0..5 {
            orchestrator.start(Some(&selection(10.0, 20.0))).unwrap();
            orchestrator.wait(&mut f.history, &f.archive).unwrap();
        }
        let ids: HashSet<_> = f.history.entries().iter().map(|r| r.analysis_id.clone()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn id_generator_never_repeats() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.next(1000), "analysis_1000");
        assert_eq!(ids.next(1000), "analysis_1001");
        assert_eq!(ids.next(999), "analysis_1002");
        assert_eq!(ids.next(5000), "analysis_5000");
    }

    #[test]
    fn ids_continue_after_persisted_history() {
        let mut f = fixture();
        let far_future = "analysis_99999999999999";
        f.history.append(AnalysisResult {
            image_url: "elsewhere.jpg".into(),
            location: Coordinates::new(0.0, 0.0),
            timestamp: "2024-06-15T10:00:00.000Z".into(),
            analysis_id: far_future.into(),
            address: "Earlier".into(),
        }).unwrap();

        let mut orchestrator = AnalysisOrchestrator::new(Arc::new(MockProducer::instant()));
        orchestrator.resume_after(&f.history);
        orchestrator.start(Some(&selection(1.0, 1.0))).unwrap();
        let Some(Outcome::Succeeded(result)) = orchestrator.wait(&mut f.history, &f.archive) else {
            panic!("expected success");
        };
        assert_eq!(result.analysis_id, "analysis_100000000000000");
    }

    #[test]
    fn observed_ids_ignore_foreign_formats() {
        let mut ids = IdGenerator::default();
        ids.observe("analysis_2000");
        ids.observe("legacy-7");
        ids.observe("analysis_abc");
        assert_eq!(ids.next(1000), "analysis_2001");
    }

    #[test]
    fn failure_surfaces_message_and_keeps_history() {
        let mut f = fixture();
        let mut orchestrator = AnalysisOrchestrator::new(Arc::new(FailingProducer(500)));

        orchestrator.start(Some(&selection(1.0, 1.0))).unwrap();
        let outcome = orchestrator.wait(&mut f.history, &f.archive).unwrap();

        assert_eq!(outcome, Outcome::Failed("Server error: 500".into()));
        assert_eq!(orchestrator.phase(), AnalysisPhase::Idle);
        assert_eq!(orchestrator.last_error(), Some("Server error: 500"));
        assert!(f.history.is_empty());
    }

    #[test]
    fn only_one_analysis_in_flight() {
        let mut f = fixture();
        let (release, gate) = mpsc::channel();
        let mut orchestrator = AnalysisOrchestrator::new(Arc::new(GatedProducer(Mutex::new(gate))));

        orchestrator.start(Some(&selection(1.0, 2.0))).unwrap();
        assert_eq!(orchestrator.start(Some(&selection(3.0, 4.0))), Err(AnalysisError::Busy));
        assert_eq!(orchestrator.poll(&mut f.history, &f.archive), None);
        assert!(orchestrator.elapsed().is_some());

        release.send(()).unwrap();
        let outcome = orchestrator.wait(&mut f.history, &f.archive).unwrap();
        let Outcome::Succeeded(result) = outcome else {
            panic!("expected success");
        };
        assert_eq!(result.location, Coordinates::new(1.0, 2.0));
        assert!(result.image_url.ends_with(".png"));
        assert_eq!(f.history.len(), 1);
    }

    #[test]
    fn new_start_clears_previous_error() {
        let mut f = fixture();
        let mut orchestrator = AnalysisOrchestrator::new(Arc::new(MockProducer::instant()));
        let _ = orchestrator.start(None);
        assert!(orchestrator.last_error().is_some());

        orchestrator.start(Some(&selection(0.0, 0.0))).unwrap();
        assert_eq!(orchestrator.last_error(), None);
        orchestrator.wait(&mut f.history, &f.archive);
    }

    #[test]
    fn panicking_worker_reports_failure() {
        let mut f = fixture();
        let mut orchestrator = AnalysisOrchestrator::new(Arc::new(PanickingProducer));

        orchestrator.start(Some(&selection(0.0, 0.0))).unwrap();
        let outcome = orchestrator.wait(&mut f.history, &f.archive).unwrap();
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert!(!orchestrator.is_analyzing());
    }
}
