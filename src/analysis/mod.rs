// src/analysis/mod.rs
pub mod error;
pub mod mock;
pub mod orchestrator;
pub mod producer;
pub mod types;

// Re-export commonly used types
pub use mock::MockProducer;
pub use orchestrator::{AnalysisOrchestrator, Outcome};
pub use producer::{ImageProducer, RemoteProducer};
pub use types::{AnalysisResult, Coordinates, Selection};
