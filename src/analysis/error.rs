// src/analysis/error.rs
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    NoSelection,
    Busy,
    Server { status: u16, message: String },
    Transport(String),
    Image(String),
    Storage(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::NoSelection => write!(f, "Please select a location on the map first"),
            AnalysisError::Busy => write!(f, "An analysis is already running"),
            AnalysisError::Server { message, .. } => write!(f, "{}", message),
            AnalysisError::Transport(msg) => write!(f, "Network error: {}", msg),
            AnalysisError::Image(msg) => write!(f, "Failed to generate image: {}", msg),
            AnalysisError::Storage(msg) => write!(f, "Failed to store image: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
