use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Could not open video file {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },
    #[error("Analysis for test type '{0}' is not implemented")]
    UnsupportedTestType(String),
    #[error("Pose detection failed: {0}")]
    Detector(String),
    #[error("Failed to decode frame {index}: {reason}")]
    Decode { index: u64, reason: String },
    #[error("Failed to write annotated frame: {0}")]
    Sink(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to load overlay font {}: {reason}", path.display())]
    Font { path: PathBuf, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AnalysisError {
    /// Whether the error aborts the run; detector failures only skip a frame
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AnalysisError::Detector(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
