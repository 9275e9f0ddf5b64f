//! Error types for speech-ingest.

use crate::split::Split;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    // Data source errors
    #[error("Split '{split}' not found in dataset {dataset}")]
    SplitNotFound { split: Split, dataset: String },

    #[error("Data source error: {message}")]
    Source { message: String },

    // Audio errors
    #[error("Failed to decode audio for {file_name}: {message}")]
    Decode { file_name: String, message: String },

    #[error("Failed to write audio file {path}: {message}")]
    AudioWrite { path: String, message: String },

    // Catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] rusqlite::Error),

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// True for the one condition the pipeline treats as non-fatal.
    pub fn is_split_not_found(&self) -> bool {
        matches!(self, IngestError::SplitNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
