//! speech-ingest - turn a split speech corpus into WAV files plus a SQLite catalog
//!
//! Reads the train/validation/test splits of an audio dataset, writes each
//! record as a 16-bit PCM WAV file and records its transcript, split and
//! duration in a catalog table. Re-running is idempotent.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
#[cfg(feature = "cli")]
pub mod output;
pub mod pipeline;
pub mod source;
pub mod split;

// Source -> materialize -> catalog
pub use audio::{AudioMaterializer, FileDescriptor};
pub use catalog::{Catalog, RecordOutcome};
pub use source::memory::MemoryDataset;
pub use source::{DatasetSource, SourceReader};

#[cfg(feature = "hub")]
pub use source::hub::{HubDataset, HubSettings};

// Pipeline
pub use pipeline::{IngestObserver, IngestRequest, IngestSummary, Ingestor, NullObserver};

// Error handling
pub use error::{IngestError, Result};

// Config
pub use config::{Config, Layout};
pub use split::Split;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
