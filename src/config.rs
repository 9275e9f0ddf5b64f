use crate::defaults;
use crate::error::IngestError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub paths: PathsConfig,
}

/// Remote dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    pub id: String,
    pub revision: String,
    pub audio_column: String,
    pub transcript_column: String,
    /// Hub access token; usually supplied through `HF_TOKEN` rather than the file.
    pub token: Option<String>,
}

/// Filesystem layout, relative paths resolve against the project root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    pub catalog: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            id: defaults::DATASET_ID.to_string(),
            revision: defaults::DATASET_REVISION.to_string(),
            audio_column: defaults::AUDIO_COLUMN.to_string(),
            transcript_column: defaults::TRANSCRIPT_COLUMN.to_string(),
            token: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(defaults::CACHE_DIR),
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
            catalog: PathBuf::from(defaults::CATALOG_PATH),
        }
    }
}

/// Resolved on-disk locations handed to each pipeline component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    pub catalog_path: PathBuf,
}

impl Layout {
    /// Create every directory the pipeline writes into.
    pub fn create_dirs(&self) -> crate::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        fs::create_dir_all(&self.output_dir)?;
        if let Some(parent) = self.catalog_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist.
    ///
    /// Any other failure (unreadable file, invalid TOML) is returned.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if e.downcast_ref::<std::io::Error>()
                    .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound) =>
            {
                Ok(Self::default())
            }
            Err(e) => Err(e.context(format!("Failed to load config from {}", path.display()))),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SPEECH_INGEST_DATASET → dataset.id
    /// - SPEECH_INGEST_REVISION → dataset.revision
    /// - HF_TOKEN → dataset.token
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(id) = std::env::var("SPEECH_INGEST_DATASET")
            && !id.is_empty()
        {
            self.dataset.id = id;
        }

        if let Ok(revision) = std::env::var("SPEECH_INGEST_REVISION")
            && !revision.is_empty()
        {
            self.dataset.revision = revision;
        }

        if let Ok(token) = std::env::var("HF_TOKEN")
            && !token.is_empty()
        {
            self.dataset.token = Some(token);
        }

        self
    }

    /// Reject values that would only fail later, deep inside a run.
    pub fn validate(&self) -> crate::Result<()> {
        let required = [
            ("dataset.id", &self.dataset.id),
            ("dataset.revision", &self.dataset.revision),
            ("dataset.audio_column", &self.dataset.audio_column),
            ("dataset.transcript_column", &self.dataset.transcript_column),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(IngestError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Resolve the configured paths against a project root.
    pub fn layout(&self, root: &Path) -> Layout {
        Layout {
            cache_dir: root.join(&self.paths.cache_dir),
            output_dir: root.join(&self.paths.output_dir),
            catalog_path: root.join(&self.paths.catalog),
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/speech-ingest/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("speech-ingest").join("config.toml"))
    }
}
