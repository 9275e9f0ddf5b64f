//! Turn one raw record into a WAV file on disk plus the metadata the catalog needs.

use crate::audio::decode::decode;
use crate::audio::wav::write_wav;
use crate::defaults::{AUDIO_EXTENSION, FILE_INDEX_WIDTH};
use crate::error::{IngestError, Result};
use crate::source::RawRecord;
use crate::split::Split;
use std::path::{Path, PathBuf};

/// Deterministic file name of the record at 0-based `index` of `split`,
/// e.g. `train_00001.wav` for index 0.
pub fn file_name_for(split: Split, index: usize) -> String {
    format!(
        "{split}_{:0width$}.{AUDIO_EXTENSION}",
        index + 1,
        width = FILE_INDEX_WIDTH
    )
}

/// What the catalog records about one materialized file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDescriptor {
    pub file_name: String,
    pub duration_seconds: f64,
    pub split: Split,
    pub transcript: String,
}

/// Whether this call created the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Written,
    /// A file with this name already existed and was left untouched.
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Materialized {
    pub descriptor: FileDescriptor,
    pub path: PathBuf,
    pub file: FileOutcome,
}

/// Writes one canonical WAV file per record into a fixed output directory.
#[derive(Debug, Clone)]
pub struct AudioMaterializer {
    output_dir: PathBuf,
}

impl AudioMaterializer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Decode `record`, compute its duration and write its file unless one
    /// already exists under the same name.
    ///
    /// An existing file is not compared with the incoming audio; its presence
    /// alone means the write is done.
    ///
    /// # Errors
    ///
    /// [`IngestError::Decode`] when the audio blob cannot be decoded, and
    /// I/O or [`IngestError::AudioWrite`] errors when the file cannot be written.
    pub fn materialize(&self, record: RawRecord) -> Result<Materialized> {
        let RawRecord {
            split,
            index,
            audio,
            transcript,
        } = record;
        let file_name = file_name_for(split, index);

        let decoded = decode(audio).map_err(|message| IngestError::Decode {
            file_name: file_name.clone(),
            message,
        })?;

        let path = self.path_for(&file_name);
        let file = if path.exists() {
            log::debug!("{file_name} already on disk, not rewriting");
            FileOutcome::AlreadyPresent
        } else {
            write_wav(&path, &decoded)?;
            log::debug!(
                "Wrote {} ({} Hz, {} ch, {} frames)",
                path.display(),
                decoded.sample_rate,
                decoded.channels,
                decoded.frames()
            );
            FileOutcome::Written
        };

        Ok(Materialized {
            descriptor: FileDescriptor {
                file_name,
                duration_seconds: decoded.duration_seconds(),
                split,
                transcript,
            },
            path,
            file,
        })
    }
}
