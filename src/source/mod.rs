//! Source side of the pipeline: the external dataset contract and the reader
//! that turns one split of it into numbered records.
//!
//! Audio stays an undecoded blob here. Decoding happens in
//! [`crate::audio::materialize`], so advancing the reader is cheap and every
//! decode failure surfaces in one place.

#[cfg(feature = "hub")]
pub mod hub;
pub mod memory;

use crate::error::Result;
use crate::split::Split;
use std::num::NonZeroUsize;
use std::path::Path;

/// Encoded audio exactly as the dataset stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    /// Original file name or path, when the dataset kept one. Its extension
    /// is the declared container format.
    pub path: Option<String>,
}

impl AudioBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, path: None }
    }

    pub fn with_path(bytes: Vec<u8>, path: impl Into<String>) -> Self {
        Self {
            bytes,
            path: Some(path.into()),
        }
    }

    /// Declared container format, lowercased (e.g. `"flac"`).
    pub fn format_hint(&self) -> Option<String> {
        let path = self.path.as_deref()?;
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// One row of a split as delivered by a [`DatasetSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub audio: AudioBlob,
    pub transcript: String,
}

/// A row tagged with its split and 0-based position in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub split: Split,
    pub index: usize,
    pub audio: AudioBlob,
    pub transcript: String,
}

/// Lazily produced rows of one split.
pub struct SplitRows<'a> {
    /// Number of rows in the split, when the source knows it without reading them.
    pub total: Option<usize>,
    pub rows: Box<dyn Iterator<Item = Result<SourceRow>> + 'a>,
}

impl<'a> SplitRows<'a> {
    pub fn new(total: Option<usize>, rows: impl Iterator<Item = Result<SourceRow>> + 'a) -> Self {
        Self {
            total,
            rows: Box::new(rows),
        }
    }
}

/// External dataset contract: resolves a split into an ordered row sequence.
///
/// Must return [`crate::IngestError::SplitNotFound`] when the dataset has no such
/// split, and must yield rows in the same order on every call.
pub trait DatasetSource {
    /// Human-readable identifier, used in logs and errors.
    fn name(&self) -> &str;

    fn open_split(&self, split: Split) -> Result<SplitRows<'_>>;
}

impl<S: DatasetSource + ?Sized> DatasetSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open_split(&self, split: Split) -> Result<SplitRows<'_>> {
        (**self).open_split(split)
    }
}

/// Reads numbered records for a split, optionally capped to the first N.
pub struct SourceReader<S> {
    source: S,
}

impl<S: DatasetSource> SourceReader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Start reading `split`. Re-reading is side-effect free, so a fresh call
    /// is how a consumer restarts.
    pub fn read(&self, split: Split, limit: Option<NonZeroUsize>) -> Result<SplitReader<'_>> {
        let SplitRows { total, rows } = self.source.open_split(split)?;
        let limit = limit.map(NonZeroUsize::get);
        let planned = match (total, limit) {
            (Some(total), Some(limit)) => Some(total.min(limit)),
            (Some(total), None) => Some(total),
            (None, limit) => limit,
        };
        Ok(SplitReader {
            split,
            rows,
            next_index: 0,
            remaining: limit,
            planned,
            failed: false,
        })
    }
}

/// Finite, non-restartable record sequence for one split.
pub struct SplitReader<'a> {
    split: Split,
    rows: Box<dyn Iterator<Item = Result<SourceRow>> + 'a>,
    next_index: usize,
    remaining: Option<usize>,
    planned: Option<usize>,
    failed: bool,
}

impl SplitReader<'_> {
    pub fn split(&self) -> Split {
        self.split
    }

    /// Expected record count: `min(limit, total)` when the total is known,
    /// otherwise the limit, otherwise unknown.
    pub fn planned(&self) -> Option<usize> {
        self.planned
    }
}

impl Iterator for SplitReader<'_> {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining == Some(0) {
            return None;
        }
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        let index = self.next_index;
        self.next_index += 1;
        Some(Ok(RawRecord {
            split: self.split,
            index,
            audio: row.audio,
            transcript: row.transcript,
        }))
    }
}
