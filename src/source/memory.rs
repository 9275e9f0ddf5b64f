//! In-memory dataset source.

use super::{DatasetSource, SourceRow, SplitRows};
use crate::error::{IngestError, Result};
use crate::split::Split;
use std::collections::BTreeMap;

/// A dataset held entirely in memory, split by split.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    name: String,
    splits: BTreeMap<Split, Vec<SourceRow>>,
}

impl MemoryDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            splits: BTreeMap::new(),
        }
    }

    /// Add or replace a split.
    pub fn with_split(mut self, split: Split, rows: Vec<SourceRow>) -> Self {
        self.splits.insert(split, rows);
        self
    }

    pub fn split_len(&self, split: Split) -> Option<usize> {
        self.splits.get(&split).map(Vec::len)
    }
}

impl DatasetSource for MemoryDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn open_split(&self, split: Split) -> Result<SplitRows<'_>> {
        let rows = self
            .splits
            .get(&split)
            .ok_or_else(|| IngestError::SplitNotFound {
                split,
                dataset: self.name.clone(),
            })?;
        Ok(SplitRows::new(
            Some(rows.len()),
            rows.iter().cloned().map(Ok),
        ))
    }
}
