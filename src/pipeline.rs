//! Ingest pipeline.
//!
//! Drains each requested split of a [`DatasetSource`] record by record:
//! read → materialize → catalog. Single-threaded and synchronous. Every record
//! is independently idempotent, so an interrupted run is resumed by running
//! the same command again.

use crate::audio::{AudioMaterializer, FileOutcome, Materialized};
use crate::catalog::{Catalog, RecordOutcome};
use crate::error::{IngestError, Result};
use crate::source::{DatasetSource, SourceReader};
use crate::split::Split;
use std::num::NonZeroUsize;

/// Which splits to ingest and how many records of each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub splits: Vec<Split>,
    /// Cap per split; `None` ingests everything.
    pub limit: Option<NonZeroUsize>,
}

impl IngestRequest {
    pub fn new(splits: Vec<Split>, limit: Option<NonZeroUsize>) -> Self {
        Self { splits, limit }
    }

    /// Every split, no limit.
    pub fn all() -> Self {
        Self::new(Split::ALL.to_vec(), None)
    }

    /// Requested splits with duplicates removed, first occurrence wins.
    pub fn unique_splits(&self) -> Vec<Split> {
        let mut unique = Vec::with_capacity(self.splits.len());
        for &split in &self.splits {
            if !unique.contains(&split) {
                unique.push(split);
            }
        }
        unique
    }
}

impl Default for IngestRequest {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStatus {
    Completed,
    /// The dataset has no such split; nothing was done for it.
    NotFound,
}

/// Counters for one split of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSummary {
    pub split: Split,
    pub status: SplitStatus,
    /// Catalog rows inserted.
    pub written: usize,
    /// Catalog rows that already existed.
    pub skipped: usize,
    /// Audio files created.
    pub files_written: usize,
    /// Audio files that were already on disk.
    pub files_present: usize,
}

impl SplitSummary {
    fn new(split: Split, status: SplitStatus) -> Self {
        Self {
            split,
            status,
            written: 0,
            skipped: 0,
            files_written: 0,
            files_present: 0,
        }
    }

    fn tally(&mut self, file: FileOutcome, outcome: RecordOutcome) {
        match file {
            FileOutcome::Written => self.files_written += 1,
            FileOutcome::AlreadyPresent => self.files_present += 1,
        }
        match outcome {
            RecordOutcome::Written => self.written += 1,
            RecordOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Records processed for this split.
    pub fn records(&self) -> usize {
        self.written + self.skipped
    }
}

/// Result of a whole run, one entry per requested split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub splits: Vec<SplitSummary>,
}

impl IngestSummary {
    pub fn written(&self) -> usize {
        self.splits.iter().map(|s| s.written).sum()
    }

    pub fn skipped(&self) -> usize {
        self.splits.iter().map(|s| s.skipped).sum()
    }

    pub fn files_written(&self) -> usize {
        self.splits.iter().map(|s| s.files_written).sum()
    }

    pub fn missing_splits(&self) -> Vec<Split> {
        self.splits
            .iter()
            .filter(|s| s.status == SplitStatus::NotFound)
            .map(|s| s.split)
            .collect()
    }

    pub fn get(&self, split: Split) -> Option<&SplitSummary> {
        self.splits.iter().find(|s| s.split == split)
    }
}

/// Progress callbacks, invoked synchronously from [`Ingestor::run`].
pub trait IngestObserver {
    /// `planned` is the expected record count when known.
    fn split_started(&mut self, _split: Split, _planned: Option<usize>) {}

    fn record_done(&mut self, _materialized: &Materialized, _outcome: RecordOutcome) {}

    fn split_missing(&mut self, _split: Split, _error: &IngestError) {}

    fn split_finished(&mut self, _summary: &SplitSummary) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl IngestObserver for NullObserver {}

/// Runs the read → materialize → catalog chain.
pub struct Ingestor<S> {
    reader: SourceReader<S>,
    materializer: AudioMaterializer,
    catalog: Catalog,
}

impl<S: DatasetSource> Ingestor<S> {
    pub fn new(source: S, materializer: AudioMaterializer, catalog: Catalog) -> Self {
        Self {
            reader: SourceReader::new(source),
            materializer,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn materializer(&self) -> &AudioMaterializer {
        &self.materializer
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Ingest every requested split in order.
    ///
    /// A split missing from the source is reported and skipped. Any other
    /// error (decode failure, I/O, catalog) stops the run; splits committed
    /// before it stay committed.
    pub fn run(
        &mut self,
        request: &IngestRequest,
        observer: &mut dyn IngestObserver,
    ) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();
        for split in request.unique_splits() {
            let split_summary = self.ingest_split(split, request.limit, observer)?;
            summary.splits.push(split_summary);
        }
        log::info!(
            "Ingest of {} complete: {} written, {} skipped",
            self.reader.source().name(),
            summary.written(),
            summary.skipped()
        );
        Ok(summary)
    }

    fn ingest_split(
        &mut self,
        split: Split,
        limit: Option<NonZeroUsize>,
        observer: &mut dyn IngestObserver,
    ) -> Result<SplitSummary> {
        let records = match self.reader.read(split, limit) {
            Ok(records) => records,
            Err(e) if e.is_split_not_found() => {
                log::warn!("{e}, skipping");
                observer.split_missing(split, &e);
                let summary = SplitSummary::new(split, SplitStatus::NotFound);
                observer.split_finished(&summary);
                return Ok(summary);
            }
            Err(e) => return Err(e),
        };

        log::info!(
            "Processing split '{split}' ({} records)",
            records
                .planned()
                .map_or_else(|| "unknown number of".to_string(), |n| n.to_string())
        );
        observer.split_started(split, records.planned());

        let mut summary = SplitSummary::new(split, SplitStatus::Completed);
        let batch = self.catalog.batch()?;
        for record in records {
            let materialized = self.materializer.materialize(record?)?;
            let outcome = batch.record(&materialized.descriptor)?;
            log::debug!(
                "{}: file {:?}, row {:?}",
                materialized.descriptor.file_name,
                materialized.file,
                outcome
            );
            summary.tally(materialized.file, outcome);
            observer.record_done(&materialized, outcome);
        }
        batch.commit()?;

        log::info!(
            "Split '{split}' done: {} written, {} skipped",
            summary.written,
            summary.skipped
        );
        observer.split_finished(&summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::MemoryDataset;
    use crate::source::{AudioBlob, SourceRow};
    use std::io::Cursor;

    fn wav_blob(frames: usize) -> AudioBlob {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..frames {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
        AudioBlob::new(cursor.into_inner())
    }

    fn rows(n: usize) -> Vec<SourceRow> {
        (0..n)
            .map(|i| SourceRow {
                audio: wav_blob(1600),
                transcript: format!("row {i}"),
            })
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl IngestObserver for Recorder {
        fn split_started(&mut self, split: Split, planned: Option<usize>) {
            self.events.push(format!("start {split} {planned:?}"));
        }
        fn record_done(&mut self, materialized: &Materialized, outcome: RecordOutcome) {
            self.events
                .push(format!("{} {outcome:?}", materialized.descriptor.file_name));
        }
        fn split_missing(&mut self, split: Split, _error: &IngestError) {
            self.events.push(format!("missing {split}"));
        }
        fn split_finished(&mut self, summary: &SplitSummary) {
            self.events.push(format!("finish {}", summary.split));
        }
    }

    #[test]
    fn unique_splits_keeps_first_occurrence_order() {
        let request = IngestRequest::new(
            vec![Split::Test, Split::Train, Split::Test, Split::Train],
            None,
        );
        assert_eq!(request.unique_splits(), vec![Split::Test, Split::Train]);
        assert_eq!(IngestRequest::default().unique_splits(), Split::ALL.to_vec());
    }

    #[test]
    fn observer_sees_every_event_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = MemoryDataset::new("mem").with_split(Split::Train, rows(2));
        let mut ingestor = Ingestor::new(
            dataset,
            AudioMaterializer::new(dir.path()),
            Catalog::open_in_memory().unwrap(),
        );
        let mut recorder = Recorder::default();

        let summary = ingestor
            .run(
                &IngestRequest::new(vec![Split::Train, Split::Test], None),
                &mut recorder,
            )
            .unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "start train Some(2)",
                "train_00001.wav Written",
                "train_00002.wav Written",
                "finish train",
                "missing test",
                "finish test",
            ]
        );
        assert_eq!(summary.written(), 2);
        assert_eq!(summary.missing_splits(), vec![Split::Test]);
    }

    #[test]
    fn split_summary_tallies_files_and_rows_separately() {
        let mut summary = SplitSummary::new(Split::Train, SplitStatus::Completed);
        summary.tally(FileOutcome::Written, RecordOutcome::Written);
        summary.tally(FileOutcome::AlreadyPresent, RecordOutcome::Written);
        summary.tally(FileOutcome::AlreadyPresent, RecordOutcome::Skipped);

        assert_eq!(summary.files_written, 1);
        assert_eq!(summary.files_present, 2);
        assert_eq!(summary.written, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.records(), 3);
    }

    #[test]
    fn decode_error_rolls_back_the_split_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad_rows = rows(2);
        bad_rows.push(SourceRow {
            audio: AudioBlob::new(vec![0u8; 32]),
            transcript: "corrupt".to_string(),
        });
        let dataset = MemoryDataset::new("mem").with_split(Split::Train, bad_rows);
        let mut ingestor = Ingestor::new(
            dataset,
            AudioMaterializer::new(dir.path()),
            Catalog::open_in_memory().unwrap(),
        );

        let err = ingestor
            .run(&IngestRequest::all(), &mut NullObserver)
            .unwrap_err();

        assert!(matches!(err, IngestError::Decode { .. }));
        assert_eq!(ingestor.catalog().count().unwrap(), 0);
        // Files written before the failure stay; the next run reuses them.
        assert!(dir.path().join("train_00002.wav").exists());
    }
}
