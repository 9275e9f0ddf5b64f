//! Terminal rendering of an ingest run: startup banner, per-split progress
//! bars and the final summary. Everything goes to stderr.

use crate::audio::Materialized;
use crate::catalog::RecordOutcome;
use crate::config::Layout;
use crate::error::IngestError;
use crate::pipeline::{IngestObserver, IngestRequest, IngestSummary, SplitSummary};
use crate::split::Split;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Print where the run reads from and writes to.
pub fn print_banner(dataset: &str, layout: &Layout, request: &IngestRequest) {
    let splits: Vec<&str> = request
        .unique_splits()
        .into_iter()
        .map(Split::as_str)
        .collect();
    let limit = request
        .limit
        .map_or_else(|| "all".to_string(), |n| n.to_string());

    eprintln!("speech-ingest {}", crate::version_string());
    eprintln!("  {}   {}", "Dataset:".dimmed(), dataset);
    eprintln!("  {} {}", "Cache dir:".dimmed(), layout.cache_dir.display());
    eprintln!("  {}   {}", "Catalog:".dimmed(), layout.catalog_path.display());
    eprintln!("  {} {}", "Audio out:".dimmed(), layout.output_dir.display());
    eprintln!("  {}    {}", "Splits:".dimmed(), splits.join(", "));
    eprintln!("  {}     {}", "Limit:".dimmed(), limit);
    eprintln!();
}

/// Final one-line tally.
pub fn format_summary(summary: &IngestSummary) -> String {
    format!(
        "Ingest complete: {} written, {} skipped (already existed).",
        summary.written(),
        summary.skipped()
    )
}

pub fn print_summary(summary: &IngestSummary) {
    eprintln!();
    eprintln!("{}", format_summary(summary).green());
    let missing = summary.missing_splits();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.into_iter().map(Split::as_str).collect();
        eprintln!(
            "{}",
            format!("Splits not found in dataset: {}", names.join(", ")).yellow()
        );
    }
}

fn split_done_line(summary: &SplitSummary) -> String {
    format!(
        "'{}' done: {} written, {} skipped ({} new files)",
        summary.split, summary.written, summary.skipped, summary.files_written
    )
}

/// Progress observer for interactive runs.
pub struct ConsoleObserver {
    quiet: bool,
    bar: Option<ProgressBar>,
}

impl ConsoleObserver {
    pub fn new(quiet: bool) -> Self {
        Self { quiet, bar: None }
    }

    fn progress_bar(&self, planned: Option<usize>) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        match planned {
            Some(total) => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(
                    // SAFETY: hardcoded template string, always valid
                    #[allow(clippy::expect_used)]
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                        .expect("hardcoded progress bar template")
                        .progress_chars("#>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    // SAFETY: hardcoded template string, always valid
                    #[allow(clippy::expect_used)]
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {pos} records {msg}")
                        .expect("hardcoded spinner template"),
                );
                pb
            }
        }
    }
}

impl ConsoleObserver {
    /// Notice for a split the dataset lacks; quiet runs rely on the log warning.
    fn split_missing_line(&self, split: Split) -> Option<String> {
        (!self.quiet).then(|| format!("Split '{split}' not found, skipping."))
    }
}

impl IngestObserver for ConsoleObserver {
    fn split_started(&mut self, split: Split, planned: Option<usize>) {
        if !self.quiet {
            match planned {
                Some(n) => eprintln!("Processing split '{split}' ({n} records)..."),
                None => eprintln!("Processing split '{split}'..."),
            }
        }
        self.bar = Some(self.progress_bar(planned));
    }

    fn record_done(&mut self, materialized: &Materialized, _outcome: RecordOutcome) {
        if let Some(pb) = &self.bar {
            pb.set_message(materialized.descriptor.file_name.clone());
            pb.inc(1);
        }
    }

    fn split_missing(&mut self, split: Split, _error: &IngestError) {
        if let Some(line) = self.split_missing_line(split) {
            eprintln!("{}", line.yellow());
        }
    }

    fn split_finished(&mut self, summary: &SplitSummary) {
        let Some(pb) = self.bar.take() else {
            return;
        };
        pb.finish_and_clear();
        if !self.quiet {
            eprintln!("  {}", split_done_line(summary).green());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SplitStatus;

    fn split_summary(split: Split, written: usize, skipped: usize) -> SplitSummary {
        SplitSummary {
            split,
            status: SplitStatus::Completed,
            written,
            skipped,
            files_written: written,
            files_present: skipped,
        }
    }

    #[test]
    fn summary_line_counts_written_and_skipped() {
        let summary = IngestSummary {
            splits: vec![
                split_summary(Split::Train, 3, 2),
                split_summary(Split::Test, 1, 0),
            ],
        };
        assert_eq!(
            format_summary(&summary),
            "Ingest complete: 4 written, 2 skipped (already existed)."
        );
    }

    #[test]
    fn split_done_line_mentions_new_files() {
        assert_eq!(
            split_done_line(&split_summary(Split::Validation, 5, 1)),
            "'validation' done: 5 written, 1 skipped (5 new files)"
        );
    }

    #[test]
    fn quiet_observer_uses_hidden_bar() {
        let observer = ConsoleObserver::new(true);
        assert!(observer.progress_bar(Some(10)).is_hidden());
    }

    #[test]
    fn missing_split_notice_respects_quiet() {
        assert_eq!(
            ConsoleObserver::new(false).split_missing_line(Split::Test),
            Some("Split 'test' not found, skipping.".to_string())
        );
        assert_eq!(ConsoleObserver::new(true).split_missing_line(Split::Test), None);
    }

    #[test]
    fn finishing_without_start_is_harmless() {
        let mut observer = ConsoleObserver::new(true);
        observer.split_finished(&split_summary(Split::Train, 0, 0));
        assert!(observer.bar.is_none());
    }
}
