//! Hugging Face Hub dataset source.
//!
//! Resolves the parquet data files of a dataset repository, assigns them to
//! splits by file name, downloads each shard into the local cache the first
//! time the reader reaches it and streams rows with the parquet record API.

use super::{AudioBlob, DatasetSource, SourceRow, SplitRows};
use crate::config::{Config, Layout};
use crate::error::{IngestError, Result};
use crate::split::Split;
use hf_hub::api::sync::{ApiBuilder, ApiRepo};
use hf_hub::{Cache, Repo, RepoType};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::reader::RowIter;
use parquet::record::{Field, Row};
use std::fs::File;
use std::path::{Path, PathBuf};

const PARQUET_EXTENSION: &str = "parquet";

/// Everything needed to reach one dataset on the Hub.
#[derive(Debug, Clone, PartialEq)]
pub struct HubSettings {
    pub dataset: String,
    pub revision: String,
    pub token: Option<String>,
    pub cache_dir: PathBuf,
    pub audio_column: String,
    pub transcript_column: String,
    /// Show hf-hub download progress bars.
    pub progress: bool,
}

impl HubSettings {
    pub fn from_config(config: &Config, layout: &Layout) -> Self {
        Self {
            dataset: config.dataset.id.clone(),
            revision: config.dataset.revision.clone(),
            token: config.dataset.token.clone(),
            cache_dir: layout.cache_dir.clone(),
            audio_column: config.dataset.audio_column.clone(),
            transcript_column: config.dataset.transcript_column.clone(),
            progress: false,
        }
    }

    fn repo(&self) -> Repo {
        Repo::with_revision(
            self.dataset.clone(),
            RepoType::Dataset,
            self.revision.clone(),
        )
    }
}

/// A dataset repository on the Hub, read split by split.
pub struct HubDataset {
    settings: HubSettings,
    repo: ApiRepo,
    data_files: Vec<String>,
}

impl HubDataset {
    /// Connect to the Hub and list the repository's parquet data files.
    pub fn open(settings: HubSettings) -> Result<Self> {
        let api = ApiBuilder::new()
            .with_cache_dir(settings.cache_dir.clone())
            .with_token(settings.token.clone())
            .with_progress(settings.progress)
            .build()
            .map_err(|e| IngestError::Source {
                message: format!("failed building hf-hub client: {e}"),
            })?;
        let repo = api.repo(settings.repo());

        log::info!(
            "Reading file list for dataset {} ({})",
            settings.dataset,
            settings.revision
        );
        let info = repo.info().map_err(|e| IngestError::Source {
            message: format!("failed reading repository info for {}: {e}", settings.dataset),
        })?;

        let mut data_files: Vec<String> = info
            .siblings
            .into_iter()
            .map(|sibling| sibling.rfilename)
            .filter(|name| is_parquet(name))
            .collect();
        data_files.sort();
        log::debug!("{} parquet data files found", data_files.len());

        Ok(Self {
            settings,
            repo,
            data_files,
        })
    }

    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }

    /// Data files belonging to `split`, in stable order.
    pub fn shards_for(&self, split: Split) -> Vec<String> {
        shards_for(&self.data_files, split)
    }

    fn open_shard(&self, shard: &str) -> Result<RowIter<'static>> {
        log::info!("Fetching shard {shard}");
        let path = self.repo.get(shard).map_err(|e| IngestError::Source {
            message: format!("failed downloading '{shard}' from hf-hub: {e}"),
        })?;
        read_shard(&path)
    }
}

/// Row count from parquet footers, only when every shard is already cached.
fn cached_total(settings: &HubSettings, shards: &[String]) -> Option<usize> {
    let cache = Cache::new(settings.cache_dir.clone()).repo(settings.repo());
    let mut total = 0usize;
    for shard in shards {
        let path = cache.get(shard)?;
        let reader = SerializedFileReader::new(File::open(path).ok()?).ok()?;
        let rows = usize::try_from(reader.metadata().file_metadata().num_rows()).ok()?;
        total = total.saturating_add(rows);
    }
    Some(total)
}

fn read_shard(path: &Path) -> Result<RowIter<'static>> {
    let file = File::open(path)?;
    let reader = SerializedFileReader::new(file).map_err(|e| IngestError::Source {
        message: format!("failed reading parquet metadata {}: {e}", path.display()),
    })?;
    Ok(RowIter::from_file_into(Box::new(reader)))
}

impl DatasetSource for HubDataset {
    fn name(&self) -> &str {
        &self.settings.dataset
    }

    fn open_split(&self, split: Split) -> Result<SplitRows<'_>> {
        let shards = self.shards_for(split);
        if shards.is_empty() {
            return Err(IngestError::SplitNotFound {
                split,
                dataset: self.settings.dataset.clone(),
            });
        }
        log::debug!("Split {split}: shards {shards:?}");
        let total = cached_total(&self.settings, &shards);
        Ok(SplitRows::new(
            total,
            ShardRows {
                dataset: self,
                pending: shards.into_iter(),
                current: None,
                done: false,
            },
        ))
    }
}

/// Rows of several shards chained in order; a shard is fetched only when reached.
struct ShardRows<'a> {
    dataset: &'a HubDataset,
    pending: std::vec::IntoIter<String>,
    current: Option<RowIter<'static>>,
    done: bool,
}

impl Iterator for ShardRows<'_> {
    type Item = Result<SourceRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(rows) = self.current.as_mut() {
                match rows.next() {
                    Some(Ok(row)) => {
                        let settings = &self.dataset.settings;
                        return Some(source_row(
                            &row,
                            &settings.audio_column,
                            &settings.transcript_column,
                        ));
                    }
                    Some(Err(e)) => {
                        self.done = true;
                        return Some(Err(IngestError::Source {
                            message: format!("failed reading parquet row: {e}"),
                        }));
                    }
                    None => self.current = None,
                }
                continue;
            }
            let shard = self.pending.next()?;
            match self.dataset.open_shard(&shard) {
                Ok(rows) => self.current = Some(rows),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn is_parquet(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PARQUET_EXTENSION))
}

/// Select the data files of `split` from a repository listing.
///
/// A file belongs to a split when one of the split's aliases appears as a
/// whole token of its stem (`data/train-00000-of-00004.parquet`,
/// `data/shona_validation.parquet`), or when any parent directory is an
/// alias (`default/train/0000.parquet`).
fn shards_for(files: &[String], split: Split) -> Vec<String> {
    let mut shards: Vec<String> = files
        .iter()
        .filter(|name| is_parquet(name) && belongs_to(name, split))
        .cloned()
        .collect();
    shards.sort();
    shards
}

/// Separators between name tokens in shard file stems.
fn is_token_boundary(c: char) -> bool {
    matches!(c, '-' | '_' | '.' | ' ') || c.is_ascii_digit()
}

fn belongs_to(name: &str, split: Split) -> bool {
    let path = Path::new(name);
    let aliases = split.aliases();

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if stem
        .split(is_token_boundary)
        .any(|token| aliases.contains(&token))
    {
        return true;
    }

    path.parent()
        .into_iter()
        .flat_map(Path::components)
        .filter_map(|component| component.as_os_str().to_str())
        .any(|dir| aliases.contains(&dir.to_ascii_lowercase().as_str()))
}

/// Extract the audio blob and transcript from one parquet row.
fn source_row(row: &Row, audio_column: &str, transcript_column: &str) -> Result<SourceRow> {
    let mut audio = None;
    let mut transcript = None;
    for (name, field) in row.get_column_iter() {
        if name == audio_column {
            audio = Some(audio_blob(audio_column, field)?);
        } else if name == transcript_column {
            transcript = Some(text(transcript_column, field)?);
        }
    }

    let audio = audio.ok_or_else(|| missing_column(audio_column))?;
    let transcript = transcript.ok_or_else(|| missing_column(transcript_column))?;
    Ok(SourceRow { audio, transcript })
}

/// The audio column is either the `{bytes, path}` struct or a plain binary column.
fn audio_blob(column: &str, field: &Field) -> Result<AudioBlob> {
    match field {
        Field::Bytes(bytes) => Ok(AudioBlob::new(bytes.data().to_vec())),
        Field::Group(group) => {
            let mut bytes = None;
            let mut path = None;
            for (name, value) in group.get_column_iter() {
                match (name.as_str(), value) {
                    ("bytes", Field::Bytes(data)) => bytes = Some(data.data().to_vec()),
                    ("path", Field::Str(p)) => path = Some(p.clone()),
                    _ => {}
                }
            }
            let bytes = bytes.ok_or_else(|| IngestError::Source {
                message: format!("column '{column}' has no embedded audio bytes"),
            })?;
            Ok(AudioBlob { bytes, path })
        }
        other => Err(IngestError::Source {
            message: format!("column '{column}' is not audio: {other}"),
        }),
    }
}

fn text(column: &str, field: &Field) -> Result<String> {
    match field {
        Field::Str(s) => Ok(s.clone()),
        other => Err(IngestError::Source {
            message: format!("column '{column}' is not text: {other}"),
        }),
    }
}

fn missing_column(column: &str) -> IngestError {
    IngestError::Source {
        message: format!("row has no '{column}' column"),
    }
}
