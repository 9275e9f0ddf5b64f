//! Default configuration constants for speech-ingest.
//!
//! Shared by the config layer, the data source and the materializer so the
//! values that end up in file names and the catalog are defined once.

/// Default Hugging Face dataset repository.
pub const DATASET_ID: &str = "shunyalabs/shona-speech-dataset";

/// Default dataset revision (branch, tag or commit).
pub const DATASET_REVISION: &str = "main";

/// Column holding the audio struct (`{bytes, path}`) or raw audio bytes.
pub const AUDIO_COLUMN: &str = "audio";

/// Column holding the transcript text.
pub const TRANSCRIPT_COLUMN: &str = "transcript";

/// Local copy of the remote dataset, relative to the project root.
pub const CACHE_DIR: &str = "workspace/datasets";

/// One WAV file per ingested record, relative to the project root.
pub const OUTPUT_DIR: &str = "public/audio";

/// SQLite catalog file, relative to the project root.
pub const CATALOG_PATH: &str = "workspace/speech_catalog.db";

/// Width of the zero-padded 1-based ordinal in generated file names.
pub const FILE_INDEX_WIDTH: usize = 5;

/// Extension of materialized audio files.
pub const AUDIO_EXTENSION: &str = "wav";

/// Bit depth of materialized audio files.
pub const OUTPUT_BITS_PER_SAMPLE: u16 = 16;

/// Decimal places kept for catalog durations (millisecond precision).
pub const DURATION_DECIMALS: i32 = 3;
