//! WAV file output.

use crate::audio::decode::DecodedAudio;
use crate::defaults::OUTPUT_BITS_PER_SAMPLE;
use crate::error::{IngestError, Result};
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

/// Suffix of the in-progress file renamed into place once complete.
const PARTIAL_SUFFIX: &str = "part";

fn spec_for(audio: &DecodedAudio) -> hound::WavSpec {
    hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: OUTPUT_BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Encode `audio` as 16-bit PCM WAV into any seekable writer.
pub fn encode_wav<W: Write + Seek>(writer: W, audio: &DecodedAudio) -> hound::Result<()> {
    let mut wav_writer = hound::WavWriter::new(writer, spec_for(audio))?;
    for &sample in &audio.samples {
        wav_writer.write_sample(sample)?;
    }
    wav_writer.finalize()
}

/// Path of the temporary file used while `path` is being written.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Write `audio` to `path`, so that `path` only ever exists complete.
///
/// The data goes to a `.part` sibling first and is renamed into place.
pub fn write_wav(path: &Path, audio: &DecodedAudio) -> Result<()> {
    let partial = partial_path(path);
    let written = fs::File::create(&partial)
        .map_err(|e| e.to_string())
        .and_then(|file| {
            encode_wav(std::io::BufWriter::new(file), audio).map_err(|e| e.to_string())
        });

    if let Err(message) = written {
        if let Err(e) = fs::remove_file(&partial)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!("Failed to remove partial file {}: {e}", partial.display());
        }
        return Err(IngestError::AudioWrite {
            path: path.display().to_string(),
            message,
        });
    }

    fs::rename(&partial, path)?;
    Ok(())
}
