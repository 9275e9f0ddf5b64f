//! Decode an encoded audio blob into interleaved 16-bit PCM.
//!
//! Any container symphonia probes (WAV, FLAC, OGG/Vorbis, MP3) is accepted.
//! The channel layout and sample rate of the source are kept as-is.

use crate::defaults::DURATION_DECIMALS;
use crate::source::AudioBlob;
use std::io::{Cursor, ErrorKind};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// PCM samples of one recording, interleaved by channel.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<i16>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Samples per channel.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / usize::from(self.channels)
    }

    /// Length in seconds, rounded to millisecond precision.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        round_duration(self.frames() as f64 / f64::from(self.sample_rate))
    }
}

/// Round to the number of decimals stored in the catalog.
pub fn round_duration(seconds: f64) -> f64 {
    let scale = 10f64.powi(DURATION_DECIMALS);
    (seconds * scale).round() / scale
}

/// Decode a whole blob.
///
/// # Errors
///
/// Returns a description of the failure when the bytes are not a recognised
/// container, hold no decodable track, or not a single packet decodes.
/// Individual damaged packets are skipped.
pub fn decode(blob: AudioBlob) -> Result<DecodedAudio, String> {
    let mut hint = Hint::new();
    if let Some(ext) = blob.format_hint() {
        hint.with_extension(&ext);
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(blob.bytes)), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| format!("unrecognised audio container: {e}"))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| "no decodable audio track".to_string())?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| format!("unsupported codec: {e}"))?;

    let mut sample_rate = params.sample_rate;
    let mut channels = params.channels.map(|c| c.count());
    let mut samples: Vec<i16> = Vec::new();
    let mut tally = PacketTally::default();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(format!("failed reading packet: {e}")),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(e) if is_recoverable(&e) => {
                log::debug!("Skipping damaged packet: {e}");
                tally.skipped += 1;
                continue;
            }
            Err(e) => return Err(format!("failed decoding packet: {e}")),
        };
        tally.decoded += 1;
        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channels.get_or_insert(spec.channels.count());

        let mut buffer = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }
    tally.finish()?;

    let sample_rate = sample_rate
        .filter(|&rate| rate > 0)
        .ok_or_else(|| "missing sample rate".to_string())?;
    let channels = channels
        .and_then(|count| u16::try_from(count).ok())
        .filter(|&count| count > 0)
        .ok_or_else(|| "missing channel layout".to_string())?;

    Ok(DecodedAudio {
        samples,
        channels,
        sample_rate,
    })
}

/// A damaged packet only loses its own frames; the container is still sound.
fn is_recoverable(err: &SymphoniaError) -> bool {
    matches!(err, SymphoniaError::DecodeError(_))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PacketTally {
    decoded: usize,
    skipped: usize,
}

impl PacketTally {
    fn finish(self) -> Result<(), String> {
        if self.skipped == 0 {
            return Ok(());
        }
        if self.decoded == 0 {
            return Err(format!("all {} packets failed to decode", self.skipped));
        }
        log::warn!(
            "Skipped {} damaged packets ({} decoded)",
            self.skipped,
            self.decoded
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_wav_data(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn decode_16khz_mono_matches_exactly() {
        let input_samples = vec![100i16, -200, 300, -400, 500];
        let blob = AudioBlob::new(make_wav_data(16000, 1, &input_samples));

        let audio = decode(blob).unwrap();

        assert_eq!(audio.samples, input_samples);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.sample_rate, 16000);
    }

    #[test]
    fn decode_keeps_stereo_layout() {
        let stereo_samples = vec![100i16, 200, 300, 400, 500, 600];
        let blob = AudioBlob::with_path(make_wav_data(44100, 2, &stereo_samples), "clip.wav");

        let audio = decode(blob).unwrap();

        assert_eq!(audio.channels, 2);
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.samples, stereo_samples);
        assert_eq!(audio.frames(), 3);
    }

    #[test]
    fn two_seconds_at_16khz_is_two_seconds() {
        let blob = AudioBlob::new(make_wav_data(16000, 1, &vec![0i16; 32000]));
        let audio = decode(blob).unwrap();
        assert_eq!(audio.duration_seconds(), 2.0);
    }

    #[test]
    fn duration_is_rounded_to_milliseconds() {
        // 12345 frames at 16 kHz = 0.7715625 s
        let blob = AudioBlob::new(make_wav_data(16000, 1, &vec![0i16; 12345]));
        let audio = decode(blob).unwrap();
        assert_eq!(audio.duration_seconds(), 0.772);
    }

    #[test]
    fn round_duration_examples() {
        assert_eq!(round_duration(1.23449), 1.234);
        assert_eq!(round_duration(1.2345001), 1.235);
        assert_eq!(round_duration(0.0), 0.0);
    }

    #[test]
    fn garbage_is_rejected() {
        let garbage: Vec<u8> = (0..500).map(|i| ((i * 17 + 42) % 256) as u8).collect();
        let err = decode(AudioBlob::new(garbage)).unwrap_err();
        assert!(err.contains("unrecognised audio container"), "{err}");
    }

    #[test]
    fn empty_blob_is_rejected() {
        assert!(decode(AudioBlob::new(Vec::new())).is_err());
    }

    #[test]
    fn truncated_header_is_rejected() {
        assert!(decode(AudioBlob::new(b"RIFF\x00\x00".to_vec())).is_err());
    }

    #[test]
    fn frames_of_empty_layout_is_zero() {
        let audio = DecodedAudio {
            samples: vec![1, 2, 3],
            channels: 0,
            sample_rate: 16000,
        };
        assert_eq!(audio.frames(), 0);
    }

    #[test]
    fn only_packet_decode_errors_are_recoverable() {
        assert!(is_recoverable(&SymphoniaError::DecodeError(
            "mpa: invalid main_data offset"
        )));
        assert!(!is_recoverable(&SymphoniaError::Unsupported("codec")));
        assert!(!is_recoverable(&SymphoniaError::ResetRequired));
        assert!(!is_recoverable(&SymphoniaError::IoError(
            std::io::Error::other("disk")
        )));
    }

    #[test]
    fn damaged_packets_are_tolerated_while_some_decode() {
        let partly_damaged = PacketTally {
            decoded: 40,
            skipped: 1,
        };
        assert!(partly_damaged.finish().is_ok());
        assert!(PacketTally::default().finish().is_ok());
    }

    #[test]
    fn nothing_decodable_is_an_error() {
        let all_damaged = PacketTally {
            decoded: 0,
            skipped: 3,
        };
        let err = all_damaged.finish().unwrap_err();
        assert!(err.contains("all 3 packets"), "got: {err}");
    }
}
