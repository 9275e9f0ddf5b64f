//! Audio handling: container decoding, WAV writing and per-record materialization.

pub mod decode;
pub mod materialize;
pub mod wav;

pub use decode::{DecodedAudio, decode};
pub use materialize::{AudioMaterializer, FileDescriptor, FileOutcome, Materialized, file_name_for};
