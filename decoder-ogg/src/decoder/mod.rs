//! # Vorbis Decoder Module
//!
//! Audio decoding for the Ogg Vorbis plugin using the Symphonia library.
//!
//! ## Architecture
//!
//! Sessions talk to the codec through the [`VorbisBackend`] / [`VorbisCodec`]
//! seam. The production backend uses Symphonia's three-layer architecture:
//!
//! 1. **MediaSource**: the host stream, seen through [`crate::StreamAdapter`]
//! 2. **FormatReader**: Ogg demuxer, reads packets and follows chained streams
//! 3. **Decoder**: Vorbis decoder, packets to planar PCM
//!
//! ```text
//! IoStream → StreamAdapter → MediaSourceStream → OggReader → VorbisDecoder → s16le bytes
//! ```
//!
//! ## Threading Model
//!
//! Codecs are `Send` and owned by exactly one session. Nothing here spawns
//! threads or blocks on anything but the host stream.

mod chain;
mod codec;
mod format_detector;
mod sample_converter;
mod symphonia;

pub use self::symphonia::{SymphoniaBackend, SymphoniaVorbis};
pub use codec::{CodecRead, OpenMode, StreamInfo, VorbisBackend, VorbisCodec};
pub use format_detector::FormatDetector;
pub use sample_converter::SampleConverter;
