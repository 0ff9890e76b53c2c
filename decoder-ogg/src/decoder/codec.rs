//! # Codec Seam
//!
//! The decode and probe sessions drive the Vorbis codec through these traits
//! only. [`super::SymphoniaBackend`] is the production implementation; tests
//! substitute scripted codecs.

use crate::error::CodecError;
use crate::stream_adapter::StreamAdapter;

/// How much work the codec does up front when opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Full open: the codec may seek around the stream to learn its total
    /// length, so duration and seeking are available.
    Full,
    /// Header-only open: headers and comments are read, nothing else. The
    /// stream is presented as unseekable.
    Test,
}

/// Channel layout and sample rate of the current section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamInfo {
    pub channels: u16,
    pub rate: u32,
}

/// Outcome of one [`VorbisCodec::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecRead {
    /// The last section has been fully decoded.
    Eof,
    /// Corrupt or missing data; the codec skipped it and can be read again.
    Hole(String),
    /// `bytes > 0` bytes of interleaved signed 16-bit little-endian PCM were
    /// written, decoded from logical section `section`.
    Samples { bytes: usize, section: u32 },
}

/// An open Vorbis codec bound to one stream.
pub trait VorbisCodec: Send {
    /// Decode PCM into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> CodecRead;

    /// Stream parameters of the current section.
    fn info(&self) -> StreamInfo;

    /// Raw `KEY=value` comments of the current section.
    fn comments(&self) -> Vec<String>;

    /// Average bitrate in bits per second, 0 or less if unknown.
    fn bitrate(&self) -> i64;

    /// Bitrate in bits per second over the data decoded since the previous
    /// call. 0 or less means no reading is available.
    fn bitrate_instant(&mut self) -> i64;

    /// Total duration in whole seconds, `None` if it cannot be computed.
    fn time_total(&self) -> Option<u32>;

    /// Reposition decoding to `secs` seconds from the start.
    fn time_seek(&mut self, secs: u32) -> Result<(), CodecError>;
}

/// Opens [`VorbisCodec`]s over host streams.
pub trait VorbisBackend: Send + Sync {
    /// Read the stream headers through `adapter` and return a ready codec.
    ///
    /// The adapter's [`OpenMode`] decides how much of the stream is read.
    fn open(&self, adapter: StreamAdapter) -> Result<Box<dyn VorbisCodec>, CodecError>;
}
