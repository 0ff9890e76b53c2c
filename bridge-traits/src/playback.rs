//! Decoder bridge traits and supporting audio types.
//!
//! The host's player picks a [`Decoder`] per file (by extension, MIME type or
//! by sniffing the stream), opens a [`DecoderSession`] and pulls PCM from it on
//! its playback thread. Everything crossing this boundary is a plain value:
//! sessions never return errors, they report them through
//! [`DecoderErrorRecord`] and sentinel return values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::path::Path;

use crate::stream::{IoStream, SharedStream};

// ============================================================================
// Tags
// ============================================================================

/// Metadata describing a file or the active section of a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Track number within the album
    pub track: Option<i32>,
    /// Total duration in seconds
    pub time: Option<u32>,
}

impl TagRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Facets requested from [`Decoder::info`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TagsSelect(u8);

impl TagsSelect {
    /// Total duration.
    pub const TIME: Self = Self(0b01);
    /// Title, artist, album and track number.
    pub const COMMENTS: Self = Self(0b10);
    /// Every facet.
    pub const ALL: Self = Self(0b11);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TagsSelect {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TagsSelect {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ============================================================================
// Sound parameters
// ============================================================================

/// PCM sample encoding of decoded output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    U8,
    S8,
    #[default]
    S16Le,
    S16Be,
    S32Le,
    FloatLe,
}

impl SampleFormat {
    /// Size of one sample in bytes.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U8 | SampleFormat::S8 => 1,
            SampleFormat::S16Le | SampleFormat::S16Be => 2,
            SampleFormat::S32Le | SampleFormat::FloatLe => 4,
        }
    }
}

/// Format of the PCM returned by the most recent decode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundParams {
    pub channels: u16,
    pub rate: u32,
    pub format: SampleFormat,
}

impl SoundParams {
    /// Bytes per interleaved frame.
    pub fn frame_size(&self) -> usize {
        self.channels as usize * self.format.bytes_per_sample()
    }
}

// ============================================================================
// Error record
// ============================================================================

/// Severity of a [`DecoderErrorRecord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No error.
    #[default]
    None,
    /// Recoverable corruption inside the stream; decoding continues.
    Stream,
    /// The session cannot decode at all.
    Fatal,
}

/// Last error reported by a decoder session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderErrorRecord {
    pub kind: ErrorKind,
    /// Decoder-specific sub-code, 0 when unused.
    pub code: i32,
    pub message: Option<String>,
}

impl DecoderErrorRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to "no error".
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Replace the record's contents.
    pub fn set(&mut self, kind: ErrorKind, code: i32, message: impl Into<String>) {
        self.kind = kind;
        self.code = code;
        self.message = Some(message.into());
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::Fatal
    }

    pub fn is_set(&self) -> bool {
        self.kind != ErrorKind::None
    }
}

impl fmt::Display for DecoderErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.message) {
            (ErrorKind::None, _) => write!(f, "no error"),
            (kind, Some(message)) => write!(f, "{:?}: {}", kind, message),
            (kind, None) => write!(f, "{:?}", kind),
        }
    }
}

// ============================================================================
// Decoder contract
// ============================================================================

/// A format plugin registered with the host player.
pub trait Decoder: Send + Sync {
    /// Short display name of the format (at most three characters).
    fn name(&self, path: &Path) -> &'static str;

    /// Whether a file extension belongs to this format.
    fn matches_extension(&self, ext: &str) -> bool;

    /// Whether a MIME type belongs to this format.
    fn matches_mime(&self, mime: &str) -> bool;

    /// Inspect the head of `stream` without consuming it.
    fn can_decode(&self, stream: &mut dyn IoStream) -> bool;

    /// Open a session for the file at `path`.
    ///
    /// Always returns a session; check [`DecoderSession::is_ok`] and
    /// [`DecoderSession::error`] before decoding.
    fn open(&self, path: &Path) -> Box<dyn DecoderSession>;

    /// Open a session over a stream the host already opened.
    fn open_stream(&self, stream: Box<dyn IoStream>) -> Box<dyn DecoderSession>;

    /// Fill the requested facets of `tags` for the file at `path`.
    ///
    /// Best-effort: facets that cannot be read are left untouched.
    fn info(&self, path: &Path, tags: &mut TagRecord, select: TagsSelect);
}

/// An open decode session.
pub trait DecoderSession: Send {
    /// Whether the session opened successfully.
    fn is_ok(&self) -> bool;

    /// Decode PCM into `buf`, describing it in `params`.
    ///
    /// Returns the number of bytes written; 0 means end of stream.
    fn decode(&mut self, buf: &mut [u8], params: &mut SoundParams) -> usize;

    /// Seek to `sec` seconds. Returns the new position, or `None` on failure.
    fn seek(&mut self, sec: u32) -> Option<u32>;

    /// Current bitrate in kbps.
    fn bitrate(&self) -> u32;

    /// Total duration in seconds, if known.
    fn duration(&self) -> Option<u32>;

    /// Copy of the last error.
    fn error(&self) -> DecoderErrorRecord;

    /// Copy the current tags into `tags`.
    ///
    /// Returns `true` the first time it is called after the tags changed.
    fn current_tags(&mut self, tags: &mut TagRecord) -> bool;

    /// The stream being decoded, if one was acquired.
    fn stream(&self) -> Option<SharedStream>;

    /// Release the session and, if it opened successfully, its stream.
    fn close(self: Box<Self>);
}
