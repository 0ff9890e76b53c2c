//! # Decode Session
//!
//! Long-lived playback session over one Ogg Vorbis stream.
//!
//! ## Lifecycle
//!
//! ```text
//! open ──stream not ok──▶ StreamFailed
//!   │
//!   ├──codec open failed──▶ OpenFailed
//!   │
//!   └──codec opened──▶ Opened ──close──▶ Closed
//! ```
//!
//! Failed sessions are still returned to the host so it can read the fatal
//! error message. Only an opened session closes its stream on release.

use bridge_traits::{
    share, DecoderErrorRecord, DecoderSession, ErrorKind, IoStream, SampleFormat, SharedStream,
    SoundParams, StreamFactory, TagRecord,
};
use core_runtime::logging::strip_path;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::comments::extract_tags;
use crate::decoder::{CodecRead, OpenMode, VorbisBackend, VorbisCodec};
use crate::error::describe_code;
use crate::stream_adapter::StreamAdapter;

/// Message recorded for corrupt data skipped during a decode call.
const STREAM_ERROR_MESSAGE: &str = "Error in the stream!";

/// Observable state of an [`OggSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The host stream could not be opened.
    StreamFailed,
    /// The stream opened but is not decodable Ogg Vorbis.
    OpenFailed,
    Opened,
    Closed,
}

enum State {
    StreamFailed,
    OpenFailed,
    Opened(Box<dyn VorbisCodec>),
    Closed,
}

/// Tags of the active section plus whether the host has seen them.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TagMailbox {
    Delivered(TagRecord),
    Pending(TagRecord),
}

impl TagMailbox {
    fn tags(&self) -> &TagRecord {
        match self {
            TagMailbox::Delivered(tags) | TagMailbox::Pending(tags) => tags,
        }
    }

    /// Mark the tags as delivered. Returns `true` if they were pending.
    fn deliver(&mut self) -> bool {
        match self {
            TagMailbox::Delivered(_) => false,
            TagMailbox::Pending(tags) => {
                let tags = std::mem::take(tags);
                *self = TagMailbox::Delivered(tags);
                true
            }
        }
    }
}

/// Decode session over one Ogg Vorbis stream.
pub struct OggSession {
    stream: Option<SharedStream>,
    state: State,
    /// Logical section of the last successful decode; `None` before the first.
    section: Option<u32>,
    bitrate_kbps: u32,
    duration: Option<u32>,
    tags: TagMailbox,
    error: DecoderErrorRecord,
}

impl OggSession {
    fn new(stream: Option<SharedStream>, state: State) -> Self {
        Self {
            stream,
            state,
            section: None,
            bitrate_kbps: 0,
            duration: None,
            tags: TagMailbox::Delivered(TagRecord::new()),
            error: DecoderErrorRecord::new(),
        }
    }

    /// Open the file at `path` through `factory`.
    ///
    /// If the stream cannot be opened the session is returned in
    /// [`SessionState::StreamFailed`] with a fatal error naming the cause.
    #[instrument(skip_all)]
    pub fn open_path(
        factory: &dyn StreamFactory,
        path: &Path,
        backend: &dyn VorbisBackend,
    ) -> Self {
        let name = path.to_string_lossy();
        debug!(file = strip_path(&name), "Opening OGG file");

        let mut stream = factory.open(path);
        if !stream.is_ok() {
            let mut session = Self::new(None, State::StreamFailed);
            session.error.set(
                ErrorKind::Fatal,
                0,
                format!("Can't load OGG: {}", stream.describe_error()),
            );
            warn!("{}", session.error);
            stream.close();
            return session;
        }

        Self::open_stream(stream, backend)
    }

    /// Open a session over a stream the host already opened.
    ///
    /// The session closes the stream on release if the codec opened, and
    /// immediately if it did not.
    #[instrument(skip_all)]
    pub fn open_stream(stream: Box<dyn IoStream>, backend: &dyn VorbisBackend) -> Self {
        let stream = share(stream);

        match backend.open(StreamAdapter::new(Arc::clone(&stream), OpenMode::Full)) {
            Ok(codec) => {
                let bitrate_kbps = to_kbps(codec.bitrate());
                let duration = codec.time_total();
                let tags = extract_tags(&codec.comments());
                info!(bitrate_kbps, duration = ?duration, "OGG session opened");

                let mut session = Self::new(Some(stream), State::Opened(codec));
                session.bitrate_kbps = bitrate_kbps;
                session.duration = duration;
                session.tags = TagMailbox::Delivered(tags);
                session
            }
            Err(e) => {
                let message = describe_code(e.code());
                debug!("Codec open error: {}", message);
                stream.lock().close();

                let mut session = Self::new(Some(stream), State::OpenFailed);
                session.error.set(ErrorKind::Fatal, e.code(), message);
                session
            }
        }
    }

    pub fn state(&self) -> SessionState {
        match self.state {
            State::StreamFailed => SessionState::StreamFailed,
            State::OpenFailed => SessionState::OpenFailed,
            State::Opened(_) => SessionState::Opened,
            State::Closed => SessionState::Closed,
        }
    }

    /// Logical section of the most recent successful decode.
    pub fn section(&self) -> Option<u32> {
        self.section
    }

    fn release(&mut self) {
        if let State::Opened(codec) = std::mem::replace(&mut self.state, State::Closed) {
            drop(codec);
            if let Some(stream) = &self.stream {
                stream.lock().close();
            }
            debug!("OGG session closed");
        }
    }
}

/// Bits per second to kbps. Non-positive readings become 0.
fn to_kbps(bps: i64) -> u32 {
    (bps / 1000).clamp(0, i64::from(u32::MAX)) as u32
}

impl DecoderSession for OggSession {
    fn is_ok(&self) -> bool {
        matches!(self.state, State::Opened(_))
    }

    /// Decode into `buf`.
    ///
    /// Corrupt data is skipped and recorded as a stream error; the call keeps
    /// going until it has samples or the stream ends. An empty `buf` or an
    /// unopened session yields 0.
    fn decode(&mut self, buf: &mut [u8], params: &mut SoundParams) -> usize {
        let State::Opened(codec) = &mut self.state else {
            return 0;
        };
        self.error.clear();
        if buf.is_empty() {
            return 0;
        }

        loop {
            match codec.read(buf) {
                CodecRead::Eof => return 0,
                CodecRead::Hole(reason) => {
                    debug!(%reason, "Hole in stream");
                    self.error.set(ErrorKind::Stream, 0, STREAM_ERROR_MESSAGE);
                }
                CodecRead::Samples { bytes, section } => {
                    if self.section != Some(section) {
                        info!(section, "Section change or first section");
                        self.section = Some(section);
                        self.tags = TagMailbox::Pending(extract_tags(&codec.comments()));
                    }

                    let info = codec.info();
                    *params = SoundParams {
                        channels: info.channels,
                        rate: info.rate,
                        format: SampleFormat::S16Le,
                    };

                    let instant = codec.bitrate_instant();
                    if instant > 0 {
                        self.bitrate_kbps = to_kbps(instant);
                    }

                    return bytes;
                }
            }
        }
    }

    fn seek(&mut self, sec: u32) -> Option<u32> {
        let State::Opened(codec) = &mut self.state else {
            return None;
        };

        match codec.time_seek(sec) {
            Ok(()) => Some(sec),
            Err(e) => {
                debug!("Seek to {}s failed: {}", sec, e);
                None
            }
        }
    }

    fn bitrate(&self) -> u32 {
        self.bitrate_kbps
    }

    fn duration(&self) -> Option<u32> {
        self.duration
    }

    fn error(&self) -> DecoderErrorRecord {
        self.error.clone()
    }

    fn current_tags(&mut self, tags: &mut TagRecord) -> bool {
        tags.clone_from(self.tags.tags());
        self.tags.deliver()
    }

    fn stream(&self) -> Option<SharedStream> {
        self.stream.clone()
    }

    fn close(self: Box<Self>) {
        drop(self);
    }
}

impl Drop for OggSession {
    fn drop(&mut self) {
        self.release();
    }
}
