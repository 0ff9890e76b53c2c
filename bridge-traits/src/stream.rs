//! Stream I/O Abstractions
//!
//! Decoder plugins never own file descriptors. Every byte they consume comes
//! through an [`IoStream`] handed to them by the host, either directly or via a
//! [`StreamFactory`] for path-based opens.

use bytes::Bytes;
use parking_lot::Mutex;
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;

use crate::error::{BridgeError, Result};

/// Origin for [`IoStream::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Absolute offset from the start of the stream.
    Set,
    /// Offset relative to the current position.
    Current,
    /// Offset relative to the end of the stream.
    End,
}

impl Whence {
    /// Convert an `(offset, whence)` pair to a std `SeekFrom`.
    ///
    /// A negative absolute offset is rejected.
    pub fn to_seek_from(self, offset: i64) -> Result<SeekFrom> {
        match self {
            Whence::Set => u64::try_from(offset)
                .map(SeekFrom::Start)
                .map_err(|_| BridgeError::InvalidSeek(format!("negative offset {}", offset))),
            Whence::Current => Ok(SeekFrom::Current(offset)),
            Whence::End => Ok(SeekFrom::End(offset)),
        }
    }
}

/// Result of a raw read from an [`IoStream`].
///
/// End of stream and I/O failure are distinct variants so callers never have
/// to inspect ambient state to tell an empty read from a failed one.
#[derive(Debug)]
pub enum ReadOutcome {
    /// `n > 0` bytes were written to the front of the buffer.
    Data(usize),
    /// No more bytes are available.
    Eof,
    /// The underlying source failed.
    Error(BridgeError),
}

impl ReadOutcome {
    /// Returns `true` for [`ReadOutcome::Eof`].
    pub fn is_eof(&self) -> bool {
        matches!(self, ReadOutcome::Eof)
    }
}

/// Byte stream provided by the host.
///
/// Implementations wrap local files, network sources or memory buffers. A
/// stream may be returned in a failed state (see [`is_ok`](Self::is_ok));
/// callers check it before use and may still call [`close`](Self::close).
pub trait IoStream: Send {
    /// Read up to `buf.len()` bytes.
    fn read(&mut self, buf: &mut [u8]) -> ReadOutcome;

    /// Copy up to `buf.len()` bytes from the current position without
    /// advancing it.
    fn peek(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Move the read position, returning the new absolute offset.
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64>;

    /// Current absolute read position.
    fn tell(&mut self) -> Result<u64>;

    /// Release the underlying source. Further reads fail.
    fn close(&mut self);

    /// Whether the stream opened successfully and has not failed since.
    fn is_ok(&self) -> bool;

    /// Human-readable description of the last failure.
    fn describe_error(&self) -> String;

    /// Whether [`seek`](Self::seek) can move backwards and to the end.
    fn is_seekable(&self) -> bool {
        true
    }
}

/// Stream handle shared between a decode session and the codec reading from it.
///
/// The session is the only caller at any time; the lock exists because the
/// codec library has to own its byte source.
pub type SharedStream = Arc<Mutex<Box<dyn IoStream>>>;

/// Wrap a stream for sharing.
pub fn share(stream: Box<dyn IoStream>) -> SharedStream {
    Arc::new(Mutex::new(stream))
}

/// Opens streams by path.
pub trait StreamFactory: Send + Sync {
    /// Open `path` for reading.
    ///
    /// Always returns a stream; failures are reported through
    /// [`IoStream::is_ok`] and [`IoStream::describe_error`].
    fn open(&self, path: &Path) -> Box<dyn IoStream>;
}

/// In-memory stream over encoded audio bytes.
///
/// Used for pre-fetched or cached data and as a test double.
#[derive(Debug, Clone)]
pub struct MemoryStream {
    data: Bytes,
    position: u64,
    seekable: bool,
    closed: bool,
    error: Option<String>,
}

impl MemoryStream {
    /// Create a seekable stream over `data`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            seekable: true,
            closed: false,
            error: None,
        }
    }

    /// Create a forward-only stream over `data`.
    ///
    /// Only `seek(0, Whence::Current)` succeeds, which is enough for `tell`.
    pub fn unseekable(data: impl Into<Bytes>) -> Self {
        Self {
            seekable: false,
            ..Self::new(data)
        }
    }

    /// Create a stream that failed to open.
    pub fn failed(description: impl Into<String>) -> Self {
        Self {
            error: Some(description.into()),
            ..Self::new(Bytes::new())
        }
    }

    /// Returns `true` once [`IoStream::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn remaining(&self) -> &[u8] {
        let start = self.position.min(self.len()) as usize;
        &self.data[start..]
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(BridgeError::StreamClosed("memory stream".to_string()));
        }
        if let Some(error) = &self.error {
            return Err(BridgeError::OperationFailed(error.clone()));
        }
        Ok(())
    }
}

impl IoStream for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> ReadOutcome {
        if let Err(e) = self.check_open() {
            return ReadOutcome::Error(e);
        }

        let remaining = self.remaining();
        if remaining.is_empty() {
            return ReadOutcome::Eof;
        }

        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n as u64;
        ReadOutcome::Data(n)
    }

    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check_open()?;

        let remaining = self.remaining();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        Ok(n)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        self.check_open()?;

        if !self.seekable && !(whence == Whence::Current && offset == 0) {
            return Err(BridgeError::InvalidSeek("stream is not seekable".to_string()));
        }

        let base = match whence.to_seek_from(offset)? {
            SeekFrom::Start(pos) => {
                self.position = pos;
                return Ok(pos);
            }
            SeekFrom::Current(_) => self.position as i64,
            SeekFrom::End(_) => self.len() as i64,
        };

        let target = base
            .checked_add(offset)
            .filter(|t| *t >= 0)
            .ok_or_else(|| BridgeError::InvalidSeek(format!("offset {} from {}", offset, base)))?;

        self.position = target as u64;
        Ok(self.position)
    }

    fn tell(&mut self) -> Result<u64> {
        self.check_open()?;
        Ok(self.position)
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn describe_error(&self) -> String {
        self.error.clone().unwrap_or_default()
    }

    fn is_seekable(&self) -> bool {
        self.seekable
    }
}
