//! Binds the codec library's byte source to a host stream.
//!
//! The codec reads through `std::io::Read` / `std::io::Seek` (and symphonia's
//! `MediaSource`), while the host only offers [`IoStream`] primitives. Host
//! read failures come back as explicit `io::Error`s rather than a zero count.

use bridge_traits::{BridgeError, IoStream, ReadOutcome, SharedStream, Whence};
use std::io::{self, Read, Seek, SeekFrom};
use symphonia::core::io::MediaSource;
use tracing::{debug, warn};

use crate::decoder::OpenMode;

/// Adapter handed to the codec.
///
/// Holds a clone of the session's shared stream handle. Closing the stream is
/// the session's job; [`StreamAdapter::close`] does nothing.
///
/// Clones share the same stream and position.
#[derive(Clone)]
pub struct StreamAdapter {
    stream: SharedStream,
    mode: OpenMode,
    byte_len: Option<u64>,
}

impl StreamAdapter {
    /// Create an adapter over `stream`.
    ///
    /// In [`OpenMode::Full`] the total length is measured up front (and the
    /// position restored) when the stream is seekable.
    pub fn new(stream: SharedStream, mode: OpenMode) -> Self {
        let byte_len = match mode {
            OpenMode::Full => Self::probe_byte_len(&mut **stream.lock()),
            OpenMode::Test => None,
        };

        Self {
            stream,
            mode,
            byte_len,
        }
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Read up to `element_count` elements of `element_size` bytes.
    ///
    /// Returns the number of whole elements read; `Ok(0)` at end of stream.
    pub fn read_elements(
        &mut self,
        buf: &mut [u8],
        element_size: usize,
        element_count: usize,
    ) -> io::Result<usize> {
        if element_size == 0 {
            return Ok(0);
        }

        let wanted = element_size.saturating_mul(element_count).min(buf.len());
        if wanted == 0 {
            return Ok(0);
        }

        match self.stream.lock().read(&mut buf[..wanted]) {
            ReadOutcome::Data(n) => Ok(n / element_size),
            ReadOutcome::Eof => Ok(0),
            ReadOutcome::Error(e) => {
                warn!(error = %e, "Read error");
                Err(into_io_error(e))
            }
        }
    }

    /// Move the stream position, returning the new absolute offset.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> io::Result<u64> {
        debug!(offset, ?whence, "Seek request");
        self.stream.lock().seek(offset, whence).map_err(into_io_error)
    }

    /// Current absolute position.
    pub fn tell(&mut self) -> io::Result<u64> {
        self.stream.lock().tell().map_err(into_io_error)
    }

    /// Always succeeds without touching the stream.
    pub fn close(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn probe_byte_len(stream: &mut dyn IoStream) -> Option<u64> {
        if !stream.is_seekable() {
            return None;
        }

        let current = stream.tell().ok()?;
        let end = stream.seek(0, Whence::End).ok()?;
        stream.seek(current as i64, Whence::Set).ok()?;
        Some(end)
    }
}

fn into_io_error(error: BridgeError) -> io::Error {
    match error {
        BridgeError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

impl Read for StreamAdapter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len();
        self.read_elements(buf, 1, len)
    }
}

impl Seek for StreamAdapter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            SeekFrom::Start(offset) => {
                let offset = i64::try_from(offset).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset out of range")
                })?;
                (offset, Whence::Set)
            }
            SeekFrom::Current(offset) => (offset, Whence::Current),
            SeekFrom::End(offset) => (offset, Whence::End),
        };

        StreamAdapter::seek(self, offset, whence)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        self.tell()
    }
}

impl MediaSource for StreamAdapter {
    fn is_seekable(&self) -> bool {
        self.mode == OpenMode::Full && self.stream.lock().is_seekable()
    }

    fn byte_len(&self) -> Option<u64> {
        self.byte_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{share, MemoryStream};
    use mockall::mock;

    mock! {
        Stream {}

        impl IoStream for Stream {
            fn read(&mut self, buf: &mut [u8]) -> ReadOutcome;
            fn peek(&mut self, buf: &mut [u8]) -> bridge_traits::error::Result<usize>;
            fn seek(&mut self, offset: i64, whence: Whence) -> bridge_traits::error::Result<u64>;
            fn tell(&mut self) -> bridge_traits::error::Result<u64>;
            fn close(&mut self);
            fn is_ok(&self) -> bool;
            fn describe_error(&self) -> String;
            fn is_seekable(&self) -> bool;
        }
    }

    fn adapter_over(data: &[u8], mode: OpenMode) -> StreamAdapter {
        StreamAdapter::new(share(Box::new(MemoryStream::new(data.to_vec()))), mode)
    }

    #[test]
    fn test_read_converts_bytes_to_elements() {
        let mut adapter = adapter_over(&[1, 2, 3, 4, 5], OpenMode::Full);
        let mut buf = [0u8; 8];

        assert_eq!(adapter.read_elements(&mut buf, 2, 4).unwrap(), 2);
        assert_eq!(&buf[..5], &[1, 2, 3, 4, 5]);
        assert_eq!(adapter.read_elements(&mut buf, 2, 4).unwrap(), 0);
    }

    #[test]
    fn test_read_is_capped_by_buffer() {
        let mut adapter = adapter_over(&[9; 16], OpenMode::Full);
        let mut buf = [0u8; 4];
        assert_eq!(adapter.read_elements(&mut buf, 1, 100).unwrap(), 4);
        assert_eq!(adapter.tell().unwrap(), 4);
    }

    #[test]
    fn test_zero_element_size_reads_nothing() {
        let mut adapter = adapter_over(&[1, 2], OpenMode::Full);
        assert_eq!(adapter.read_elements(&mut [0u8; 2], 0, 2).unwrap(), 0);
        assert_eq!(adapter.tell().unwrap(), 0);
    }

    #[test]
    fn test_read_error_is_explicit() {
        let mut stream = MockStream::new();
        stream
            .expect_read()
            .returning(|_| ReadOutcome::Error(BridgeError::OperationFailed("disk gone".into())));

        let mut adapter = StreamAdapter::new(share(Box::new(stream)), OpenMode::Test);
        let err = adapter.read_elements(&mut [0u8; 4], 1, 4).unwrap_err();
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_io_error_kind_preserved() {
        let mut stream = MockStream::new();
        stream.expect_read().returning(|_| {
            ReadOutcome::Error(BridgeError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "reset",
            )))
        });

        let mut adapter = StreamAdapter::new(share(Box::new(stream)), OpenMode::Test);
        let err = Read::read(&mut adapter, &mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn test_seek_origins_delegate() {
        let mut stream = MockStream::new();
        stream.expect_is_seekable().return_const(false);
        stream
            .expect_seek()
            .withf(|offset, whence| *offset == -4 && *whence == Whence::End)
            .times(1)
            .returning(|_, _| Ok(96));
        stream
            .expect_seek()
            .withf(|offset, whence| *offset == 8 && *whence == Whence::Current)
            .times(1)
            .returning(|_, _| Ok(104));
        stream.expect_tell().times(1).returning(|| Ok(104));

        let mut adapter = StreamAdapter::new(share(Box::new(stream)), OpenMode::Full);
        assert_eq!(Seek::seek(&mut adapter, SeekFrom::End(-4)).unwrap(), 96);
        assert_eq!(Seek::seek(&mut adapter, SeekFrom::Current(8)).unwrap(), 104);
        assert_eq!(adapter.tell().unwrap(), 104);
    }

    #[test]
    fn test_close_does_not_close_stream() {
        let mut stream = MockStream::new();
        stream.expect_close().never();

        let mut adapter = StreamAdapter::new(share(Box::new(stream)), OpenMode::Test);
        assert!(adapter.close().is_ok());
    }

    #[test]
    fn test_full_mode_measures_length_and_restores_position() {
        let shared = share(Box::new(MemoryStream::new(vec![0u8; 64])));
        shared.lock().seek(10, Whence::Set).unwrap();

        let adapter = StreamAdapter::new(shared.clone(), OpenMode::Full);
        assert_eq!(adapter.byte_len(), Some(64));
        assert!(adapter.is_seekable());
        assert_eq!(shared.lock().tell().unwrap(), 10);
    }

    #[test]
    fn test_test_mode_hides_seekability() {
        let adapter = adapter_over(&[0u8; 64], OpenMode::Test);
        assert_eq!(adapter.byte_len(), None);
        assert!(!adapter.is_seekable());
    }

    #[test]
    fn test_unseekable_stream_has_no_length() {
        let shared = share(Box::new(MemoryStream::unseekable(vec![0u8; 64])));
        let adapter = StreamAdapter::new(shared, OpenMode::Full);
        assert_eq!(adapter.byte_len(), None);
        assert!(!adapter.is_seekable());
    }
}
