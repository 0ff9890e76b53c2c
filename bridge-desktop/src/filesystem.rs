//! File-backed stream implementation

use bridge_traits::{
    error::{BridgeError, Result},
    stream::{IoStream, ReadOutcome, StreamFactory, Whence},
};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stream over a local file.
///
/// A failed open still produces a `FileStream`; the failure is visible via
/// [`IoStream::is_ok`] and [`IoStream::describe_error`].
pub struct FileStream {
    file: Option<File>,
    path: PathBuf,
    error: Option<String>,
}

impl FileStream {
    /// Open `path` read-only.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        match File::open(&path) {
            Ok(file) => {
                debug!(path = %path.display(), "Opened file stream");
                Self {
                    file: Some(file),
                    path,
                    error: None,
                }
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Failed to open file stream");
                Self {
                    file: None,
                    path,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Path this stream was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&mut self) -> Result<&mut File> {
        if let Some(error) = &self.error {
            return Err(BridgeError::OperationFailed(error.clone()));
        }
        self.file
            .as_mut()
            .ok_or_else(|| BridgeError::StreamClosed(self.path.display().to_string()))
    }

    /// Read until `buf` is full or the file ends.
    fn fill(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl IoStream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> ReadOutcome {
        let file = match self.file() {
            Ok(file) => file,
            Err(e) => return ReadOutcome::Error(e),
        };

        loop {
            match file.read(buf) {
                Ok(0) if !buf.is_empty() => return ReadOutcome::Eof,
                Ok(n) => return ReadOutcome::Data(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "File read failed");
                    self.error = Some(e.to_string());
                    return ReadOutcome::Error(BridgeError::Io(e));
                }
            }
        }
    }

    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        let file = self.file()?;
        let position = file.stream_position()?;
        let n = Self::fill(file, buf)?;
        file.seek(SeekFrom::Start(position))?;
        Ok(n)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let target = whence.to_seek_from(offset)?;
        let file = self.file()?;
        Ok(file.seek(target)?)
    }

    fn tell(&mut self) -> Result<u64> {
        let file = self.file()?;
        Ok(file.stream_position()?)
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            debug!(path = %self.path.display(), "Closed file stream");
        }
    }

    fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn describe_error(&self) -> String {
        self.error.clone().unwrap_or_default()
    }
}

/// Opens [`FileStream`]s from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileStreamFactory;

impl FileStreamFactory {
    pub fn new() -> Self {
        Self
    }
}

impl StreamFactory for FileStreamFactory {
    fn open(&self, path: &Path) -> Box<dyn IoStream> {
        Box::new(FileStream::open(path))
    }
}
