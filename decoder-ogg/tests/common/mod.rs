//! Scripted codec, backend and stream doubles shared by the integration tests.

#![allow(dead_code)]

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{IoStream, MemoryStream, ReadOutcome, StreamFactory, Whence};
use decoder_ogg::{CodecError, CodecRead, OpenMode, StreamAdapter, StreamInfo, VorbisBackend, VorbisCodec};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Ordered record of resource events.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn count(log: &EventLog, event: &str) -> usize {
    log.lock().iter().filter(|e| e.as_str() == event).count()
}

// ============================================================================
// Tracking stream
// ============================================================================

/// Memory stream that logs `close` calls.
pub struct TrackingStream {
    inner: MemoryStream,
    log: EventLog,
}

impl TrackingStream {
    pub fn new(inner: MemoryStream, log: EventLog) -> Self {
        Self { inner, log }
    }
}

impl IoStream for TrackingStream {
    fn read(&mut self, buf: &mut [u8]) -> ReadOutcome {
        self.inner.read(buf)
    }

    fn peek(&mut self, buf: &mut [u8]) -> BridgeResult<usize> {
        self.inner.peek(buf)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> BridgeResult<u64> {
        self.inner.seek(offset, whence)
    }

    fn tell(&mut self) -> BridgeResult<u64> {
        self.inner.tell()
    }

    fn close(&mut self) {
        self.log.lock().push("stream closed".to_string());
        self.inner.close();
    }

    fn is_ok(&self) -> bool {
        self.inner.is_ok()
    }

    fn describe_error(&self) -> String {
        self.inner.describe_error()
    }

    fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }
}

/// Factory handing out tracking streams, or failed ones.
pub struct TestFactory {
    data: Vec<u8>,
    failure: Option<String>,
    log: EventLog,
    pub opened: Mutex<Vec<PathBuf>>,
}

impl TestFactory {
    pub fn new(data: Vec<u8>, log: EventLog) -> Self {
        Self {
            data,
            failure: None,
            log,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(description: &str, log: EventLog) -> Self {
        Self {
            failure: Some(description.to_string()),
            ..Self::new(Vec::new(), log)
        }
    }
}

impl StreamFactory for TestFactory {
    fn open(&self, path: &Path) -> Box<dyn IoStream> {
        self.opened.lock().push(path.to_path_buf());
        let inner = match &self.failure {
            Some(description) => MemoryStream::failed(description.clone()),
            None => MemoryStream::new(self.data.clone()),
        };
        Box::new(TrackingStream::new(inner, self.log.clone()))
    }
}

// ============================================================================
// Scripted codec
// ============================================================================

/// One result of [`VorbisCodec::read`].
#[derive(Debug, Clone)]
pub enum Step {
    /// Write `len` bytes of `fill` (capped by the buffer) from `section`.
    Samples { section: u32, fill: u8, len: usize },
    Hole,
    Eof,
}

pub fn samples(section: u32, fill: u8, len: usize) -> Step {
    Step::Samples { section, fill, len }
}

/// Behavior of codecs opened by a [`ScriptedBackend`].
#[derive(Debug, Clone)]
pub struct Script {
    pub steps: Vec<Step>,
    /// Comments per section; section 0 is also the comments at open.
    pub comments: Vec<Vec<String>>,
    pub info: StreamInfo,
    pub bitrate: i64,
    /// Instantaneous readings returned in order, 0 once exhausted.
    pub instant: Vec<i64>,
    pub time_total: Option<u32>,
    pub seek_error: Option<CodecError>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            comments: vec![vec![
                "TITLE=Foo".to_string(),
                "artist=Bar".to_string(),
                "track=3".to_string(),
            ]],
            info: StreamInfo {
                channels: 2,
                rate: 44100,
            },
            bitrate: 128_000,
            instant: Vec::new(),
            time_total: Some(200),
            seek_error: None,
        }
    }
}

pub struct ScriptedCodec {
    steps: VecDeque<Step>,
    instant: VecDeque<i64>,
    script: Script,
    section: u32,
    log: EventLog,
    _adapter: StreamAdapter,
}

impl VorbisCodec for ScriptedCodec {
    fn read(&mut self, buf: &mut [u8]) -> CodecRead {
        match self.steps.pop_front().unwrap_or(Step::Eof) {
            Step::Samples { section, fill, len } => {
                let n = len.min(buf.len());
                buf[..n].fill(fill);
                self.section = section;
                CodecRead::Samples { bytes: n, section }
            }
            Step::Hole => CodecRead::Hole("scripted hole".to_string()),
            Step::Eof => CodecRead::Eof,
        }
    }

    fn info(&self) -> StreamInfo {
        self.script.info
    }

    fn comments(&self) -> Vec<String> {
        self.script
            .comments
            .get(self.section as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn bitrate(&self) -> i64 {
        self.script.bitrate
    }

    fn bitrate_instant(&mut self) -> i64 {
        self.instant.pop_front().unwrap_or(0)
    }

    fn time_total(&self) -> Option<u32> {
        self.script.time_total
    }

    fn time_seek(&mut self, secs: u32) -> Result<(), CodecError> {
        self.log.lock().push(format!("seek {}", secs));
        match self.script.seek_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for ScriptedCodec {
    fn drop(&mut self) {
        self.log.lock().push("codec dropped".to_string());
    }
}

/// Backend opening [`ScriptedCodec`]s, or failing with a fixed error.
pub struct ScriptedBackend {
    script: Script,
    open_error: Option<CodecError>,
    log: EventLog,
    pub modes: Mutex<Vec<OpenMode>>,
}

impl ScriptedBackend {
    pub fn new(script: Script, log: EventLog) -> Self {
        Self {
            script,
            open_error: None,
            log,
            modes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: CodecError, log: EventLog) -> Self {
        Self {
            open_error: Some(error),
            ..Self::new(Script::default(), log)
        }
    }

    pub fn open_count(&self) -> usize {
        self.modes.lock().len()
    }
}

impl VorbisBackend for ScriptedBackend {
    fn open(&self, adapter: StreamAdapter) -> Result<Box<dyn VorbisCodec>, CodecError> {
        self.modes.lock().push(adapter.mode());
        if let Some(e) = self.open_error {
            return Err(e);
        }

        Ok(Box::new(ScriptedCodec {
            steps: self.script.steps.iter().cloned().collect(),
            instant: self.script.instant.iter().copied().collect(),
            script: self.script.clone(),
            section: 0,
            log: self.log.clone(),
            _adapter: adapter,
        }))
    }
}
