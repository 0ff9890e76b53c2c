//! Host-facing decoder plugin.

use bridge_traits::{Decoder, DecoderSession, IoStream, StreamFactory, TagRecord, TagsSelect};
use std::path::Path;
use std::sync::Arc;

use crate::config::DecoderConfig;
use crate::decoder::{FormatDetector, SymphoniaBackend, VorbisBackend};
use crate::probe::probe_info;
use crate::session::OggSession;

/// The Ogg Vorbis decoder registered with the host player.
pub struct OggDecoder {
    factory: Arc<dyn StreamFactory>,
    backend: Arc<dyn VorbisBackend>,
}

impl OggDecoder {
    /// Create a plugin that opens files through `factory` and decodes with
    /// `backend`.
    pub fn new(factory: Arc<dyn StreamFactory>, backend: Arc<dyn VorbisBackend>) -> Self {
        Self { factory, backend }
    }

    /// Create a plugin using the symphonia backend with `config`.
    pub fn with_config(factory: Arc<dyn StreamFactory>, config: DecoderConfig) -> Self {
        Self::new(factory, Arc::new(SymphoniaBackend::new(config)))
    }
}

impl Decoder for OggDecoder {
    fn name(&self, _path: &Path) -> &'static str {
        FormatDetector::format_name()
    }

    fn matches_extension(&self, ext: &str) -> bool {
        FormatDetector::matches_extension(ext)
    }

    fn matches_mime(&self, mime: &str) -> bool {
        FormatDetector::matches_mime(mime)
    }

    fn can_decode(&self, stream: &mut dyn IoStream) -> bool {
        FormatDetector::can_decode(stream)
    }

    fn open(&self, path: &Path) -> Box<dyn DecoderSession> {
        Box::new(OggSession::open_path(
            self.factory.as_ref(),
            path,
            self.backend.as_ref(),
        ))
    }

    fn open_stream(&self, stream: Box<dyn IoStream>) -> Box<dyn DecoderSession> {
        Box::new(OggSession::open_stream(stream, self.backend.as_ref()))
    }

    fn info(&self, path: &Path, tags: &mut TagRecord, select: TagsSelect) {
        probe_info(
            self.factory.as_ref(),
            self.backend.as_ref(),
            path,
            tags,
            select,
        );
    }
}

/// Plugin entry point: the Ogg Vorbis decoder with default settings.
pub fn plugin_init(factory: Arc<dyn StreamFactory>) -> Box<dyn Decoder> {
    Box::new(OggDecoder::with_config(factory, DecoderConfig::default()))
}
