//! # Symphonia Vorbis Codec
//!
//! [`VorbisBackend`] implementation on symphonia's Ogg demuxer and Vorbis
//! decoder.

use crate::config::DecoderConfig;
use crate::decoder::chain::ChainMap;
use crate::decoder::codec::{CodecRead, OpenMode, StreamInfo, VorbisBackend, VorbisCodec};
use crate::decoder::sample_converter::SampleConverter;
use crate::error::CodecError;
use crate::stream_adapter::StreamAdapter;
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions, CODEC_TYPE_VORBIS};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo, Track};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;
use std::io::{Seek, SeekFrom};
use tracing::{debug, error, info, instrument, warn};

/// Opens [`SymphoniaVorbis`] codecs.
#[derive(Debug, Clone, Default)]
pub struct SymphoniaBackend {
    config: DecoderConfig,
}

impl SymphoniaBackend {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

impl VorbisBackend for SymphoniaBackend {
    #[instrument(skip(self, adapter), fields(mode = ?adapter.mode()))]
    fn open(&self, adapter: StreamAdapter) -> Result<Box<dyn VorbisCodec>, CodecError> {
        SymphoniaVorbis::open(adapter, self.config.clone())
            .map(|codec| Box::new(codec) as Box<dyn VorbisCodec>)
    }
}

/// Bitrate fields of the Vorbis identification header, in bits per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HeaderBitrates {
    maximum: i64,
    nominal: i64,
    minimum: i64,
}

impl HeaderBitrates {
    /// Validate the identification header and pull out its bitrate hints.
    ///
    /// Layout: packet type (1), `vorbis`, version (u32 LE), channels (u8),
    /// rate (u32 LE), then maximum, nominal and minimum bitrate (i32 LE).
    fn parse(ident: &[u8]) -> Result<Self, CodecError> {
        if ident.len() < 28 || ident[0] != 1 || &ident[1..7] != b"vorbis" {
            return Err(CodecError::BadHeader);
        }

        let field = |at: usize| [ident[at], ident[at + 1], ident[at + 2], ident[at + 3]];

        if u32::from_le_bytes(field(7)) != 0 {
            return Err(CodecError::Version);
        }

        Ok(Self {
            maximum: i64::from(i32::from_le_bytes(field(16))),
            nominal: i64::from(i32::from_le_bytes(field(20))),
            minimum: i64::from(i32::from_le_bytes(field(24))),
        })
    }

    /// Bitrate implied by the header alone.
    fn estimate(&self) -> i64 {
        if self.nominal > 0 {
            self.nominal
        } else if self.maximum > 0 && self.minimum > 0 {
            (self.maximum + self.minimum) / 2
        } else if self.maximum > 0 {
            self.maximum
        } else {
            0
        }
    }
}

/// Everything that changes when a new logical section starts.
struct Section {
    track_id: u32,
    decoder: Box<dyn Decoder>,
    info: StreamInfo,
    bitrates: HeaderBitrates,
    n_frames: Option<u64>,
    comments: Vec<String>,
}

/// Symphonia-backed Vorbis codec.
///
/// Decoded packets are converted to s16le and buffered, so callers may read
/// with buffers of any size. Chained streams are followed: each time the
/// demuxer reports a new physical stream, the section number advances and
/// comments and stream parameters are re-read.
///
/// A full open of a seekable stream also maps every link of the chain, so
/// duration and average bitrate cover the whole file and seeks can land in
/// any link.
pub struct SymphoniaVorbis {
    format: Box<dyn FormatReader>,
    current: Section,
    section: u32,
    mode: OpenMode,
    config: DecoderConfig,
    byte_len: Option<u64>,

    /// Second handle on the host stream, used to reopen the demuxer at the
    /// start of another link.
    source: StreamAdapter,
    chain: Option<ChainMap>,

    /// Decoded PCM not yet handed out.
    pending: Vec<u8>,
    pending_pos: usize,

    consecutive_errors: u32,
    eof: bool,

    /// Compressed bits and decoded frames since the last instantaneous
    /// bitrate query.
    bits_since_query: u64,
    frames_since_query: u64,
}

impl SymphoniaVorbis {
    fn open(mut adapter: StreamAdapter, config: DecoderConfig) -> Result<Self, CodecError> {
        let mode = adapter.mode();
        let byte_len = adapter.byte_len();

        let chain = if mode == OpenMode::Full && adapter.is_seekable() {
            Self::scan_chain(&mut adapter)?
        } else {
            None
        };

        let source = adapter.clone();
        let mss = MediaSourceStream::new(Box::new(adapter), Default::default());
        let mut format = Self::probe_format(mss, &config)?;
        let current = Self::open_section(&mut format, &config)?;

        info!(
            channels = current.info.channels,
            rate = current.info.rate,
            comments = current.comments.len(),
            links = chain.as_ref().map(|c| c.links().len()),
            "Vorbis stream opened"
        );

        Ok(Self {
            format,
            current,
            section: 0,
            mode,
            config,
            byte_len,
            source,
            chain,
            pending: Vec::new(),
            pending_pos: 0,
            consecutive_errors: 0,
            eof: false,
            bits_since_query: 0,
            frames_since_query: 0,
        })
    }

    /// Map the links of the stream, then rewind to where the scan started.
    ///
    /// A stream that cannot be mapped is opened without a chain map; only a
    /// failed rewind is an error.
    fn scan_chain(adapter: &mut StreamAdapter) -> Result<Option<ChainMap>, CodecError> {
        let start = adapter.tell().map_err(|e| {
            warn!("Cannot read stream position: {}", e);
            CodecError::Read
        })?;

        let chain = match ChainMap::scan(adapter) {
            Ok(chain) => chain,
            Err(e) => {
                debug!("Chain scan failed: {}", e);
                None
            }
        };

        Seek::seek(adapter, SeekFrom::Start(start)).map_err(|e| {
            warn!("Cannot rewind after chain scan: {}", e);
            CodecError::Read
        })?;

        Ok(chain)
    }

    /// Probe `mss` for an Ogg container.
    fn probe_format(
        mss: MediaSourceStream,
        config: &DecoderConfig,
    ) -> Result<Box<dyn FormatReader>, CodecError> {
        let mut hint = Hint::new();
        hint.with_extension("ogg");

        let format_opts = FormatOptions {
            enable_gapless: config.enable_gapless,
            ..Default::default()
        };

        symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &MetadataOptions::default())
            .map(|probed| probed.format)
            .map_err(|e| {
                debug!("Format probe failed: {}", e);
                probe_error_code(&e)
            })
    }

    /// Reopen the demuxer at the first page of link `index`.
    fn jump_to_link(&mut self, index: usize, start: u64) -> Result<(), CodecError> {
        let mut mss = MediaSourceStream::new(Box::new(self.source.clone()), Default::default());
        mss.seek(SeekFrom::Start(start)).map_err(|e| {
            warn!("Cannot reach link {}: {}", index, e);
            CodecError::Read
        })?;

        let mut format = Self::probe_format(mss, &self.config)?;
        self.current = Self::open_section(&mut format, &self.config)?;
        self.format = format;
        self.section = index as u32;

        info!(section = self.section, "Jumped to link");
        Ok(())
    }

    /// Select the Vorbis track of the current physical stream and build a
    /// decoder for it.
    fn open_section(
        format: &mut Box<dyn FormatReader>,
        config: &DecoderConfig,
    ) -> Result<Section, CodecError> {
        let track: Track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec == CODEC_TYPE_VORBIS)
            .cloned()
            .ok_or_else(|| {
                debug!("No Vorbis track found");
                CodecError::NotVorbis
            })?;

        let params: &CodecParameters = &track.codec_params;
        let bitrates = match params.extra_data.as_deref() {
            Some(ident) => HeaderBitrates::parse(ident)?,
            None => return Err(CodecError::BadHeader),
        };

        let decoder = symphonia::default::get_codecs()
            .make(params, &DecoderOptions { verify: config.verify })
            .map_err(|e| {
                error!("Failed to create decoder: {}", e);
                CodecError::BadHeader
            })?;

        let info = StreamInfo {
            channels: params.channels.map(|c| c.count() as u16).unwrap_or(0),
            rate: params.sample_rate.unwrap_or(0),
        };

        let comments = {
            let mut metadata = format.metadata();
            metadata
                .skip_to_latest()
                .map(|revision| {
                    revision
                        .tags()
                        .iter()
                        .map(|tag| format!("{}={}", tag.key, tag.value))
                        .collect()
                })
                .unwrap_or_default()
        };

        debug!(track_id = track.id, ?bitrates, "Selected Vorbis track");

        Ok(Section {
            track_id: track.id,
            decoder,
            info,
            bitrates,
            n_frames: params.n_frames,
            comments,
        })
    }

    /// Switch to the next chained stream.
    fn next_section(&mut self) -> Result<(), CodecError> {
        self.current = Self::open_section(&mut self.format, &self.config)?;
        self.section += 1;
        info!(section = self.section, "Section change");
        Ok(())
    }

    /// Count a failure. Reaching the configured limit ends the stream.
    fn failure(&mut self, reason: String) -> CodecRead {
        self.consecutive_errors += 1;
        warn!(
            "Skipping damaged data (attempt {}/{}): {}",
            self.consecutive_errors, self.config.max_consecutive_errors, reason
        );

        if self.consecutive_errors >= self.config.max_consecutive_errors {
            error!("Too many consecutive errors, giving up");
            self.eof = true;
            return CodecRead::Eof;
        }

        CodecRead::Hole(reason)
    }

    /// Copy buffered PCM into `buf`.
    fn drain_pending(&mut self, buf: &mut [u8]) -> usize {
        let available = &self.pending[self.pending_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pending_pos += n;

        if self.pending_pos == self.pending.len() {
            self.pending.clear();
            self.pending_pos = 0;
        }

        n
    }

    /// Decode packets until PCM is buffered.
    ///
    /// Returns `None` once samples are pending, otherwise the read outcome to
    /// report.
    fn decode_next_packet(&mut self) -> Option<CodecRead> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    if let Err(e) = self.next_section() {
                        warn!("Cannot continue into next section: {}", e);
                        self.eof = true;
                        return Some(CodecRead::Eof);
                    }
                    continue;
                }
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    debug!("Reached end of stream");
                    self.eof = true;
                    return Some(CodecRead::Eof);
                }
                Err(e) => return Some(self.failure(e.to_string())),
            };

            if packet.track_id() != self.current.track_id {
                continue;
            }

            let err = match self.current.decoder.decode(&packet) {
                Ok(decoded) => {
                    let frames = SampleConverter::append_s16le(&decoded, &mut self.pending);
                    if frames == 0 {
                        continue;
                    }

                    let spec = *decoded.spec();
                    self.current.info = StreamInfo {
                        channels: spec.channels.count() as u16,
                        rate: spec.rate,
                    };

                    self.consecutive_errors = 0;
                    self.bits_since_query += packet.data.len() as u64 * 8;
                    self.frames_since_query += frames as u64;
                    return None;
                }
                Err(e) => e,
            };

            match err {
                SymphoniaError::ResetRequired => {
                    if let Err(e) = self.next_section() {
                        warn!("Cannot continue into next section: {}", e);
                        self.eof = true;
                        return Some(CodecRead::Eof);
                    }
                }
                e => return Some(self.failure(e.to_string())),
            }
        }
    }
}

impl VorbisCodec for SymphoniaVorbis {
    fn read(&mut self, buf: &mut [u8]) -> CodecRead {
        if buf.is_empty() {
            return CodecRead::Samples {
                bytes: 0,
                section: self.section,
            };
        }

        if self.pending.is_empty() {
            if self.eof {
                return CodecRead::Eof;
            }
            if let Some(outcome) = self.decode_next_packet() {
                return outcome;
            }
        }

        let bytes = self.drain_pending(buf);
        CodecRead::Samples {
            bytes,
            section: self.section,
        }
    }

    fn info(&self) -> StreamInfo {
        self.current.info
    }

    fn comments(&self) -> Vec<String> {
        self.current.comments.clone()
    }

    fn bitrate(&self) -> i64 {
        if let Some(chain) = &self.chain {
            let secs = chain.total_secs();
            if secs > 0.0 {
                return (chain.total_bytes() as f64 * 8.0 / secs).round() as i64;
            }
        }

        let rate = u64::from(self.current.info.rate);

        match (self.mode, self.byte_len, self.current.n_frames) {
            (OpenMode::Full, Some(len), Some(frames)) if frames > 0 && rate > 0 => {
                (len.saturating_mul(8).saturating_mul(rate) / frames) as i64
            }
            _ => self.current.bitrates.estimate(),
        }
    }

    fn bitrate_instant(&mut self) -> i64 {
        let rate = u64::from(self.current.info.rate);
        if self.frames_since_query == 0 || rate == 0 {
            return 0;
        }

        let bps = self.bits_since_query.saturating_mul(rate) / self.frames_since_query;
        self.bits_since_query = 0;
        self.frames_since_query = 0;
        bps as i64
    }

    fn time_total(&self) -> Option<u32> {
        if self.mode == OpenMode::Test {
            return None;
        }

        if let Some(chain) = &self.chain {
            let secs = chain.total_secs();
            return (secs < f64::from(u32::MAX)).then(|| secs as u32);
        }

        let rate = u64::from(self.current.info.rate);
        match self.current.n_frames {
            Some(frames) if rate > 0 => u32::try_from(frames / rate).ok(),
            _ => None,
        }
    }

    fn time_seek(&mut self, secs: u32) -> Result<(), CodecError> {
        debug!("Seeking to {}s", secs);

        let target = match &self.chain {
            Some(chain) => {
                let (index, offset) = chain.locate(f64::from(secs)).ok_or_else(|| {
                    warn!("Seek past the end of the stream: {}s", secs);
                    CodecError::Fault
                })?;
                let start = chain.link(index).map(|link| link.start).unwrap_or_default();
                Some((index, start, offset))
            }
            None => None,
        };

        let time = match target {
            Some((index, start, offset)) => {
                if index != self.section as usize {
                    self.jump_to_link(index, start)?;
                }
                Time::from(offset)
            }
            None => Time::new(u64::from(secs), 0.0),
        };

        let to = SeekTo::Time {
            time,
            track_id: Some(self.current.track_id),
        };

        self.format.seek(SeekMode::Accurate, to).map_err(|e| {
            warn!("Seek failed: {}", e);
            match e {
                SymphoniaError::IoError(_) => CodecError::Read,
                _ => CodecError::Fault,
            }
        })?;

        self.current.decoder.reset();
        self.pending.clear();
        self.pending_pos = 0;
        self.consecutive_errors = 0;
        self.eof = false;
        self.bits_since_query = 0;
        self.frames_since_query = 0;

        info!("Seek completed to {}s", secs);
        Ok(())
    }
}

/// Map a probe failure to the codec error code the host sees.
fn probe_error_code(error: &SymphoniaError) -> CodecError {
    match error {
        // Ran out of data while searching for a stream marker.
        SymphoniaError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            CodecError::NotVorbis
        }
        SymphoniaError::IoError(_) => CodecError::Read,
        SymphoniaError::Unsupported(_) => CodecError::NotVorbis,
        SymphoniaError::DecodeError(_) => CodecError::BadHeader,
        _ => CodecError::Fault,
    }
}
