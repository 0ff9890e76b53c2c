//! # Ogg Vorbis Decoder Plugin
//!
//! Adapts the Vorbis codec to the host player's pull-based decoder contract.
//!
//! ## Overview
//!
//! This crate handles:
//! - Format sniffing by magic bytes, extension and MIME type
//! - Tag and duration probing without a session
//! - Decode sessions with seeking, bitrate, duration and section-change
//!   notification for chained streams
//!
//! All bytes are read through host [`bridge_traits::IoStream`]s; the plugin
//! never opens files itself.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use bridge_desktop::FileStreamFactory;
//! use bridge_traits::{SoundParams, TagRecord};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let plugin = decoder_ogg::plugin_init(Arc::new(FileStreamFactory::new()));
//! let mut session = plugin.open(Path::new("/music/song.ogg"));
//! if !session.is_ok() {
//!     eprintln!("{}", session.error());
//!     return;
//! }
//!
//! let mut buf = vec![0u8; 8192];
//! let mut params = SoundParams::default();
//! while session.decode(&mut buf, &mut params) > 0 {
//!     let mut tags = TagRecord::new();
//!     if session.current_tags(&mut tags) {
//!         println!("Now playing: {:?}", tags.title);
//!     }
//! }
//! session.close();
//! ```

pub mod comments;
pub mod config;
pub mod decoder;
pub mod error;
pub mod plugin;
pub mod probe;
pub mod session;
pub mod stream_adapter;

pub use comments::{apply_comments, extract_tags};
pub use config::DecoderConfig;
pub use decoder::{
    CodecRead, FormatDetector, OpenMode, StreamInfo, SymphoniaBackend, VorbisBackend, VorbisCodec,
};
pub use error::{describe_code, CodecError, PlaybackError, Result};
pub use plugin::{plugin_init, OggDecoder};
pub use probe::probe_info;
pub use session::{OggSession, SessionState};
pub use stream_adapter::StreamAdapter;
