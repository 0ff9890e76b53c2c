//! # Host Bridge Traits
//!
//! Contract between the host player and its decoder plugins.
//!
//! ## Overview
//!
//! The host owns everything that is not decoding: opening files, generic
//! stream I/O, tag storage and the process-wide log. Decoder plugins consume
//! those capabilities through the traits in this crate and expose themselves
//! back to the host through [`Decoder`](playback::Decoder) and
//! [`DecoderSession`](playback::DecoderSession).
//!
//! ## Traits
//!
//! ### Stream I/O
//! - [`IoStream`](stream::IoStream) - Read/peek/seek/tell over an opaque byte source
//! - [`StreamFactory`](stream::StreamFactory) - Acquire a stream for a path
//!
//! ### Decoding
//! - [`Decoder`](playback::Decoder) - Per-format plugin entry points
//! - [`DecoderSession`](playback::DecoderSession) - One open decode session
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! Fallible bridge operations return [`BridgeError`](error::BridgeError).
//! Decoder sessions never return errors across the plugin boundary; they
//! report through [`DecoderErrorRecord`](playback::DecoderErrorRecord) and
//! sentinel return values instead.
//!
//! ## Thread Safety
//!
//! Streams must be `Send` so a session can be handed to the host's playback
//! thread. Sessions are not internally synchronised; the host serialises all
//! calls against one session.

pub mod error;
pub mod log;
pub mod playback;
pub mod stream;

pub use error::BridgeError;

// Re-export commonly used types
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{
    Decoder, DecoderErrorRecord, DecoderSession, ErrorKind, SampleFormat, SoundParams, TagRecord,
    TagsSelect,
};
pub use stream::{share, IoStream, MemoryStream, ReadOutcome, SharedStream, StreamFactory, Whence};
