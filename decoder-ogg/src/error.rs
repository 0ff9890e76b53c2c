//! # Decoder Error Types
//!
//! Error types for the Ogg Vorbis plugin and the numeric codec error codes
//! reported back to the host.

use thiserror::Error;

/// Errors raised while wiring the codec to a host stream.
///
/// None of these cross the plugin boundary; sessions turn them into
/// [`bridge_traits::DecoderErrorRecord`]s and sentinel return values.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// The codec library reported a numeric failure.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Configuration rejected by [`crate::DecoderConfig::validate`].
    #[error("Invalid decoder configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for decoder operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Failure codes of the Vorbis codec.
///
/// The numeric values are the ones the host's error records carry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The byte source failed while the codec was reading headers.
    #[error("read error")]
    Read,

    /// Internal inconsistency inside the codec.
    #[error("internal (vorbis) logic fault")]
    Fault,

    /// The stream is not Ogg Vorbis.
    #[error("not a vorbis file")]
    NotVorbis,

    /// The identification or setup header is malformed.
    #[error("invalid Vorbis bitstream header")]
    BadHeader,

    /// The Vorbis version field is not 0.
    #[error("vorbis version mismatch")]
    Version,

    /// Any other code.
    #[error("unknown error")]
    Other(i32),
}

impl CodecError {
    pub const READ: i32 = -128;
    pub const FAULT: i32 = -129;
    pub const NOT_VORBIS: i32 = -132;
    pub const BAD_HEADER: i32 = -133;
    pub const VERSION: i32 = -134;

    /// Numeric code of this error.
    pub fn code(&self) -> i32 {
        match self {
            CodecError::Read => Self::READ,
            CodecError::Fault => Self::FAULT,
            CodecError::NotVorbis => Self::NOT_VORBIS,
            CodecError::BadHeader => Self::BAD_HEADER,
            CodecError::Version => Self::VERSION,
            CodecError::Other(code) => *code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            Self::READ => CodecError::Read,
            Self::FAULT => CodecError::Fault,
            Self::NOT_VORBIS => CodecError::NotVorbis,
            Self::BAD_HEADER => CodecError::BadHeader,
            Self::VERSION => CodecError::Version,
            other => CodecError::Other(other),
        }
    }
}

/// Human-readable description of a numeric codec error code.
pub fn describe_code(code: i32) -> String {
    CodecError::from_code(code).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(describe_code(-128), "read error");
        assert_eq!(describe_code(-129), "internal (vorbis) logic fault");
        assert_eq!(describe_code(-132), "not a vorbis file");
        assert_eq!(describe_code(-133), "invalid Vorbis bitstream header");
        assert_eq!(describe_code(-134), "vorbis version mismatch");
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(describe_code(0), "unknown error");
        assert_eq!(describe_code(-1), "unknown error");
        assert_eq!(describe_code(-130), "unknown error");
    }

    #[test]
    fn test_code_round_trip() {
        for error in [
            CodecError::Read,
            CodecError::Fault,
            CodecError::NotVorbis,
            CodecError::BadHeader,
            CodecError::Version,
        ] {
            assert_eq!(CodecError::from_code(error.code()), error);
        }
        assert_eq!(CodecError::from_code(-7), CodecError::Other(-7));
    }

    #[test]
    fn test_playback_error_wraps_codec_error() {
        let err = PlaybackError::from(CodecError::NotVorbis);
        assert_eq!(err.to_string(), "Codec error: not a vorbis file");
    }
}
