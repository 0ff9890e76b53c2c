//! # Decoder Configuration
//!
//! Tuning knobs for the symphonia-backed Vorbis codec.

use serde::{Deserialize, Serialize};

use crate::error::{PlaybackError, Result};

/// Vorbis decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Number of consecutive I/O failures tolerated while reading packets.
    ///
    /// Each failure is reported as a stream hole; once the limit is reached
    /// the stream is treated as finished.
    ///
    /// Default: 10.
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,

    /// Trim encoder delay and padding from decoded output.
    ///
    /// Default: false.
    #[serde(default)]
    pub enable_gapless: bool,

    /// Verify packet checksums where the container provides them.
    ///
    /// Default: false.
    #[serde(default)]
    pub verify: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_consecutive_errors: default_max_consecutive_errors(),
            enable_gapless: false,
            verify: false,
        }
    }
}

impl DecoderConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.max_consecutive_errors == 0 {
            return Err(PlaybackError::InvalidConfig(
                "max_consecutive_errors must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_max_consecutive_errors() -> u32 {
    10
}
