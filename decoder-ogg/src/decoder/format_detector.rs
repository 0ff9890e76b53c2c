//! # Format Detection Module
//!
//! Decides whether a stream, file extension or MIME type belongs to Ogg
//! Vorbis before the host commits to a full open.

use bridge_traits::IoStream;
use tracing::{debug, warn};

/// Ogg page capture pattern followed by the stream structure version (0).
const OGG_MAGIC: &[u8; 5] = b"OggS\0";

/// Start of the Vorbis identification packet: packet type 1 and the first
/// five bytes of `vorbis`.
const VORBIS_ID: &[u8; 6] = b"\x01vorbi";

/// Offset of the first packet in a single-segment first page.
const VORBIS_ID_OFFSET: usize = 28;

/// Number of bytes needed to recognize a stream.
const SNIFF_LEN: usize = VORBIS_ID_OFFSET + VORBIS_ID.len();

const FORMAT_NAME: &str = "OGG";
const EXTENSION: &str = "ogg";
const MIME_TYPES: [&str; 2] = ["application/ogg", "application/x-ogg"];

/// Format detector for Ogg Vorbis streams.
pub struct FormatDetector;

impl FormatDetector {
    /// Check the head of `stream` for an Ogg page carrying a Vorbis
    /// identification header.
    ///
    /// Only peeks; the read position is unchanged. Streams shorter than 34
    /// bytes never match.
    pub fn can_decode(stream: &mut dyn IoStream) -> bool {
        let mut head = [0u8; SNIFF_LEN];

        let n = match stream.peek(&mut head) {
            Ok(n) => n,
            Err(e) => {
                warn!("Peek failed while sniffing format: {}", e);
                return false;
            }
        };

        let matched = Self::matches_head(&head[..n]);
        debug!(peeked = n, matched, "Sniffed stream head");
        matched
    }

    /// Same check as [`Self::can_decode`] over already-read bytes.
    pub fn matches_head(head: &[u8]) -> bool {
        head.len() >= SNIFF_LEN
            && &head[..OGG_MAGIC.len()] == OGG_MAGIC
            && &head[VORBIS_ID_OFFSET..SNIFF_LEN] == VORBIS_ID
    }

    /// Case-insensitive match against `ogg`.
    pub fn matches_extension(ext: &str) -> bool {
        ext.eq_ignore_ascii_case(EXTENSION)
    }

    /// Exact, case-sensitive match against the Ogg MIME types.
    pub fn matches_mime(mime: &str) -> bool {
        MIME_TYPES.contains(&mime)
    }

    /// Display name of the format.
    pub fn format_name() -> &'static str {
        FORMAT_NAME
    }
}
