//! Vorbis comment parsing.
//!
//! Vorbis comments are `KEY=value` strings with case-insensitive keys. Only
//! the keys the host's tag record has room for are recognized.

use bridge_traits::TagRecord;

const TITLE: &str = "title=";
const ARTIST: &str = "artist=";
const ALBUM: &str = "album=";
const TRACK_NUMBER: &str = "tracknumber=";
const TRACK: &str = "track=";

/// Build a fresh tag record from a section's comments.
pub fn extract_tags<S: AsRef<str>>(comments: &[S]) -> TagRecord {
    let mut tags = TagRecord::new();
    apply_comments(&mut tags, comments);
    tags
}

/// Write recognized comments into `tags`.
///
/// Later comments overwrite earlier ones for the same field. Fields without a
/// matching comment are left untouched.
pub fn apply_comments<S: AsRef<str>>(tags: &mut TagRecord, comments: &[S]) {
    for comment in comments {
        let comment = comment.as_ref();

        if let Some(value) = strip_key(comment, TITLE) {
            tags.title = Some(value.to_string());
        } else if let Some(value) = strip_key(comment, ARTIST) {
            tags.artist = Some(value.to_string());
        } else if let Some(value) = strip_key(comment, ALBUM) {
            tags.album = Some(value.to_string());
        } else if let Some(value) = strip_key(comment, TRACK_NUMBER) {
            tags.track = Some(parse_track(value));
        } else if let Some(value) = strip_key(comment, TRACK) {
            tags.track = Some(parse_track(value));
        }
    }
}

/// Case-insensitive prefix strip.
fn strip_key<'a>(comment: &'a str, key: &str) -> Option<&'a str> {
    let head = comment.get(..key.len())?;
    if head.eq_ignore_ascii_case(key) {
        comment.get(key.len()..)
    } else {
        None
    }
}

/// Parse a leading integer, ignoring leading whitespace and trailing garbage.
///
/// Input without leading digits yields 0.
fn parse_track(value: &str) -> i32 {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let mut track: i32 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        track = track.saturating_mul(10).saturating_add(i32::from(digit - b'0'));
    }

    if negative {
        -track
    } else {
        track
    }
}
