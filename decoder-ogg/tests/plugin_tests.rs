//! Host-facing plugin tests
//!
//! Covers the `Decoder` contract with the default symphonia backend over
//! desktop file streams and the encoded files in tests/fixtures/.

mod common;

use bridge_desktop::FileStreamFactory;
use bridge_traits::{
    Decoder, DecoderSession, MemoryStream, SampleFormat, SoundParams, TagRecord, TagsSelect,
};
use common::*;
use decoder_ogg::{plugin_init, OggDecoder};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Helper to get the fixtures directory
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn desktop_plugin() -> Box<dyn Decoder> {
    plugin_init(Arc::new(FileStreamFactory::new()))
}

fn temp_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_plugin_identity() {
    let plugin = desktop_plugin();

    assert_eq!(plugin.name(Path::new("anything.ogg")), "OGG");
    assert!(plugin.matches_extension("ogg"));
    assert!(plugin.matches_extension("OGG"));
    assert!(!plugin.matches_extension("oga"));
    assert!(plugin.matches_mime("application/ogg"));
    assert!(plugin.matches_mime("application/x-ogg"));
    assert!(!plugin.matches_mime("APPLICATION/OGG"));
}

#[test]
fn test_can_decode_does_not_consume() {
    let plugin = desktop_plugin();

    let mut head = b"OggS\0\x02".to_vec();
    head.resize(28, 0);
    head.extend_from_slice(b"\x01vorbis");
    let mut stream = MemoryStream::new(head);

    assert!(plugin.can_decode(&mut stream));
    assert!(plugin.can_decode(&mut stream));

    let mut short = MemoryStream::new(b"OggS\0".to_vec());
    assert!(!plugin.can_decode(&mut short));
}

#[test]
fn test_open_missing_file() {
    let plugin = desktop_plugin();
    let session = plugin.open(&fixtures_dir().join("nonexistent.ogg"));

    assert!(!session.is_ok());
    let error = session.error();
    assert!(error.is_fatal());
    assert!(error
        .message
        .as_deref()
        .unwrap_or_default()
        .starts_with("Can't load OGG: "));
    session.close();
}

#[test]
fn test_open_corrupt_file() {
    let file = temp_file(b"This is not a valid audio file");
    let plugin = desktop_plugin();

    let mut session = plugin.open(file.path());

    assert!(!session.is_ok());
    assert!(session.error().is_fatal());
    assert_eq!(session.error().message.as_deref(), Some("not a vorbis file"));

    let mut params = SoundParams::default();
    assert_eq!(session.decode(&mut [0u8; 64], &mut params), 0);
    session.close();
}

#[test]
fn test_info_on_corrupt_file_is_soft() {
    let file = temp_file(b"OggS but not really");
    let plugin = desktop_plugin();
    let mut tags = TagRecord::new();

    plugin.info(file.path(), &mut tags, TagsSelect::ALL);

    assert!(tags.is_empty());
}

#[test]
fn test_plugin_delegates_to_backend() {
    let log = event_log();
    let factory = Arc::new(TestFactory::new(vec![0u8; 16], log.clone()));
    let backend = Arc::new(ScriptedBackend::new(Script::default(), log.clone()));
    let plugin = OggDecoder::new(factory.clone(), backend.clone());

    let mut tags = TagRecord::new();
    plugin.info(Path::new("/music/a.ogg"), &mut tags, TagsSelect::COMMENTS);
    assert_eq!(tags.title.as_deref(), Some("Foo"));

    let session = plugin.open(Path::new("/music/b.ogg"));
    assert!(session.is_ok());
    session.close();

    let session = plugin.open_stream(Box::new(MemoryStream::new(vec![0u8; 4])));
    assert!(session.is_ok());
    assert_eq!(session.bitrate(), 128);
    session.close();

    assert_eq!(factory.opened.lock().len(), 2);
    assert_eq!(backend.open_count(), 3);
}

// ============================================================================
// Encoded fixtures
// ============================================================================

/// Two seconds of a stereo 44.1 kHz tone with a full set of tags.
const SAMPLE: &[u8] = include_bytes!("fixtures/sample.ogg");

/// A one-second link followed by a two-second link, each with its own title.
const CHAINED: &[u8] = include_bytes!("fixtures/chained.ogg");

fn fixture(name: &str) -> PathBuf {
    let path = fixtures_dir().join(name);
    if !path.exists() {
        panic!("{} not found in fixtures directory", name);
    }
    path
}

fn decode_all(session: &mut dyn DecoderSession, capacity: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = vec![0u8; capacity];
    let mut params = SoundParams::default();

    loop {
        let n = session.decode(&mut buf, &mut params);
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }

    out
}

/// Decode one buffer and return the title delivered with it, if any.
fn next_title(session: &mut dyn DecoderSession) -> Option<String> {
    let mut buf = vec![0u8; 4096];
    let mut params = SoundParams::default();
    let mut tags = TagRecord::new();

    assert!(session.decode(&mut buf, &mut params) > 0);
    if session.current_tags(&mut tags) {
        tags.title
    } else {
        None
    }
}

#[test]
fn test_sniff_encoded_files() {
    let plugin = desktop_plugin();

    let mut stream = bridge_desktop::FileStream::open(fixture("sample.ogg"));
    assert!(plugin.can_decode(&mut stream));

    let mut stream = MemoryStream::new(CHAINED.to_vec());
    assert!(plugin.can_decode(&mut stream));
}

#[test]
fn test_info_reads_tags_and_duration() {
    let plugin = desktop_plugin();
    let mut tags = TagRecord::new();

    plugin.info(&fixture("sample.ogg"), &mut tags, TagsSelect::ALL);

    assert_eq!(tags.title.as_deref(), Some("Test Tone"));
    assert_eq!(tags.artist.as_deref(), Some("Ogg Player"));
    assert_eq!(tags.album.as_deref(), Some("Fixtures"));
    assert_eq!(tags.track, Some(7));
    assert_eq!(tags.time, Some(2));
}

#[test]
fn test_info_comments_only_skips_duration() {
    let plugin = desktop_plugin();
    let mut tags = TagRecord::new();

    plugin.info(&fixture("sample.ogg"), &mut tags, TagsSelect::COMMENTS);

    assert_eq!(tags.title.as_deref(), Some("Test Tone"));
    assert_eq!(tags.time, None);
}

#[test]
fn test_decode_encoded_file() {
    let plugin = desktop_plugin();
    let mut session = plugin.open(&fixture("sample.ogg"));
    assert!(session.is_ok(), "open failed: {}", session.error());
    assert_eq!(session.duration(), Some(2));
    assert_eq!(session.bitrate(), (SAMPLE.len() * 8 / 2 / 1000) as u32);

    let mut tags = TagRecord::new();
    let mut params = SoundParams::default();
    let mut buf = vec![0u8; 4096];

    let n = session.decode(&mut buf, &mut params);
    assert!(n > 0);
    assert_eq!(n % 4, 0);
    assert_eq!(params.channels, 2);
    assert_eq!(params.rate, 44100);
    assert_eq!(params.format, SampleFormat::S16Le);
    assert!(session.current_tags(&mut tags));
    assert_eq!(tags.title.as_deref(), Some("Test Tone"));
    assert!(!session.current_tags(&mut tags));
    assert!(session.bitrate() > 0);

    let rest = decode_all(session.as_mut(), 4096);
    let frames = (n + rest.len()) / 4;
    assert!(
        (84_000..=92_000).contains(&frames),
        "decoded {} frames",
        frames
    );
    assert!(!session.error().is_set());
    session.close();
}

#[test]
fn test_seek_encoded_file() {
    let plugin = desktop_plugin();
    let mut session = plugin.open(&fixture("sample.ogg"));
    let full = decode_all(session.as_mut(), 4096).len();

    assert_eq!(session.seek(1), Some(1));
    let tail = decode_all(session.as_mut(), 4096).len();
    assert!(tail > 0 && tail < full, "tail {} of {}", tail, full);

    assert_eq!(session.seek(10), None);
    session.close();
}

#[test]
fn test_two_sessions_decode_identically() {
    let plugin = desktop_plugin();
    let mut first = plugin.open(&fixture("sample.ogg"));
    let mut second = plugin.open_stream(Box::new(MemoryStream::new(SAMPLE.to_vec())));

    let a = decode_all(first.as_mut(), 3000);
    let b = decode_all(second.as_mut(), 1000);

    assert!(!a.is_empty());
    assert_eq!(a, b);
    first.close();
    second.close();
}

#[test]
fn test_chained_file_totals() {
    let plugin = desktop_plugin();

    let mut tags = TagRecord::new();
    plugin.info(&fixture("chained.ogg"), &mut tags, TagsSelect::ALL);
    assert_eq!(tags.title.as_deref(), Some("First Link"));
    assert_eq!(tags.time, Some(3));

    let session = plugin.open(&fixture("chained.ogg"));
    assert_eq!(session.duration(), Some(3));
    assert_eq!(session.bitrate(), (CHAINED.len() * 8 / 3 / 1000) as u32);
    session.close();
}

#[test]
fn test_chained_file_reports_each_section() {
    let plugin = desktop_plugin();
    let mut session = plugin.open_stream(Box::new(MemoryStream::new(CHAINED.to_vec())));

    let mut buf = vec![0u8; 4096];
    let mut params = SoundParams::default();
    let mut tags = TagRecord::new();
    let mut titles = Vec::new();
    let mut rates = Vec::new();

    while session.decode(&mut buf, &mut params) > 0 {
        if session.current_tags(&mut tags) {
            titles.push(tags.title.clone().unwrap_or_default());
            rates.push(params.rate);
        }
    }

    assert_eq!(titles, vec!["First Link", "Second Link"]);
    assert_eq!(rates, vec![44100, 44100]);
    assert_eq!(tags.track, Some(2));
    session.close();
}

#[test]
fn test_chained_file_seeks_across_links() {
    let plugin = desktop_plugin();
    let mut session = plugin.open(&fixture("chained.ogg"));

    assert_eq!(session.seek(2), Some(2));
    assert_eq!(next_title(session.as_mut()).as_deref(), Some("Second Link"));

    assert_eq!(session.seek(0), Some(0));
    assert_eq!(next_title(session.as_mut()).as_deref(), Some("First Link"));

    assert_eq!(session.seek(3), None);
    session.close();
}
