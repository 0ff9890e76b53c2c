//! # Ogg Vorbis Inspection Example
//!
//! Probes a file for tags and duration, then decodes it to the end and
//! reports what the host would have received.
//!
//! Run with: `cargo run --example ogg_info --package decoder-ogg -- song.ogg`

use bridge_desktop::FileStreamFactory;
use bridge_traits::log::LogLevel;
use bridge_traits::{SoundParams, TagRecord, TagsSelect};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use decoder_ogg::plugin_init;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = match env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => {
            eprintln!("usage: ogg_info <file.ogg>");
            std::process::exit(2);
        }
    };

    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug)
            .with_filter("decoder_ogg=debug"),
    )?;

    let plugin = plugin_init(Arc::new(FileStreamFactory::new()));

    let mut tags = TagRecord::new();
    plugin.info(&path, &mut tags, TagsSelect::ALL);

    println!("=== {} ===", path.display());
    println!("Title:    {}", tags.title.as_deref().unwrap_or("-"));
    println!("Artist:   {}", tags.artist.as_deref().unwrap_or("-"));
    println!("Album:    {}", tags.album.as_deref().unwrap_or("-"));
    match tags.track {
        Some(track) => println!("Track:    {}", track),
        None => println!("Track:    -"),
    }
    match tags.time {
        Some(secs) => println!("Duration: {}:{:02}", secs / 60, secs % 60),
        None => println!("Duration: unknown"),
    }

    let mut session = plugin.open(&path);
    if !session.is_ok() {
        eprintln!("{}", session.error());
        session.close();
        std::process::exit(1);
    }

    let mut buf = vec![0u8; 8192];
    let mut params = SoundParams::default();
    let mut total = 0usize;
    let mut sections = 0usize;
    let mut holes = 0usize;

    loop {
        let n = session.decode(&mut buf, &mut params);
        if session.error().is_set() {
            holes += 1;
        }
        if n == 0 {
            break;
        }
        total += n;

        let mut current = TagRecord::new();
        if session.current_tags(&mut current) {
            sections += 1;
        }
    }

    println!(
        "Format:   {} Hz, {} channel(s), {:?}",
        params.rate, params.channels, params.format
    );
    println!("Decoded:  {} bytes in {} section(s)", total, sections);
    println!("Bitrate:  {} kbps (last reading)", session.bitrate());
    if holes > 0 {
        println!("Holes:    {}", holes);
    }

    session.close();
    Ok(())
}
