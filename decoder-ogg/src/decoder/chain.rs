//! # Chained Stream Layout
//!
//! An Ogg file may be a chain of complete physical streams played back to
//! back, each with its own headers, comments and sample rate. The demuxer
//! only knows about the link it is currently reading, so whole-file
//! duration, average bitrate and seeking into other links come from a single
//! scan of the page headers made when the stream is fully opened.

use std::io::{self, Read, Seek, SeekFrom};

/// Ogg page header: capture pattern, version, type, granule position,
/// serial, sequence number, CRC and segment count.
const PAGE_HEADER_LEN: usize = 27;

/// Header type flag marking the first page of a logical stream.
const FLAG_FIRST_PAGE: u8 = 0x02;

/// Bytes of a Vorbis identification packet needed to read the sample rate.
const IDENT_PREFIX_LEN: usize = 16;

/// One physical stream of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// Byte offset of the link's first page.
    pub start: u64,
    /// Byte offset just past the link's last page.
    pub end: u64,
    pub rate: u32,
    /// Final granule position of the Vorbis stream, in frames.
    pub frames: u64,
}

impl Link {
    /// Playing time of the link in seconds.
    pub fn secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.rate)
    }
}

/// Per-link layout of a (possibly chained) Ogg Vorbis stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainMap {
    links: Vec<Link>,
}

/// Link under construction while scanning.
struct Partial {
    start: u64,
    serial: Option<u32>,
    rate: u32,
    frames: u64,
}

impl ChainMap {
    /// Walk the page headers from the current position to the end of the
    /// stream, skipping page bodies.
    ///
    /// Returns `Ok(None)` if any link lacks a Vorbis identification header.
    /// Scanning stops quietly at a truncated page or at bytes that are not a
    /// page header. The reader is left wherever scanning stopped.
    pub fn scan<R: Read + Seek>(reader: &mut R) -> io::Result<Option<Self>> {
        let mut pos = reader.stream_position()?;
        let mut partials: Vec<Partial> = Vec::new();
        let mut in_data = false;

        loop {
            let mut header = [0u8; PAGE_HEADER_LEN];
            if !read_full(reader, &mut header)? || &header[..4] != b"OggS" {
                break;
            }

            let flags = header[5];
            let granule = i64::from_le_bytes(le_field(&header, 6));
            let serial = u32::from_le_bytes(le_field(&header, 14));

            let mut lacing = vec![0u8; usize::from(header[26])];
            if !read_full(reader, &mut lacing)? {
                break;
            }
            let body_len: u64 = lacing.iter().map(|&l| u64::from(l)).sum();
            let mut consumed = 0u64;

            if flags & FLAG_FIRST_PAGE != 0 {
                if in_data || partials.is_empty() {
                    partials.push(Partial {
                        start: pos,
                        serial: None,
                        rate: 0,
                        frames: 0,
                    });
                    in_data = false;
                }

                if body_len >= IDENT_PREFIX_LEN as u64 {
                    let mut ident = [0u8; IDENT_PREFIX_LEN];
                    if !read_full(reader, &mut ident)? {
                        break;
                    }
                    consumed = IDENT_PREFIX_LEN as u64;

                    if let Some(link) = partials.last_mut() {
                        if link.serial.is_none() && &ident[..7] == b"\x01vorbis" {
                            link.serial = Some(serial);
                            link.rate = u32::from_le_bytes(le_field(&ident, 12));
                        }
                    }
                }
            } else {
                in_data = true;
                if let Some(link) = partials.last_mut() {
                    if link.serial == Some(serial) && granule >= 0 {
                        link.frames = granule as u64;
                    }
                }
            }

            let skip = body_len - consumed;
            if skip > 0 {
                reader.seek(SeekFrom::Current(skip as i64))?;
            }
            pos += (PAGE_HEADER_LEN + lacing.len()) as u64 + body_len;
        }

        if partials.is_empty() || partials.iter().any(|p| p.serial.is_none() || p.rate == 0) {
            return Ok(None);
        }

        let ends: Vec<u64> = partials
            .iter()
            .skip(1)
            .map(|p| p.start)
            .chain(std::iter::once(pos))
            .collect();

        let links = partials
            .iter()
            .zip(ends)
            .map(|(p, end)| Link {
                start: p.start,
                end,
                rate: p.rate,
                frames: p.frames,
            })
            .collect();

        Ok(Some(Self { links }))
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link(&self, index: usize) -> Option<&Link> {
        self.links.get(index)
    }

    /// Playing time of the whole chain in seconds.
    pub fn total_secs(&self) -> f64 {
        self.links.iter().map(Link::secs).sum()
    }

    /// Bytes spanned by all links.
    pub fn total_bytes(&self) -> u64 {
        match (self.links.first(), self.links.last()) {
            (Some(first), Some(last)) => last.end - first.start,
            _ => 0,
        }
    }

    /// Find the link playing at `secs` from the start of the chain and the
    /// offset into that link.
    ///
    /// Positions at or past the end of the chain have no link.
    pub fn locate(&self, secs: f64) -> Option<(usize, f64)> {
        let mut elapsed = 0.0;
        for (index, link) in self.links.iter().enumerate() {
            let len = link.secs();
            if secs < elapsed + len {
                return Some((index, (secs - elapsed).max(0.0)));
            }
            elapsed += len;
        }
        None
    }
}

/// Copy the `N` bytes at `at` for a `from_le_bytes` call.
fn le_field<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut field = [0u8; N];
    field.copy_from_slice(&bytes[at..at + N]);
    field
}

/// `read_exact` that reports a clean end of stream as `false`.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}
