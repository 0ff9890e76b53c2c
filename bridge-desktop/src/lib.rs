//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `FileStream` implements `IoStream` over `std::fs::File`
//! - `FileStreamFactory` implements `StreamFactory` for path-based opens
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::FileStreamFactory;
//! use bridge_traits::StreamFactory;
//! use std::path::Path;
//!
//! let factory = FileStreamFactory::new();
//! let stream = factory.open(Path::new("/music/song.ogg"));
//! if !stream.is_ok() {
//!     eprintln!("{}", stream.describe_error());
//! }
//! ```

mod filesystem;

pub use filesystem::{FileStream, FileStreamFactory};
