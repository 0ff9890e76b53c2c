//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the host player and its decoder plugins:
//! - Logging and tracing infrastructure
//!
//! ## Overview
//!
//! Plugins emit `tracing` events and never install a subscriber themselves.
//! The host initialises logging once through [`logging::init_logging`], which
//! also mirrors events to the host's `LoggerSink`.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
