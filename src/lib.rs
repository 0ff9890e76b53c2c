//! Workspace facade crate.
//!
//! Re-exports the Ogg Vorbis decoder plugin together with the desktop stream
//! bridge and runtime logging so host applications can depend on
//! `ogg-player-workspace` alone and pick features instead of wiring each
//! crate individually.

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;
#[cfg(feature = "desktop-shims")]
pub use core_runtime;
#[cfg(feature = "desktop-shims")]
pub use decoder_ogg;
