//! One-shot tag and duration probe.
//!
//! Opens a file, reads what was asked for into the caller's tag record and
//! releases everything before returning. Failures are logged and leave the
//! record as it was.

use bridge_traits::{share, StreamFactory, TagRecord, TagsSelect};
use core_runtime::logging::strip_path;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::comments::apply_comments;
use crate::decoder::{OpenMode, VorbisBackend};
use crate::stream_adapter::StreamAdapter;

/// Fill the facets of `tags` selected by `select` for the file at `path`.
///
/// Only a [`TagsSelect::TIME`] request pays for a full open; comments alone
/// are read with a header-only open.
#[instrument(skip_all)]
pub fn probe_info(
    factory: &dyn StreamFactory,
    backend: &dyn VorbisBackend,
    path: &Path,
    tags: &mut TagRecord,
    select: TagsSelect,
) {
    let name = path.to_string_lossy();
    debug!(file = strip_path(&name), ?select, "Probing OGG file");

    let mut stream = factory.open(path);
    if !stream.is_ok() {
        warn!("Can't open an OGG file: {}", stream.describe_error());
        stream.close();
        return;
    }

    let stream = share(stream);
    let mode = if select.contains(TagsSelect::TIME) {
        OpenMode::Full
    } else {
        OpenMode::Test
    };

    let codec = match backend.open(StreamAdapter::new(Arc::clone(&stream), mode)) {
        Ok(codec) => codec,
        Err(e) => {
            warn!("Can't open OGG stream: {}", e);
            stream.lock().close();
            return;
        }
    };

    if select.contains(TagsSelect::COMMENTS) {
        apply_comments(tags, &codec.comments());
    }

    if select.contains(TagsSelect::TIME) {
        match codec.time_total() {
            Some(secs) => tags.time = Some(secs),
            None => debug!("Duration unknown"),
        }
    }

    drop(codec);
    stream.lock().close();
}
