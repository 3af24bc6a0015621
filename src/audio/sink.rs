//! Utilities for creating `rodio` sinks from `Track` values.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};
use thiserror::Error;

use crate::library::Track;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
}

/// Create a paused `Sink` for `track` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    track: &Track,
    start_at: Duration,
) -> Result<Sink, SinkError> {
    let file = File::open(&track.path).map_err(|source| SinkError::Open {
        path: track.path.clone(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file))
        .map_err(|source| SinkError::Decode {
            path: track.path.clone(),
            source,
        })?
        // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
        .skip_duration(start_at);

    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
