use std::path::PathBuf;
use std::time::Duration;

use crate::vinyl::HasDuration;

/// A playable file on disk with the tags needed to press it onto a side.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub track_no: Option<u32>,
    pub disc_no: Option<u32>,
    pub duration: Option<Duration>,
    pub display: String,
}

impl HasDuration for Track {
    fn duration_ms(&self) -> Option<f64> {
        self.duration.map(|d| d.as_secs_f64() * 1000.0)
    }
}
