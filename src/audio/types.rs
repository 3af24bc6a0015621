//! Audio-related small types and handles.
//!
//! This module defines common enums and type aliases used by the
//! audio subsystem (looping mode, commands, playback info and handles).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::Track;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Lift the needle at the end of the side.
    #[default]
    NoLoop,
    /// Go back to the first track of the side.
    LoopSide,
    /// Repeat the current track when it ends.
    LoopOne,
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the loaded side and start playing at position `start`.
    /// `generation` is echoed back through `PlaybackInfo`.
    LoadSide {
        tracks: Vec<Track>,
        start: usize,
        generation: u64,
    },
    /// Stop playback immediately.
    Stop,
    /// Toggle pause/resume.
    TogglePause,
    /// Set the loop mode used by the player.
    SetLoopMode(LoopMode),
    /// Skip to the next track on the side.
    Next,
    /// Go to the previous track on the side.
    Prev,
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i32),
}

#[derive(Debug, Clone, Default)]
/// Runtime playback information shared with the UI.
pub struct PlaybackInfo {
    /// Position of the playing track within the loaded side (if any).
    pub position: Option<usize>,
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    /// Whether playback is currently active.
    pub playing: bool,
    /// Set when the last track of the side ended without looping.
    /// The UI clears it once it has reacted (e.g. by flipping the record).
    pub side_finished: bool,
    /// Generation of the last `LoadSide` the audio thread picked up.
    pub generation: u64,
}

impl PlaybackInfo {
    /// Clear the end-of-side flag and report whether it was set for the side
    /// loaded as `generation`. A side that ran out after the UI already asked
    /// for another one must not trigger a flip.
    pub fn take_finished(&mut self, generation: u64) -> bool {
        std::mem::take(&mut self.side_finished) && self.generation == generation
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
