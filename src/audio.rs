//! Side playback on a dedicated audio thread.
//!
//! The UI loads one vinyl side at a time with `AudioCmd::LoadSide`; the
//! thread plays its tracks in order and reports progress through the shared
//! `PlaybackHandle`.

mod player;
mod queue;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::*;
