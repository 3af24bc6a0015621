//! Track stepping within a loaded side.
//!
//! The audio thread asks `step_position` where to go on a manual skip or
//! when a track runs out, so the wrap/repeat rules live in one pure function.

use super::types::LoopMode;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Back,
}

/// Where playback should go from `pos` on a side of `len` tracks.
///
/// `manual` is true for user skips: those honour `LoopSide` wrapping but do
/// not repeat the current track under `LoopOne`. Returns `None` when the
/// needle should lift (end of side without looping, or an empty side).
pub(crate) fn step_position(
    pos: usize,
    len: usize,
    loop_mode: LoopMode,
    manual: bool,
    direction: Direction,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if !manual && loop_mode == LoopMode::LoopOne {
        return Some(pos.min(len - 1));
    }

    match direction {
        Direction::Forward if pos + 1 < len => Some(pos + 1),
        Direction::Forward => (loop_mode == LoopMode::LoopSide).then_some(0),
        Direction::Back if pos > 0 => Some((pos - 1).min(len - 1)),
        Direction::Back => (loop_mode == LoopMode::LoopSide).then_some(len - 1),
    }
}
