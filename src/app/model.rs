//! Application model types: `App`, `PlaybackState` and `SideRef`.
//!
//! The `App` struct owns the session: the pressed library, which album and
//! side the cursor is on, which side is on the platter, and the playback
//! flags used by the UI and runtime.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::audio::{LoopMode, PlaybackHandle};
use crate::library::{Album, Library, Track};
use crate::vinyl::{self, Side};

/// The playback state of the application.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Address of one side: album index in the library, side position in the album.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SideRef {
    pub album: usize,
    pub side: usize,
}

impl SideRef {
    pub fn letter(&self) -> char {
        vinyl::side_letter(self.side).unwrap_or('?')
    }

    /// 1-based disc number.
    pub fn disc(&self) -> usize {
        self.side / 2 + 1
    }
}

/// The main application model.
pub struct App {
    pub library: Library,
    pub selected: usize,
    pub selected_side: usize,
    pub now_playing: Option<SideRef>,
    /// Bumped on every `begin_side`; tags the matching `LoadSide` command.
    pub side_generation: u64,
    pub playback: PlaybackState,
    pub playback_handle: Option<PlaybackHandle>,

    lower_titles: Vec<String>,

    pub follow_playback: bool,
    pub loop_mode: LoopMode,
    pub auto_flip: bool,

    pub filter_mode: bool,
    pub filter_query: String,
    pub current_dir: Option<String>,
    pub metadata_window: bool,
    pub side_jump_pending: bool,
}

impl App {
    /// Create a new `App` over a pressed `library`.
    pub fn new(library: Library) -> Self {
        let lower_titles = Self::lower_titles_for(&library);
        Self {
            library,
            selected: 0,
            selected_side: 0,
            now_playing: None,
            side_generation: 0,
            playback: PlaybackState::Stopped,
            playback_handle: None,

            lower_titles,

            follow_playback: true,
            loop_mode: LoopMode::NoLoop,
            auto_flip: true,

            filter_mode: false,
            filter_query: String::new(),
            current_dir: None,
            metadata_window: false,
            side_jump_pending: false,
        }
    }

    fn lower_titles_for(library: &Library) -> Vec<String> {
        library
            .albums()
            .iter()
            .map(|a| a.display().to_lowercase())
            .collect()
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }
    /// Cycle `loop_mode` through `NoLoop -> LoopSide -> LoopOne`.
    pub fn cycle_loop_mode(&mut self) {
        self.loop_mode = match self.loop_mode {
            LoopMode::NoLoop => LoopMode::LoopSide,
            LoopMode::LoopSide => LoopMode::LoopOne,
            LoopMode::LoopOne => LoopMode::NoLoop,
        };
    }
    pub fn toggle_auto_flip(&mut self) {
        self.auto_flip = !self.auto_flip;
    }
    /// Enable following playback (cursor follows the album on the platter).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }
    /// Attach a `PlaybackHandle` used to observe playback progress.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }
    /// Record the scanned directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn album(&self, index: usize) -> Option<&Album> {
        self.library.albums().get(index)
    }

    pub fn selected_album(&self) -> Option<&Album> {
        self.album(self.selected)
    }

    /// Return album indices in display order, after the fuzzy filter.
    pub fn display_indices(&self) -> Vec<usize> {
        let all = 0..self.library.len();
        let query = self.filter_query.trim();
        if query.is_empty() {
            return all.collect();
        }

        let query_lower = query.to_lowercase();
        all.filter(|&i| Self::fuzzy_match_positions_lower(&self.lower_titles[i], &query_lower).is_some())
            .collect()
    }

    /// Fuzzy-match `query_lower` against the album at `album_index`.
    ///
    /// Returns the character positions that match, or `None` when there is no match.
    pub fn fuzzy_match_positions_for_album(
        &self,
        album_index: usize,
        query_lower: &str,
    ) -> Option<Vec<usize>> {
        let title = self.lower_titles.get(album_index)?;
        Self::fuzzy_match_positions_lower(title, query_lower)
    }

    /// Fuzzy/subsequence match: return the character positions in `title_lower`
    /// that match `query_lower`, or `None` if not matched.
    fn fuzzy_match_positions_lower(title_lower: &str, query_lower: &str) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title_lower.chars().enumerate();

        for qc in query_lower.chars() {
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc == qc => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Return the next visible album after `current`, wrapping around.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        match display.iter().position(|&i| i == current) {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible album before `current`, wrapping around.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        match display.iter().position(|&i| i == current) {
            Some(0) | None => Some(display[display.len() - 1]),
            Some(p) => Some(display[p - 1]),
        }
    }

    /// Move the cursor to album `idx`. Changing album resets the side cursor.
    pub fn set_selected(&mut self, idx: usize) {
        if idx != self.selected {
            self.selected_side = 0;
        }
        self.selected = idx;
        self.ensure_selected_visible();
    }

    /// Move selection to the next visible album.
    pub fn next(&mut self) {
        if let Some(next) = self.next_in_view_from(self.selected) {
            self.set_selected(next);
        }
    }

    /// Move selection to the previous visible album.
    pub fn prev(&mut self) {
        if let Some(prev) = self.prev_in_view_from(self.selected) {
            self.set_selected(prev);
        }
    }

    pub fn select_first(&mut self) {
        if let Some(&first) = self.display_indices().first() {
            self.set_selected(first);
        }
    }

    pub fn select_last(&mut self) {
        if let Some(&last) = self.display_indices().last() {
            self.set_selected(last);
        }
    }

    /// Select the `n`th visible album (1-based). Returns false when out of range.
    pub fn select_by_number(&mut self, n: usize) -> bool {
        let display = self.display_indices();
        match n.checked_sub(1).and_then(|i| display.get(i)) {
            Some(&idx) => {
                self.set_selected(idx);
                true
            }
            None => false,
        }
    }

    /// Move the side cursor forward, wrapping within the album.
    pub fn next_side(&mut self) {
        if let Some(count) = self.selected_album().map(Album::side_count).filter(|&c| c > 0) {
            self.selected_side = (self.selected_side + 1) % count;
        }
    }

    /// Move the side cursor back, wrapping within the album.
    pub fn prev_side(&mut self) {
        if let Some(count) = self.selected_album().map(Album::side_count).filter(|&c| c > 0) {
            self.selected_side = (self.selected_side + count - 1) % count;
        }
    }

    /// Point the side cursor at `letter` on the selected album.
    pub fn select_side_letter(&mut self, letter: char) -> bool {
        let pressed = self
            .selected_album()
            .and_then(|album| album.side_by_letter(letter))
            .is_some();
        match vinyl::side_position(letter) {
            Some(pos) if pressed => {
                self.selected_side = pos;
                true
            }
            _ => false,
        }
    }

    pub fn selected_side_ref(&self) -> Option<SideRef> {
        self.selected_album()?;
        Some(SideRef {
            album: self.selected,
            side: self.selected_side,
        })
    }

    pub fn side(&self, r: SideRef) -> Option<&Side<Track>> {
        self.album(r.album)?.side(r.side)
    }

    /// The next side on the same album that has music on it.
    pub fn next_side_after(&self, r: SideRef) -> Option<SideRef> {
        let album = self.album(r.album)?;
        (r.side + 1..album.side_count())
            .find(|&s| album.side(s).is_some_and(|side| !side.is_empty()))
            .map(|side| SideRef {
                album: r.album,
                side,
            })
    }

    /// Pick any non-empty side in the library.
    pub fn random_side<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<SideRef> {
        let candidates: Vec<SideRef> = self
            .library
            .albums()
            .iter()
            .enumerate()
            .flat_map(|(album, a)| {
                a.sides()
                    .enumerate()
                    .filter(|(_, s)| !s.is_empty())
                    .map(move |(side, _)| SideRef { album, side })
            })
            .collect();
        candidates.choose(rng).copied()
    }

    /// Put side `r` on the platter: returns its tracks for the audio thread.
    ///
    /// Returns `None` (and leaves state untouched) for unknown or blank sides.
    pub fn begin_side(&mut self, r: SideRef) -> Option<Vec<Track>> {
        let tracks = self.side(r).filter(|s| !s.is_empty())?.tracks().to_vec();
        self.now_playing = Some(r);
        self.side_generation += 1;
        self.playback = PlaybackState::Playing;
        if self.follow_playback && !self.filter_mode {
            self.set_selected(r.album);
            self.selected_side = r.side;
        }
        Some(tracks)
    }

    /// Clear the platter.
    pub fn end_side(&mut self) {
        self.now_playing = None;
        self.playback = PlaybackState::Stopped;
    }

    /// Position of the playing track within the loaded side, as reported by the audio thread.
    /// Reports from a side loaded before the latest `begin_side` are ignored.
    pub fn playing_position(&self) -> Option<usize> {
        self.playback_handle.as_ref().and_then(|h| {
            let info = h.lock().ok()?;
            (info.generation == self.side_generation)
                .then_some(info.position)
                .flatten()
        })
    }

    /// The track currently on the platter, with its side and position.
    pub fn now_playing_track(&self) -> Option<(SideRef, usize, &Track)> {
        let r = self.now_playing?;
        let pos = self.playing_position()?;
        let track = self.side(r)?.tracks().get(pos)?;
        Some((r, pos, track))
    }

    /// Human label for a side, e.g. `Disc 2 / Side C`.
    pub fn side_label(r: SideRef) -> String {
        format!("Disc {} / Side {}", r.disc(), r.letter())
    }

    /// Drop the selected album from this session's library.
    ///
    /// Returns true when the album on the platter was the one removed, so
    /// the caller can stop playback.
    pub fn remove_selected_album(&mut self) -> bool {
        let Some(id) = self.selected_album().map(|a| a.id.clone()) else {
            return false;
        };
        if !self.library.remove_album(&id) {
            return false;
        }
        self.lower_titles = Self::lower_titles_for(&self.library);

        let removed = self.selected;
        let mut was_playing = false;
        self.now_playing = match self.now_playing {
            Some(r) if r.album == removed => {
                was_playing = true;
                None
            }
            Some(r) if r.album > removed => Some(SideRef {
                album: r.album - 1,
                side: r.side,
            }),
            other => other,
        };
        if was_playing {
            self.playback = PlaybackState::Stopped;
        }

        self.selected_side = 0;
        if self.selected >= self.library.len() {
            self.selected = self.library.len().saturating_sub(1);
        }
        self.ensure_selected_visible();
        was_playing
    }

    /// Enter filter mode: enable filtering and adjust cursor behavior.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.follow_playback_off();
        self.ensure_selected_visible();
    }
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }
    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }
    /// Append a character to the filter query and refresh view.
    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }
    /// Remove the last character from the filter query and refresh view.
    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible album.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            self.selected_side = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
            self.selected_side = 0;
        }
    }
}
