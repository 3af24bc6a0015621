//! Record model types: `Side`, `Disc` and side-letter addressing.

use std::time::Duration;

/// Anything that can be pressed onto a side.
///
/// Implementors report their length in milliseconds. `None` means the length
/// is unknown, which `partition` treats as invalid input.
pub trait HasDuration {
    fn duration_ms(&self) -> Option<f64>;
}

impl HasDuration for Duration {
    fn duration_ms(&self) -> Option<f64> {
        Some(self.as_secs_f64() * 1000.0)
    }
}

impl<T: HasDuration + ?Sized> HasDuration for &T {
    fn duration_ms(&self) -> Option<f64> {
        (**self).duration_ms()
    }
}

/// One physical side of a record: consecutive tracks plus their total length.
///
/// An empty side is a padding placeholder (e.g. the blank B side of a single
/// leftover A side), not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Side<T> {
    tracks: Vec<T>,
    duration_ms: f64,
}

impl<T> Side<T> {
    /// An empty padding side.
    pub fn empty() -> Self {
        Self {
            tracks: Vec::new(),
            duration_ms: 0.0,
        }
    }

    /// Build a side whose total is already known. Callers must pass the sum of
    /// the tracks' validated durations.
    pub(super) fn with_total(tracks: Vec<T>, duration_ms: f64) -> Self {
        Self {
            tracks,
            duration_ms,
        }
    }

    pub fn tracks(&self) -> &[T] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total length in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Total length as a `Duration`, saturating at `Duration::MAX`.
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_ms().max(0.0) / 1000.0).unwrap_or(Duration::MAX)
    }
}

impl<T> Default for Side<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// A single record: an A side and a B side.
#[derive(Debug, Clone, PartialEq)]
pub struct Disc<T> {
    pub a: Side<T>,
    pub b: Side<T>,
}

impl<T> Disc<T> {
    pub fn sides(&self) -> [&Side<T>; 2] {
        [&self.a, &self.b]
    }

    pub fn duration(&self) -> Duration {
        self.a.duration().saturating_add(self.b.duration())
    }
}

/// Group sides pairwise into discs: sides 0+1 make disc 1, 2+3 disc 2, and so on.
///
/// `partition` always yields an even count. A stray odd side still gets a
/// disc, with an empty B side.
pub fn pair_into_discs<T>(sides: Vec<Side<T>>) -> Vec<Disc<T>> {
    let mut discs = Vec::with_capacity(sides.len().div_ceil(2));
    let mut iter = sides.into_iter();
    while let Some(a) = iter.next() {
        let b = iter.next().unwrap_or_default();
        discs.push(Disc { a, b });
    }
    discs
}

/// Letter for the side at `position` in flattened disc order (`0 -> 'A'`).
///
/// Returns `None` past `'Z'`.
pub fn side_letter(position: usize) -> Option<char> {
    u8::try_from(position)
        .ok()
        .filter(|p| *p < 26)
        .map(|p| char::from(b'A' + p))
}

/// Position addressed by a side letter, case-insensitive (`'c' -> 2`).
pub fn side_position(letter: char) -> Option<usize> {
    if !letter.is_ascii_alphabetic() {
        return None;
    }
    Some((letter.to_ascii_uppercase() as u8 - b'A') as usize)
}

/// Format a duration as `M:SS`, the way sleeve notes list side lengths.
pub fn format_side_length(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
