use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::vinyl::{self, Disc, PartitionError, Side};

use super::model::Track;

/// Stable key for an album within a library.
pub type AlbumId = String;

/// An album pressed onto one or more discs.
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist: Option<String>,
    discs: Vec<Disc<Track>>,
}

impl Album {
    /// Press `tracks` (already in play order) onto sides of `budget_secs` and
    /// pair the sides into discs.
    pub fn assemble(
        id: AlbumId,
        title: String,
        artist: Option<String>,
        tracks: Vec<Track>,
        budget_secs: f64,
    ) -> Result<Self, PartitionError> {
        let sides = vinyl::partition(&tracks, budget_secs)?;
        Ok(Self {
            id,
            title,
            artist,
            discs: vinyl::pair_into_discs(sides),
        })
    }

    pub fn discs(&self) -> &[Disc<Track>] {
        &self.discs
    }

    /// All sides in flattened disc order: 1A, 1B, 2A, 2B, ...
    pub fn sides(&self) -> impl Iterator<Item = &Side<Track>> {
        self.discs.iter().flat_map(|d| d.sides())
    }

    /// Side at `position` in flattened disc order.
    pub fn side(&self, position: usize) -> Option<&Side<Track>> {
        let disc = self.discs.get(position / 2)?;
        Some(if position % 2 == 0 { &disc.a } else { &disc.b })
    }

    /// Side addressed by letter (`'A'` is disc 1's A side, `'C'` disc 2's A side).
    pub fn side_by_letter(&self, letter: char) -> Option<&Side<Track>> {
        self.side(vinyl::side_position(letter)?)
    }

    pub fn side_count(&self) -> usize {
        self.discs.len() * 2
    }

    pub fn track_count(&self) -> usize {
        self.sides().map(Side::len).sum()
    }

    pub fn duration(&self) -> Duration {
        self.discs
            .iter()
            .map(Disc::duration)
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// `Artist - Title`, or just the title when the artist is unknown.
    pub fn display(&self) -> String {
        match self.artist.as_deref() {
            Some(a) => format!("{} - {}", a, self.title),
            None => self.title.clone(),
        }
    }

    fn sort_key(&self) -> (String, String) {
        (
            self.artist.as_deref().unwrap_or("").to_lowercase(),
            self.title.to_lowercase(),
        )
    }
}

/// The albums available this session, ordered by artist then title.
#[derive(Debug, Clone, Default)]
pub struct Library {
    albums: Vec<Album>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group scanned tracks into albums and press each one.
    ///
    /// Tracks are grouped by album artist and album tag. Without an album
    /// artist, album tag and directory; fully untagged files by directory.
    /// Within an album they play in disc, track number, then path order.
    /// Albums that can't be pressed (e.g. a track with no duration) are left
    /// out with a warning.
    pub fn from_tracks(tracks: Vec<Track>, budget_secs: f64) -> Self {
        let mut groups: BTreeMap<AlbumId, Vec<Track>> = BTreeMap::new();
        for track in tracks {
            groups.entry(album_key(&track)).or_default().push(track);
        }

        let mut library = Self::new();
        for (id, mut tracks) in groups {
            tracks.sort_by(|a, b| {
                let key = |t: &Track| {
                    (
                        t.disc_no.unwrap_or(u32::MAX),
                        t.track_no.unwrap_or(u32::MAX),
                    )
                };
                key(a).cmp(&key(b)).then_with(|| a.path.cmp(&b.path))
            });

            let title = album_title(&tracks[0]);
            let artist = album_artist(&tracks);

            match Album::assemble(id, title, artist, tracks, budget_secs) {
                Ok(album) => {
                    library.add_album(album);
                }
                Err(e) => warn!(error = %e, "skipping album that could not be pressed"),
            }
        }

        info!(albums = library.len(), "library assembled");
        library
    }

    /// Add `album` unless one with the same id is already present.
    /// Returns the album now held by the library.
    pub fn add_album(&mut self, album: Album) -> &Album {
        if let Some(pos) = self.position(&album.id) {
            debug!(album = %album.title, "album already in library");
            return &self.albums[pos];
        }

        debug!(album = %album.title, sides = album.side_count(), "album added to library");
        let key = album.sort_key();
        let pos = self.albums.partition_point(|a| a.sort_key() <= key);
        self.albums.insert(pos, album);
        &self.albums[pos]
    }

    /// Remove the album with `id`. Returns whether anything was removed.
    pub fn remove_album(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(pos) => {
                let album = self.albums.remove(pos);
                debug!(album = %album.title, "album removed from library");
                true
            }
            None => {
                debug!(id, "album not found in library");
                false
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&Album> {
        self.position(id).map(|pos| &self.albums[pos])
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.albums.iter().position(|a| a.id == id)
    }
}

fn parent_dir(track: &Track) -> &Path {
    track.path.parent().unwrap_or_else(|| Path::new(""))
}

/// Albums are keyed on album artist plus album title. Without an album
/// artist tag, the title alone could merge unrelated records ("Greatest
/// Hits"), so the containing directory joins the key instead.
fn album_key(track: &Track) -> AlbumId {
    let album = track.album.as_deref().map(str::to_lowercase);
    match (track.album_artist.as_deref(), album) {
        (Some(artist), Some(album)) => format!("tag:{}/{}", artist.to_lowercase(), album),
        (None, Some(album)) => format!("tag:{}@{}", album, parent_dir(track).display()),
        (_, None) => format!("dir:{}", parent_dir(track).display()),
    }
}

fn album_title(track: &Track) -> String {
    track
        .album
        .clone()
        .or_else(|| {
            parent_dir(track)
                .file_name()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown album".to_string())
}

/// The tagged album artist, else the shared track artist, else "Various
/// Artists" when the tracks disagree.
fn album_artist(tracks: &[Track]) -> Option<String> {
    if let Some(artist) = tracks.iter().find_map(|t| t.album_artist.as_deref()) {
        return Some(artist.to_string());
    }
    let mut artists = tracks.iter().filter_map(|t| t.artist.as_deref());
    let first = artists.next()?;
    if artists.all(|a| a.eq_ignore_ascii_case(first)) {
        Some(first.to_string())
    } else {
        Some("Various Artists".to_string())
    }
}
