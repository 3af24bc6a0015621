use std::path::Path;

use lofty::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::compose_display;
use super::model::Track;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_blank(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Read tags and duration for one file. Files lofty can't parse still become
/// tracks, named after the file and without a duration.
fn read_track(path: &Path, settings: &LibrarySettings) -> Track {
    let mut track = Track {
        path: path.to_path_buf(),
        title: path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string(),
        artist: None,
        album_artist: None,
        album: None,
        track_no: None,
        disc_no: None,
        duration: None,
        display: String::new(),
    };

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            track.duration = Some(tagged.properties().duration());

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(title) = non_blank(tag.title()) {
                    track.title = title;
                }
                track.artist = non_blank(tag.artist());
                track.album_artist = tag
                    .items()
                    .find(|item| matches!(item.key(), ItemKey::AlbumArtist))
                    .and_then(|item| item.value().text())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                track.album = non_blank(tag.album());
                track.track_no = tag.track();
                track.disc_no = tag.disk();
            }
        }
        Err(e) => warn!(path = %path.display(), error = %e, "could not read tags"),
    }

    track.display = compose_display(&track, &settings.display_fields, &settings.display_separator);
    track
}

/// Walk `dir` and collect every audio file allowed by `settings`.
///
/// Tracks come back in path order; albums are ordered later, when the
/// library is assembled.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(read_track(path, settings));
        }
    }

    debug!(dir = %dir.display(), count = tracks.len(), "scanned library");
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackDisplayField;
    use std::fs;
    use tempfile::tempdir;

    fn names(tracks: &[Track]) -> Vec<String> {
        tracks.iter().map(|t| t.display.clone()).collect()
    }

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.wav"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn is_audio_file_tolerates_dotted_and_padded_extensions() {
        let settings = LibrarySettings {
            extensions: vec![" .OPUS ".into(), "".into()],
            ..LibrarySettings::default()
        };
        assert!(is_audio_file(Path::new("/tmp/a.opus"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.mp3"), &settings));
    }

    #[test]
    fn scan_filters_non_audio_and_keeps_file_name_order() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let settings = LibrarySettings {
            display_fields: vec![TrackDisplayField::Title],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);
        assert_eq!(tracks.len(), 2);
        assert_eq!(names(&tracks), vec!["A".to_string(), "b".to_string()]);
        assert!(tracks.iter().all(|t| t.album.is_none()));
    }

    #[test]
    fn scan_skips_hidden_files_by_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);

        assert_eq!(names(&tracks), vec!["visible".to_string()]);
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);
        assert_eq!(names(&tracks), vec!["root".to_string()]);
    }

    #[test]
    fn scan_respects_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        // WalkDir depth counts root as 0, so max_depth=2 stops above d1/d2/*.
        let settings = LibrarySettings {
            max_depth: Some(2),
            display_fields: vec![TrackDisplayField::Filename],
            ..LibrarySettings::default()
        };
        let names = names(&scan(dir.path(), &settings));
        assert!(names.contains(&"root".to_string()));
        assert!(names.contains(&"one".to_string()));
        assert!(!names.contains(&"two".to_string()));
    }
}
