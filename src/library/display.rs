use crate::config::TrackDisplayField;

use super::model::Track;

fn push_trimmed(parts: &mut Vec<String>, value: Option<&str>) {
    if let Some(v) = value.map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(v.to_string());
    }
}

/// Build a display string for `track` from `fields`, joined by `sep`.
///
/// `Display` reuses the track's stored display string, or `artist - title`
/// while that is still blank (as it is during scanning). Falls back to the
/// title when no field produced anything.
pub fn compose_display(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        match f {
            TrackDisplayField::Display => {
                if !track.display.trim().is_empty() {
                    parts.push(track.display.clone());
                } else {
                    push_trimmed(&mut parts, track.artist.as_deref());
                    push_trimmed(&mut parts, Some(&track.title));
                }
            }
            TrackDisplayField::Title => push_trimmed(&mut parts, Some(&track.title)),
            TrackDisplayField::Artist => push_trimmed(&mut parts, track.artist.as_deref()),
            TrackDisplayField::Album => push_trimmed(&mut parts, track.album.as_deref()),
            TrackDisplayField::Filename => {
                push_trimmed(&mut parts, track.path.file_stem().and_then(|s| s.to_str()))
            }
            TrackDisplayField::Path => parts.push(track.path.display().to_string()),
        }
    }

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(sep)
    }
}
