use super::*;
use std::path::PathBuf;
use std::time::Duration;

fn make_track() -> Track {
    Track {
        path: PathBuf::from("/tmp/music/test.mp3"),
        title: "Test Title".to_string(),
        artist: Some("Test Artist".to_string()),
        album_artist: None,
        album: Some("Test Album".to_string()),
        track_no: Some(3),
        disc_no: Some(1),
        duration: Some(Duration::from_micros(1_234_567)),
        display: "Test Artist - Test Title".to_string(),
    }
}

fn handle() -> (MprisHandle, Arc<Mutex<SharedState>>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    (
        MprisHandle {
            state: state.clone(),
        },
        state,
    )
}

#[test]
fn track_object_path_encodes_album_side_and_position() {
    assert_eq!(
        track_object_path(4, 'C', 2),
        "/org/mpris/MediaPlayer2/track/a4_C2"
    );
    assert!(ObjectPath::try_from(track_object_path(0, 'A', 0).as_str()).is_ok());
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state) = handle();

    let track = make_track();
    handle.set_track_metadata(Some(track_object_path(7, 'B', 1)), Some(&track));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Artist".to_string()]);
        assert_eq!(s.album.as_deref(), Some("Test Album"));
        assert!(s.url.as_deref().unwrap().contains("/tmp/music/test.mp3"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_deref(),
            Some("/org/mpris/MediaPlayer2/track/a7_B1")
        );
    }

    handle.set_track_metadata(None, None);
    let s = state.lock().unwrap();
    assert!(s.title.is_none());
    assert!(s.artist.is_empty());
    assert!(s.track_id.is_none());
    assert!(s.length_micros.is_none());
}

#[test]
fn set_playback_updates_status() {
    let (handle, state) = handle();
    handle.set_playback(PlaybackState::Paused);
    assert_eq!(state.lock().unwrap().playback, PlaybackState::Paused);
}

#[test]
fn metadata_map_exposes_populated_fields_only() {
    let (handle, state) = handle();

    let empty = metadata_map(&state.lock().unwrap());
    assert!(empty.contains_key("mpris:trackid"));
    assert!(empty.contains_key("xesam:title"));
    assert!(!empty.contains_key("xesam:artist"));
    assert!(!empty.contains_key("mpris:length"));

    handle.set_track_metadata(Some(track_object_path(1, 'A', 0)), Some(&make_track()));
    let full = metadata_map(&state.lock().unwrap());
    for key in [
        "mpris:trackid",
        "mpris:length",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "xesam:url",
    ] {
        assert!(full.contains_key(key), "missing {key}");
    }
}
