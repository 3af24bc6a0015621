use super::display::compose_display;
use super::*;
use crate::config::TrackDisplayField;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn t(path: &str, album: Option<&str>, track_no: Option<u32>, secs: u64) -> Track {
    let path = PathBuf::from(path);
    Track {
        title: path.file_stem().unwrap().to_str().unwrap().to_string(),
        path,
        artist: Some("Artist".into()),
        album_artist: None,
        album: album.map(str::to_string),
        track_no,
        disc_no: None,
        duration: Some(Duration::from_secs(secs)),
        display: String::new(),
    }
}

fn with_album_artist(mut track: Track, artist: &str) -> Track {
    track.artist = Some(artist.into());
    track.album_artist = Some(artist.into());
    track
}

/// Id of an album tagged with a title but no album artist.
fn dir_tagged_id(album: &str, dir: &str) -> String {
    format!("tag:{}@{}", album, Path::new(dir).display())
}

fn titles(side: &crate::vinyl::Side<Track>) -> Vec<&str> {
    side.tracks().iter().map(|t| t.title.as_str()).collect()
}

#[test]
fn compose_display_can_format_artist_title() {
    let mut track = t("/tmp/Song.mp3", None, None, 1);
    let fields = [TrackDisplayField::Artist, TrackDisplayField::Title];
    assert_eq!(compose_display(&track, &fields, " - "), "Artist - Song");

    track.artist = Some("  Artist  ".into());
    assert_eq!(compose_display(&track, &fields, " - "), "Artist - Song");

    track.artist = None;
    assert_eq!(compose_display(&track, &fields, " - "), "Song");
}

#[test]
fn compose_display_prefers_stored_display_once_set() {
    let mut track = t("/music/x/Song.mp3", Some("LP"), None, 1);
    assert_eq!(
        compose_display(&track, &[TrackDisplayField::Display], " - "),
        "Artist - Song"
    );

    track.display = "custom".into();
    assert_eq!(
        compose_display(
            &track,
            &[TrackDisplayField::Display, TrackDisplayField::Album],
            " | "
        ),
        "custom | LP"
    );
    assert_eq!(
        compose_display(&track, &[TrackDisplayField::Filename], " - "),
        "Song"
    );
    assert_eq!(compose_display(&track, &[], " - "), "Song");
}

#[test]
fn track_reports_duration_in_milliseconds() {
    use crate::vinyl::HasDuration;

    let mut track = t("/a.mp3", None, None, 3);
    track.duration = Some(Duration::from_millis(2_500));
    assert_eq!(track.duration_ms(), Some(2_500.0));
    track.duration = None;
    assert_eq!(track.duration_ms(), None);
}

#[test]
fn from_tracks_groups_by_album_and_orders_by_track_number() {
    let tracks = vec![
        t("/m/lp/b.mp3", Some("Long Player"), Some(2), 600),
        t("/m/lp/a.mp3", Some("Long Player"), Some(1), 600),
        t("/m/lp/c.mp3", Some("Long Player"), Some(3), 600),
        t("/m/single/x.mp3", Some("Single"), Some(1), 200),
    ];
    let library = Library::from_tracks(tracks, 1320.0);
    assert_eq!(library.len(), 2);

    let lp = library.get(&dir_tagged_id("long player", "/m/lp")).unwrap();
    assert_eq!(lp.title, "Long Player");
    assert_eq!(lp.artist.as_deref(), Some("Artist"));
    assert_eq!(lp.discs().len(), 1);
    assert_eq!(titles(&lp.discs()[0].a), vec!["a", "b"]);
    assert_eq!(titles(&lp.discs()[0].b), vec!["c"]);
    assert_eq!(lp.track_count(), 3);
    assert_eq!(lp.duration(), Duration::from_secs(1800));

    let single = library.get(&dir_tagged_id("single", "/m/single")).unwrap();
    assert_eq!(single.side_count(), 2);
    assert!(single.side_by_letter('B').unwrap().is_empty());
}

#[test]
fn from_tracks_falls_back_to_directory_for_untagged_files() {
    let tracks = vec![
        t("/m/Demos/two.mp3", None, None, 60),
        t("/m/Demos/one.mp3", None, None, 60),
    ];
    let library = Library::from_tracks(tracks, 1320.0);
    let album = &library.albums()[0];
    assert_eq!(album.title, "Demos");
    assert_eq!(album.id, format!("dir:{}", Path::new("/m/Demos").display()));
    // Without track numbers, path order decides.
    assert_eq!(titles(album.side(0).unwrap()), vec!["one", "two"]);
}

#[test]
fn from_tracks_skips_albums_that_cannot_be_pressed() {
    let mut broken = t("/m/broken/a.mp3", Some("Broken"), Some(1), 60);
    broken.duration = None;
    let tracks = vec![broken, t("/m/ok/a.mp3", Some("Fine"), Some(1), 60)];

    let library = Library::from_tracks(tracks, 1320.0);
    assert_eq!(library.len(), 1);
    assert!(library.get(&dir_tagged_id("broken", "/m/broken")).is_none());
    assert!(library.get(&dir_tagged_id("fine", "/m/ok")).is_some());
}

#[test]
fn album_artist_becomes_various_when_tracks_disagree() {
    let mut a = t("/m/comp/a.mp3", Some("Comp"), Some(1), 60);
    let mut b = t("/m/comp/b.mp3", Some("Comp"), Some(2), 60);
    a.artist = Some("One".into());
    b.artist = Some("Two".into());
    let library = Library::from_tracks(vec![a, b], 1320.0);
    assert_eq!(
        library.albums()[0].artist.as_deref(),
        Some("Various Artists")
    );
    assert_eq!(library.albums()[0].display(), "Various Artists - Comp");
}

#[test]
fn same_title_by_different_album_artists_stays_apart() {
    let tracks = vec![
        with_album_artist(t("/m/hits/q1.mp3", Some("Greatest Hits"), Some(1), 200), "Queen"),
        with_album_artist(t("/m/hits/a1.mp3", Some("Greatest Hits"), Some(1), 200), "ABBA"),
        with_album_artist(t("/m/hits/q2.mp3", Some("Greatest Hits"), Some(2), 200), "Queen"),
    ];
    let library = Library::from_tracks(tracks, 1320.0);
    assert_eq!(library.len(), 2);

    let abba = library.get("tag:abba/greatest hits").unwrap();
    assert_eq!(abba.artist.as_deref(), Some("ABBA"));
    assert_eq!(abba.track_count(), 1);

    let queen = library.get("tag:queen/greatest hits").unwrap();
    assert_eq!(queen.artist.as_deref(), Some("Queen"));
    assert_eq!(titles(queen.side(0).unwrap()), vec!["q1", "q2"]);
}

#[test]
fn same_title_without_album_artist_groups_by_directory() {
    let mut live_a = t("/m/a/live/1.mp3", Some("Live"), Some(1), 100);
    let mut live_b = t("/m/b/live/1.mp3", Some("Live"), Some(1), 100);
    live_a.artist = Some("Band A".into());
    live_b.artist = Some("Band B".into());

    let library = Library::from_tracks(vec![live_a, live_b], 1320.0);
    assert_eq!(library.len(), 2);
    let artists: Vec<_> = library.albums().iter().map(|a| a.artist.as_deref()).collect();
    assert_eq!(artists, vec![Some("Band A"), Some("Band B")]);
}

#[test]
fn album_artist_tag_joins_discs_in_separate_directories() {
    let mut cd2 = with_album_artist(t("/m/opus/cd2/1.mp3", Some("Opus"), Some(1), 100), "Orchestra");
    cd2.disc_no = Some(2);
    let mut cd1 = with_album_artist(t("/m/opus/cd1/1.mp3", Some("Opus"), Some(1), 100), "Orchestra");
    cd1.disc_no = Some(1);
    // Guest performers on individual tracks don't change the album artist.
    cd1.artist = Some("Soloist".into());

    let library = Library::from_tracks(vec![cd2, cd1], 1320.0);
    assert_eq!(library.len(), 1);
    let opus = &library.albums()[0];
    assert_eq!(opus.artist.as_deref(), Some("Orchestra"));
    assert_eq!(titles(opus.side(0).unwrap()), vec!["1", "1"]);
    assert_eq!(opus.side(0).unwrap().tracks()[0].disc_no, Some(1));
}

#[test]
fn sides_are_addressed_by_letter_across_discs() {
    let tracks: Vec<Track> = (1..=5)
        .map(|n| t(&format!("/m/dbl/{n}.mp3"), Some("Double"), Some(n), 700))
        .collect();
    let album = Album::assemble("dbl".into(), "Double".into(), None, tracks, 1320.0).unwrap();

    assert_eq!(album.discs().len(), 3);
    assert_eq!(album.side_count(), 6);
    assert_eq!(titles(album.side_by_letter('a').unwrap()), vec!["1"]);
    assert_eq!(titles(album.side_by_letter('C').unwrap()), vec!["3"]);
    assert_eq!(titles(album.side_by_letter('E').unwrap()), vec!["5"]);
    assert!(album.side_by_letter('F').unwrap().is_empty());
    assert!(album.side_by_letter('G').is_none());
    assert!(album.side_by_letter('?').is_none());
    assert_eq!(album.sides().count(), 6);
}

#[test]
fn add_album_keeps_existing_entry_and_sort_order() {
    let mk = |id: &str, artist: &str| {
        Album::assemble(
            id.into(),
            id.into(),
            Some(artist.into()),
            vec![t("/m/x.mp3", None, None, 10)],
            1320.0,
        )
        .unwrap()
    };

    let mut library = Library::new();
    library.add_album(mk("zeta", "Beta"));
    library.add_album(mk("alpha", "Alpha"));
    library.add_album(mk("gamma", "Gamma"));

    let ids: Vec<&str> = library.albums().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "zeta", "gamma"]);

    let mut dup = mk("alpha", "Someone Else");
    dup.title = "Replacement".into();
    let kept = library.add_album(dup);
    assert_eq!(kept.title, "alpha");
    assert_eq!(library.len(), 3);
}

#[test]
fn remove_album_reports_whether_it_existed() {
    let album = Album::assemble(
        "gone".into(),
        "Gone".into(),
        None,
        vec![t("/m/x.mp3", None, None, 10)],
        1320.0,
    )
    .unwrap();
    let mut library = Library::new();
    library.add_album(album);

    assert!(library.remove_album("gone"));
    assert!(!library.remove_album("gone"));
    assert!(library.is_empty());
}
