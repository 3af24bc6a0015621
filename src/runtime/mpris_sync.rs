use crate::app::App;
use crate::mpris::{MprisHandle, track_object_path};

pub fn update_mpris(mpris: &MprisHandle, app: &App) {
    match app.now_playing_track() {
        Some((side, pos, track)) => mpris.set_track_metadata(
            Some(track_object_path(side.album, side.letter(), pos)),
            Some(track),
        ),
        None => mpris.set_track_metadata(None, None),
    }
    mpris.set_playback(app.playback);
}
