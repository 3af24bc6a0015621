//! MPRIS D-Bus service so media keys and `playerctl` can drive playback.
//!
//! Incoming method calls are forwarded to the runtime as `ControlCmd`s over a
//! channel; the runtime pushes now-playing state back through `MprisHandle`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};

use async_io::{Timer, block_on};
use tracing::{info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::app::PlaybackState;
use crate::library::Track;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const NO_TRACK_PATH: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    track_id: Option<String>,
    title: Option<String>,
    artist: Vec<String>,
    album: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

/// Object path identifying a track by album, side and position on the side.
pub fn track_object_path(album: usize, side_letter: char, position: usize) -> String {
    format!("{OBJECT_PATH}/track/a{album}_{side_letter}{position}")
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    /// Publish metadata for the playing track, or clear it with `None`.
    pub fn set_track_metadata(&self, track_id: Option<String>, track: Option<&Track>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        match track {
            Some(t) => {
                s.track_id = track_id;
                s.title = Some(t.title.clone());
                s.artist = t.artist.iter().cloned().collect();
                s.album = t.album.clone();
                s.url = Some(format!("file://{}", t.path.display()));
                s.length_micros = t.duration.map(|d| d.as_micros().min(i64::MAX as u128) as i64);
            }
            None => {
                s.track_id = None;
                s.title = None;
                s.artist.clear();
                s.album = None;
                s.url = None;
                s.length_micros = None;
            }
        }
    }
}

fn owned(v: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(v).ok()
}

fn metadata_map(s: &SharedState) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();

    let track_id = s.track_id.as_deref().unwrap_or(NO_TRACK_PATH);
    if let Some(v) = ObjectPath::try_from(track_id)
        .ok()
        .and_then(|p| owned(Value::from(p)))
    {
        map.insert("mpris:trackid".to_string(), v);
    }
    if let Some(v) = owned(Value::from(s.title.clone().unwrap_or_default())) {
        map.insert("xesam:title".to_string(), v);
    }
    if !s.artist.is_empty() {
        if let Some(v) = owned(Value::from(s.artist.clone())) {
            map.insert("xesam:artist".to_string(), v);
        }
    }
    if let Some(v) = s.album.clone().and_then(|a| owned(Value::from(a))) {
        map.insert("xesam:album".to_string(), v);
    }
    if let Some(v) = s.url.clone().and_then(|u| owned(Value::from(u))) {
        map.insert("xesam:url".to_string(), v);
    }
    if let Some(v) = s.length_micros.and_then(|l| owned(Value::from(l))) {
        map.insert("mpris:length".to_string(), v);
    }
    map
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "platter"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        match self.state.lock() {
            Ok(s) => metadata_map(&s),
            Err(_) => HashMap::new(),
        }
    }
}

/// Register the MPRIS service on the session bus from a background thread.
///
/// Failing to reach D-Bus is logged and otherwise ignored: the player works
/// without media keys.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "MPRIS: failed to connect to session bus");
                    return;
                }
            };

            if let Err(e) = connection
                .request_name("org.mpris.MediaPlayer2.platter")
                .await
            {
                warn!(error = %e, "MPRIS: failed to acquire name");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server
                .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                .await
            {
                warn!(error = %e, "MPRIS: failed to register root iface");
                return;
            }

            if let Err(e) = object_server
                .at(
                    OBJECT_PATH,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!(error = %e, "MPRIS: failed to register player iface");
                return;
            }

            info!("MPRIS service registered");

            // Keep the service alive.
            loop {
                Timer::after(std::time::Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
