use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use crate::app::{App, PlaybackState, SideRef};
use crate::audio::{AudioCmd, AudioPlayer};
use crate::config;
use crate::mpris::ControlCmd;
use crate::mpris::MprisHandle;
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Last-known (side, position) as emitted to MPRIS.
    pub last_mpris_track: Option<(SideRef, usize)>,
    /// Last-known playback state as emitted to MPRIS.
    pub last_mpris_playback: PlaybackState,
    pending_zz: bool,
}

impl EventLoopState {
    /// Construct a new `EventLoopState` seeded from `app`.
    pub fn new(app: &App) -> Self {
        Self {
            pending_gg: false,
            pending_zz: false,
            last_mpris_track: None,
            last_mpris_playback: app.playback,
        }
    }
}

/// Put side `r` on the platter, starting at track `start`.
fn play_side(app: &mut App, audio_player: &AudioPlayer, r: SideRef, start: usize) -> bool {
    match app.begin_side(r) {
        Some(tracks) => {
            info!(album = r.album, side = %r.letter(), tracks = tracks.len(), "needle down");
            let _ = audio_player.send(AudioCmd::LoadSide {
                tracks,
                start,
                generation: app.side_generation,
            });
            true
        }
        None => {
            debug!(album = r.album, side = %r.letter(), "nothing to play on side");
            false
        }
    }
}

fn play_selected_side(app: &mut App, audio_player: &AudioPlayer) -> bool {
    match app.selected_side_ref() {
        Some(r) => play_side(app, audio_player, r, 0),
        None => false,
    }
}

/// The audio thread ran off the end of a side: flip or lift the needle.
fn on_side_finished(app: &mut App, audio_player: &AudioPlayer) {
    let next = app
        .now_playing
        .filter(|_| app.auto_flip)
        .and_then(|r| app.next_side_after(r));
    match next {
        Some(r) => {
            info!(side = %r.letter(), "flipping record");
            play_side(app, audio_player, r, 0);
        }
        None => {
            info!("end of record");
            app.end_side();
        }
    }
}

/// Pull progress from the audio thread into `app`.
fn sync_playback(app: &mut App, audio_player: &AudioPlayer) {
    let Some(handle) = app.playback_handle.clone() else {
        return;
    };
    let Ok(mut info) = handle.lock() else {
        return;
    };
    let finished = info.take_finished(app.side_generation);
    let current = info.generation == app.side_generation;
    let position = info.position;
    let playing = info.playing;
    drop(info);

    if finished {
        on_side_finished(app, audio_player);
    } else if current && position.is_some() && app.now_playing.is_some() {
        app.playback = if playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        };
    }
}

/// Main terminal event loop: handles input, UI drawing, sync with the audio
/// thread and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        sync_playback(app, audio_player);

        // Keep MPRIS in sync even when playback changes come from media keys or auto-advance.
        let track = app.now_playing_track().map(|(r, pos, _)| (r, pos));
        if track != state.last_mpris_track || app.playback != state.last_mpris_playback {
            update_mpris(mpris, app);
            state.last_mpris_track = track;
            state.last_mpris_playback = app.playback;
        }

        let display = app.display_indices();
        terminal.draw(|f| ui::draw(f, app, &display, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app, audio_player, mpris)? {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, audio_player, mpris, control_tx, state)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_control_cmd(
    cmd: ControlCmd,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
) -> Result<bool, Box<dyn std::error::Error>> {
    if !app.filter_mode && cmd != ControlCmd::Quit {
        app.follow_playback_on();
    }

    match cmd {
        ControlCmd::Quit => {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return Ok(true);
        }
        ControlCmd::Play => match app.playback {
            PlaybackState::Paused => {
                let _ = audio_player.send(AudioCmd::TogglePause);
                app.playback = PlaybackState::Playing;
            }
            PlaybackState::Stopped => {
                play_selected_side(app, audio_player);
            }
            PlaybackState::Playing => {}
        },
        ControlCmd::Pause => {
            if app.playback == PlaybackState::Playing {
                let _ = audio_player.send(AudioCmd::TogglePause);
                app.playback = PlaybackState::Paused;
            }
        }
        ControlCmd::PlayPause => match app.playback {
            PlaybackState::Stopped => {
                play_selected_side(app, audio_player);
            }
            PlaybackState::Playing => {
                let _ = audio_player.send(AudioCmd::TogglePause);
                app.playback = PlaybackState::Paused;
            }
            PlaybackState::Paused => {
                let _ = audio_player.send(AudioCmd::TogglePause);
                app.playback = PlaybackState::Playing;
            }
        },
        ControlCmd::Stop => {
            let _ = audio_player.send(AudioCmd::Stop);
            app.end_side();
        }
        ControlCmd::Next => {
            if app.now_playing.is_some() {
                let _ = audio_player.send(AudioCmd::Next);
            }
        }
        ControlCmd::Prev => {
            if app.now_playing.is_some() {
                let _ = audio_player.send(AudioCmd::Prev);
            }
        }
    }
    update_mpris(mpris, app);

    Ok(false)
}

fn handle_filter_key(key: KeyEvent, app: &mut App, audio_player: &AudioPlayer, mpris: &MprisHandle) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Char('j') | KeyCode::Char('n') if ctrl => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Char('p') if ctrl => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Char(c) => {
            if !c.is_control() {
                app.push_filter_char(c);
            }
        }
        KeyCode::Enter => {
            if app.display_indices().is_empty() {
                return;
            }
            app.exit_filter_mode();
            app.follow_playback_on();
            play_selected_side(app, audio_player);
        }
        _ => return,
    }
    update_mpris(mpris, app);
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<bool, Box<dyn std::error::Error>> {
    // Two-key prefixes only survive until the next key press.
    let gg = std::mem::take(&mut state.pending_gg);
    let zz = std::mem::take(&mut state.pending_zz);

    if app.filter_mode {
        handle_filter_key(key, app, audio_player, mpris);
        return Ok(false);
    }

    if std::mem::take(&mut app.side_jump_pending) {
        if let KeyCode::Char(c) = key.code {
            if app.select_side_letter(c) {
                app.follow_playback_on();
                play_selected_side(app, audio_player);
                update_mpris(mpris, app);
            }
        }
        return Ok(false);
    }

    let scrub = settings.controls.scrub_seconds.min(i32::MAX as u64) as i32;

    match key.code {
        KeyCode::Char('q') => {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return Ok(true);
        }
        KeyCode::Char('/') => app.enter_filter_mode(),
        KeyCode::Char('r') => {
            app.cycle_loop_mode();
            let _ = audio_player.send(AudioCmd::SetLoopMode(app.loop_mode));
        }
        KeyCode::Char('f') => app.toggle_auto_flip(),
        KeyCode::Char('R') => {
            if let Some(r) = app.random_side(&mut rand::rng()) {
                app.follow_playback_on();
                play_side(app, audio_player, r, 0);
            }
        }
        KeyCode::Char('x') => {
            if app.remove_selected_album() {
                let _ = audio_player.send(AudioCmd::Stop);
            }
        }
        KeyCode::Char('z') => {
            if !zz {
                state.pending_zz = true;
            } else if let Some(r) = app.now_playing {
                app.follow_playback_on();
                app.set_selected(r.album);
                app.selected_side = r.side;
            }
        }
        KeyCode::Char('g') => {
            if gg {
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.select_last();
        }
        KeyCode::Char('j') => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Char(c @ '1'..='9') => {
            app.follow_playback_off();
            if let Some(n) = c.to_digit(10) {
                app.select_by_number(n as usize);
            }
        }
        KeyCode::Char('l') => {
            app.follow_playback_off();
            app.next_side();
        }
        KeyCode::Char('h') => {
            app.follow_playback_off();
            app.prev_side();
        }
        KeyCode::Char('\'') => app.side_jump_pending = true,
        KeyCode::Enter => {
            let already_playing = app.playback == PlaybackState::Playing
                && app.now_playing.is_some()
                && app.now_playing == app.selected_side_ref();
            if !already_playing {
                app.follow_playback_on();
                play_selected_side(app, audio_player);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('n') => {
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('b') => {
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => {
            let _ = audio_player.send(AudioCmd::SeekBy(scrub));
        }
        KeyCode::Char('H') => {
            let _ = audio_player.send(AudioCmd::SeekBy(-scrub));
        }
        KeyCode::Char('K') => app.toggle_metadata_window(),
        _ => return Ok(false),
    }
    update_mpris(mpris, app);

    Ok(false)
}
