use std::env;
use std::path::Path;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::library::{Library, scan};
use crate::mpris::ControlCmd;

mod event_loop;
mod logging;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();
    logging::init(&settings.log);
    if let Some(problem) = config_problem {
        warn!(%problem, "using default settings");
    }

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });
    info!(dir = %dir, budget_secs = settings.vinyl.side_budget_secs, "starting");

    let tracks = scan(Path::new(&dir), &settings.library);
    let library = Library::from_tracks(tracks, settings.vinyl.side_budget_secs);
    let audio_player = AudioPlayer::new(settings.audio.clone());
    let mut app = App::new(library);

    app.set_current_dir(dir.clone());
    app.set_playback_handle(audio_player.playback_handle());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());

    startup::apply_playback_defaults(&mut app, &audio_player, &settings);
    mpris_sync::update_mpris(&mpris, &app);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::new(&app);
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &audio_player,
        &mpris,
        &control_tx,
        &control_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("shutting down");
    run_result
}
