use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use crate::config::AudioSettings;
use crate::library::Track;

use super::queue::{Direction, step_position};
use super::sink::create_sink_at;
use super::types::{AudioCmd, LoopMode, PlaybackHandle};

/// Everything the audio thread knows about the side on the platter.
struct Turntable<'a> {
    stream: &'a OutputStream,
    settings: AudioSettings,
    playback_info: PlaybackHandle,

    side: Vec<Track>,
    position: Option<usize>,
    sink: Option<Sink>,
    paused: bool,

    // Elapsed time is `accumulated` plus time since `started_at` while playing.
    started_at: Option<Instant>,
    accumulated: Duration,

    loop_mode: LoopMode,
}

impl<'a> Turntable<'a> {
    fn new(stream: &'a OutputStream, settings: AudioSettings, playback_info: PlaybackHandle) -> Self {
        Self {
            stream,
            settings,
            playback_info,
            side: Vec::new(),
            position: None,
            sink: None,
            paused: true,
            started_at: None,
            accumulated: Duration::ZERO,
            loop_mode: LoopMode::default(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn load_side(&mut self, tracks: Vec<Track>, start: usize, generation: u64) {
        debug!(tracks = tracks.len(), start, generation, "side loaded");
        self.side = tracks;
        self.position = None;
        if let Ok(mut info) = self.playback_info.lock() {
            info.generation = generation;
            info.side_finished = false;
        }
        if start < self.side.len() {
            self.play_from(start);
        } else {
            self.stop(false);
        }
    }

    /// Play the track at `pos`, skipping forward past tracks that won't open.
    fn play_from(&mut self, pos: usize) {
        let mut candidate = Some(pos);
        for _ in 0..self.side.len() {
            let Some(i) = candidate else {
                break;
            };
            match create_sink_at(self.stream, &self.side[i], Duration::ZERO) {
                Ok(new_sink) => {
                    self.swap_in(i, new_sink);
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "skipping unplayable track");
                    candidate = step_position(i, self.side.len(), LoopMode::NoLoop, true, Direction::Forward);
                }
            }
        }
        self.stop(candidate.is_none());
    }

    fn swap_in(&mut self, i: usize, new_sink: Sink) {
        let crossfade_ms = self.settings.crossfade_ms;
        let crossfade_steps = self.settings.crossfade_steps.max(1);
        // Keep the default volume sane even if crossfade is disabled.
        new_sink.set_volume(1.0);

        if let Some(old_sink) = self.sink.as_ref() {
            if !self.paused && crossfade_ms > 0 {
                old_sink.set_volume(1.0);
                new_sink.set_volume(0.0);
                new_sink.play();

                // Short blocking fade; rodio keeps mixing on its own thread.
                for step in 1..=crossfade_steps {
                    let t = (step as f32) / (crossfade_steps as f32);
                    old_sink.set_volume(1.0 - t);
                    new_sink.set_volume(t);
                    thread::sleep(Duration::from_millis((crossfade_ms / crossfade_steps).max(1)));
                }
            }
            old_sink.stop();
        }

        new_sink.play();
        self.sink = Some(new_sink);
        self.position = Some(i);
        self.paused = false;
        self.started_at = Some(Instant::now());
        self.accumulated = Duration::ZERO;

        if let Ok(mut info) = self.playback_info.lock() {
            info.position = Some(i);
            info.elapsed = Duration::ZERO;
            info.playing = true;
            info.side_finished = false;
        }
    }

    /// Lift the needle. `finished` marks a natural end of side.
    fn stop(&mut self, finished: bool) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.position = None;
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        if let Ok(mut info) = self.playback_info.lock() {
            info.position = None;
            info.elapsed = Duration::ZERO;
            info.playing = false;
            info.side_finished = finished;
        }
    }

    fn toggle_pause(&mut self) {
        let Some(s) = self.sink.as_ref() else {
            return;
        };
        if self.paused {
            s.play();
            self.started_at = Some(Instant::now());
        } else {
            s.pause();
            if let Some(st) = self.started_at.take() {
                self.accumulated += st.elapsed();
            }
        }
        self.paused = !self.paused;
        if let Ok(mut info) = self.playback_info.lock() {
            info.playing = !self.paused;
        }
    }

    /// Rebuild the current sink and skip into the file.
    fn seek_by(&mut self, secs: i32) {
        let Some(i) = self.position else {
            return;
        };
        if self.sink.is_none() {
            return;
        }

        let cur = self.elapsed().as_secs() as i64;
        let new_elapsed = Duration::from_secs((cur + secs as i64).max(0) as u64);

        let new_sink = match create_sink_at(self.stream, &self.side[i], new_elapsed) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "seek failed");
                return;
            }
        };
        if let Some(s) = self.sink.as_ref() {
            s.stop();
        }

        if self.paused {
            self.started_at = None;
        } else {
            new_sink.play();
            self.started_at = Some(Instant::now());
        }

        self.sink = Some(new_sink);
        self.accumulated = new_elapsed;
        if let Ok(mut info) = self.playback_info.lock() {
            info.elapsed = new_elapsed;
        }
    }

    fn skip(&mut self, direction: Direction) {
        if self.side.is_empty() {
            return;
        }
        let from = self.position.unwrap_or(0);
        if let Some(next) = step_position(from, self.side.len(), self.loop_mode, true, direction) {
            self.play_from(next);
        }
        // Manual skips off either end of the side are ignored.
    }

    /// Called periodically: advance when the current track has run out.
    fn tick(&mut self) {
        let Some(s) = self.sink.as_ref() else {
            return;
        };
        if self.paused {
            return;
        }
        if !s.empty() {
            if let Ok(mut info) = self.playback_info.lock() {
                info.elapsed = self.elapsed();
            }
            return;
        }

        let from = self.position.unwrap_or(0);
        match step_position(from, self.side.len(), self.loop_mode, false, Direction::Forward) {
            Some(next) => self.play_from(next),
            None => {
                debug!("end of side");
                self.stop(true);
            }
        }
    }

    fn fade_out(&mut self, fade_out_ms: u64) {
        if let Some(sink) = self.sink.as_ref() {
            if fade_out_ms > 0 {
                let steps: u64 = 20;
                let step_ms = (fade_out_ms / steps).max(1);
                sink.set_volume(1.0);
                for step in 1..=steps {
                    let t = step as f32 / steps as f32;
                    sink.set_volume(1.0 - t);
                    thread::sleep(Duration::from_millis(step_ms));
                }
            }
            sink.set_volume(0.0);
            sink.stop();
        }
        // Update shared state so UI/MPRIS don't keep showing Playing.
        if let Ok(mut info) = self.playback_info.lock() {
            info.playing = false;
        }
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    playback_info: PlaybackHandle,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "no audio output device; playback disabled");
                // Keep draining so senders never block, until asked to quit.
                for cmd in rx {
                    if matches!(cmd, AudioCmd::Quit { .. }) {
                        break;
                    }
                }
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);

        let mut deck = Turntable::new(&stream, audio_settings, playback_info);

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(cmd) => match cmd {
                    AudioCmd::LoadSide {
                        tracks,
                        start,
                        generation,
                    } => deck.load_side(tracks, start, generation),
                    AudioCmd::Stop => deck.stop(false),
                    AudioCmd::TogglePause => deck.toggle_pause(),
                    AudioCmd::SetLoopMode(m) => deck.loop_mode = m,
                    AudioCmd::Next => deck.skip(Direction::Forward),
                    AudioCmd::Prev => deck.skip(Direction::Back),
                    AudioCmd::SeekBy(secs) => deck.seek_by(secs),
                    AudioCmd::Quit { fade_out_ms } => {
                        deck.fade_out(fade_out_ms);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => deck.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
