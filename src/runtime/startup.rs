use crate::app::App;
use crate::audio::{AudioCmd, AudioPlayer, LoopMode};
use crate::config;

fn loop_mode_from(setting: config::LoopModeSetting) -> LoopMode {
    match setting {
        config::LoopModeSetting::NoLoop => LoopMode::NoLoop,
        config::LoopModeSetting::LoopSide => LoopMode::LoopSide,
        config::LoopModeSetting::LoopOne => LoopMode::LoopOne,
    }
}

/// Copy playback defaults from `settings` into `app` and the audio thread.
pub fn apply_playback_defaults(app: &mut App, audio_player: &AudioPlayer, settings: &config::Settings) {
    app.follow_playback = settings.ui.follow_playback;
    app.auto_flip = settings.playback.auto_flip;
    app.loop_mode = loop_mode_from(settings.playback.loop_mode);

    let _ = audio_player.send(AudioCmd::SetLoopMode(app.loop_mode));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_mode_settings_map_one_to_one() {
        assert_eq!(loop_mode_from(config::LoopModeSetting::NoLoop), LoopMode::NoLoop);
        assert_eq!(loop_mode_from(config::LoopModeSetting::LoopSide), LoopMode::LoopSide);
        assert_eq!(loop_mode_from(config::LoopModeSetting::LoopOne), LoopMode::LoopOne);
    }
}
