use crate::config;

/// Load and validate settings, falling back to defaults.
///
/// Logging isn't up yet at this point, so any problem is returned for the
/// caller to log once it is.
pub fn load_settings() -> (config::Settings, Option<String>) {
    let loaded = config::Settings::load()
        .map_err(|e| format!("failed to load config: {e}"))
        .and_then(|s| s.validate().map(|()| s).map_err(|msg| format!("invalid config: {msg}")));

    match loaded {
        Ok(s) => (s, None),
        Err(problem) => {
            eprintln!("platter: {problem}; using defaults");
            (config::Settings::default(), Some(problem))
        }
    }
}
