use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{self, LogSettings};

/// Where log output goes: `log.file`, else the XDG state default.
fn log_path(settings: &LogSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(config::default_log_path)
}

/// `PLATTER_LOG` wins over `log.level`; an unparsable directive means `info`.
fn env_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_env("PLATTER_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global `tracing` subscriber writing to the log file.
///
/// The terminal belongs to the TUI, so nothing is ever logged to stdout or
/// stderr. If the file can't be opened logging is simply left off.
pub fn init(settings: &LogSettings) {
    let Some(path) = log_path(settings) else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("platter: cannot open log file {}: {e}", path.display());
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
