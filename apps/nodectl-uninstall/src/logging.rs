//! Tracing setup for the uninstaller

use nodectl_config::constants;
use nodectl_events::EventMessage;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::EnvFilter;

const CONSOLE_FILTER: &str = "warn,nodectl=info,nodectl::events=off";
const QUIET_FILTER: &str = "error";
const DEBUG_FILTER: &str = "info,nodectl=debug";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber; returns the JSON log path in debug mode
pub fn init_tracing(log_dir: &Path, quiet: bool) -> Option<PathBuf> {
    let debug = std::env::var(constants::ENV_DEBUG)
        .is_ok_and(|value| value == "1" || value.eq_ignore_ascii_case("true"));
    if debug {
        let log_file = log_dir.join(format!(
            "nodectl-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));
        let file = std::fs::create_dir_all(log_dir).and_then(|()| std::fs::File::create(&log_file));
        match file {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(env_filter(DEBUG_FILTER))
                    .init();
                return Some(log_file);
            }
            Err(e) => eprintln!("Warning: failed to create log file: {e}"),
        }
    }

    let default = if quiet { QUIET_FILTER } else { CONSOLE_FILTER };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter(default))
        .init();
    None
}

/// Log an event at the level its domain assigns it
pub fn log_event_with_tracing(message: &EventMessage) {
    let source = message.meta.source.as_str();
    let summary = message.event.summary();
    match message.meta.tracing_level() {
        Level::ERROR => error!(target: "nodectl::events", source, "{summary}"),
        Level::WARN => warn!(target: "nodectl::events", source, "{summary}"),
        Level::INFO => info!(target: "nodectl::events", source, "{summary}"),
        Level::DEBUG | Level::TRACE => debug!(target: "nodectl::events", source, "{summary}"),
    }
}
