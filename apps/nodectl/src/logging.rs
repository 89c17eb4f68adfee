//! Tracing setup and structured logging of events

use nodectl_config::constants;
use nodectl_events::EventMessage;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;

/// Console filter; rendered events are not logged twice
const CONSOLE_FILTER: &str = "warn,nodectl=info,nodectl::events=off";
const DEBUG_FILTER: &str = "info,nodectl=debug";

/// Whether `NODECTL_DEBUG` asks for the JSON file log
pub fn debug_requested() -> bool {
    std::env::var(constants::ENV_DEBUG)
        .is_ok_and(|value| value == "1" || value.eq_ignore_ascii_case("true"))
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber.
///
/// In debug mode every record goes to `<log_dir>/nodectl-<timestamp>.log` as
/// JSON and the path is returned; otherwise records go to stderr.
pub fn init_tracing(log_dir: &Path) -> Option<PathBuf> {
    if debug_requested() {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!("Warning: failed to create log directory: {e}");
        }
        let log_file = log_dir.join(format!(
            "nodectl-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));
        match std::fs::File::create(&log_file) {
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

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter(CONSOLE_FILTER))
        .init();
    None
}

/// Log an event at the level its domain assigns it
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();
    let summary = message.event.summary();
    match meta.tracing_level() {
        Level::ERROR => {
            error!(target: "nodectl::events", source, event_id = %meta.event_id, correlation = ?meta.correlation_id, "{summary}");
        }
        Level::WARN => {
            warn!(target: "nodectl::events", source, event_id = %meta.event_id, correlation = ?meta.correlation_id, "{summary}");
        }
        Level::INFO => {
            info!(target: "nodectl::events", source, event_id = %meta.event_id, correlation = ?meta.correlation_id, "{summary}");
        }
        Level::DEBUG => {
            debug!(target: "nodectl::events", source, event_id = %meta.event_id, correlation = ?meta.correlation_id, "{summary}");
        }
        Level::TRACE => {
            trace!(target: "nodectl::events", source, event_id = %meta.event_id, correlation = ?meta.correlation_id, "{summary}");
        }
    }
}
