use serde::{Deserialize, Serialize};

use crate::EventSource;
use nodectl_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Failure context carrying only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            hint: None,
            retryable: false,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod platform;
pub mod probe;
pub mod step;
pub mod uninstall;

pub use general::*;
pub use platform::*;
pub use probe::*;
pub use step::*;
pub use uninstall::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Environment probe findings
    Probe(ProbeEvent),

    /// Task graph step lifecycle
    Step(StepEvent),

    /// External command execution
    Platform(PlatformEvent),

    /// Teardown actions
    Uninstall(UninstallEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Probe(_) => EventSource::PROBE,
            Self::Step(_) => EventSource::STEP,
            Self::Platform(_) => EventSource::PLATFORM,
            Self::Uninstall(_) => EventSource::UNINSTALL,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. } | GeneralEvent::OperationFailed { .. })
            | Self::Step(StepEvent::Failed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Step(StepEvent::AdvisoryFailed { .. })
            | Self::Probe(ProbeEvent::CheckDegraded { .. } | ProbeEvent::VersionFallback { .. })
            | Self::Uninstall(UninstallEvent::ActionFailed { .. } | UninstallEvent::Residual { .. })
            | Self::Platform(PlatformEvent::ProcessFailed { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Step(StepEvent::Progress { .. })
            | Self::Platform(PlatformEvent::ProcessStarted { .. }) => Level::DEBUG,

            Self::Platform(PlatformEvent::ProcessCompleted { .. }) => Level::TRACE,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "nodectl::events::general",
            Self::Probe(_) => "nodectl::events::probe",
            Self::Step(_) => "nodectl::events::step",
            Self::Platform(_) => "nodectl::events::platform",
            Self::Uninstall(_) => "nodectl::events::uninstall",
        }
    }

    /// One-line description used as the log message
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::General(event) => match event {
                GeneralEvent::Warning { message, context } => match context {
                    Some(context) => format!("{message} ({context})"),
                    None => message.clone(),
                },
                GeneralEvent::Error { message, details } => match details {
                    Some(details) => format!("{message}: {details}"),
                    None => message.clone(),
                },
                GeneralEvent::DebugLog { message } => message.clone(),
                GeneralEvent::OperationStarted { operation } => format!("{operation} started"),
                GeneralEvent::OperationCompleted { operation, success } => {
                    format!("{operation} completed (success: {success})")
                }
                GeneralEvent::OperationFailed { operation, error } => {
                    format!("{operation} failed: {error}")
                }
            },
            Self::Probe(event) => match event {
                ProbeEvent::CheckDegraded { check, reason } => {
                    format!("{check} check degraded: {reason}")
                }
                ProbeEvent::VersionFallback {
                    requested,
                    fallback,
                    reason,
                } => format!("version {requested} unavailable ({reason}), using {fallback}"),
                ProbeEvent::VersionResolved { version } => format!("daemon version {version}"),
            },
            Self::Step(event) => match event {
                StepEvent::GraphStarted { mode, steps } => {
                    format!("{mode}: {} steps planned", steps.len())
                }
                StepEvent::Started { step } => format!("{step} started"),
                StepEvent::Progress { step, message } => format!("{step}: {message}"),
                StepEvent::Succeeded {
                    step, duration_ms, ..
                } => format!("{step} succeeded in {duration_ms}ms"),
                StepEvent::Failed { step, failure, .. } => {
                    format!("{step} failed: {}", failure.message)
                }
                StepEvent::AdvisoryFailed { step, failure, .. } => {
                    format!("{step} skipped: {}", failure.message)
                }
                StepEvent::GraphFinished {
                    halted_at,
                    warnings,
                } => match halted_at {
                    Some(step) => format!("run halted at {step}"),
                    None => format!("run finished with {warnings} warnings"),
                },
            },
            Self::Platform(event) => match event {
                PlatformEvent::ProcessStarted { command } => format!("spawned {}", command.program),
                PlatformEvent::ProcessCompleted {
                    command,
                    exit_code,
                    duration_ms,
                } => format!(
                    "{} exited with {exit_code:?} after {duration_ms}ms",
                    command.program
                ),
                PlatformEvent::ProcessFailed {
                    command, failure, ..
                } => format!("{} failed: {}", command.program, failure.message),
            },
            Self::Uninstall(event) => match event {
                UninstallEvent::ActionStarted { action } => format!("{action} started"),
                UninstallEvent::ActionCompleted { action, removed } => {
                    format!("{action} done (removed: {removed})")
                }
                UninstallEvent::ActionFailed { action, error } => {
                    format!("{action} failed: {error}")
                }
                UninstallEvent::Residual { artifact } => format!("still present: {artifact}"),
                UninstallEvent::Finished { residual } => {
                    format!("teardown finished, {residual} residual artifacts")
                }
            },
        }
    }
}
