#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for nodectl
//!
//! This crate provides fine-grained error types organized by domain.
//! All error types implement Clone so step results can be recorded and
//! reported after the fact.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod configure;
pub mod install;
pub mod network;
pub mod ops;
pub mod platform;
pub mod probe;
pub mod rpc;

// Re-export all error types at the root
pub use config::ConfigError;
pub use configure::ConfigureError;
pub use install::InstallError;
pub use network::NetworkError;
pub use ops::OpsError;
pub use platform::PlatformError;
pub use probe::ProbeError;
pub use rpc::RpcError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("configuration aborted: {0}")]
    Configure(#[from] ConfigureError),

    #[error("install error: {0}")]
    Install(#[from] InstallError),

    #[error("ops error: {0}")]
    Ops(#[from] OpsError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    /// Whether the run ended because the operator declined to continue.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Process exit code for this error: cancellation is a clean exit.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.is_cancellation() {
            0
        } else {
            1
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<semver::Error> for Error {
    fn from(err: semver::Error) -> Self {
        Self::Config(ConfigError::ParseError {
            message: format!("version: {err}"),
        })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(ConfigError::ParseError {
            message: err.to_string(),
        })
    }
}

/// Result type alias for nodectl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Network(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Install(InstallError::StepFailed { .. }) => Some(
                "Inspect the log excerpt, fix the cause, then re-run nodectl; completed steps are skipped.",
            ),
            Error::Ops(OpsError::AlreadyRunning { .. }) => {
                Some("Wait for the other nodectl run to finish.")
            }
            Error::Probe(ProbeError::InsufficientPrivileges { .. }) => Some("Re-run as root."),
            Error::Rpc(_) => Some("Check that the daemon is running and the RPC credentials match."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(err) => err.is_retryable(),
            Error::Rpc(RpcError::NotReady { .. } | RpcError::Unreachable { .. }) => true,
            Error::Install(InstallError::StepFailed { .. }) | Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Probe(_) => Some("error.precondition"),
            Error::Configure(_) => Some("error.configure"),
            Error::Install(_) => Some("error.step"),
            Error::Ops(_) => Some("error.ops"),
            Error::Platform(_) => Some("error.platform"),
            Error::Rpc(_) => Some("error.rpc"),
            Error::Internal(_) => Some("error.internal"),
            Error::Cancelled => Some("error.cancelled"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
