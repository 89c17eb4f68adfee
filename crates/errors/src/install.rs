//! Provisioning step and teardown error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum InstallError {
    #[error("step {step} failed: {reason}")]
    StepFailed {
        step: String,
        reason: String,
        log_excerpt: Vec<String>,
        log_path: Option<String>,
    },

    #[error("invalid step transition for {step}: {from} -> {to}")]
    InvalidTransition {
        step: String,
        from: String,
        to: String,
    },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("expected artifact missing after {step}: {path}")]
    ArtifactMissing { step: String, path: String },

    #[error("uninstall left {count} artifacts behind")]
    ResidualArtifacts { count: usize },
}
