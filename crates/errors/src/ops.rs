//! Operation orchestration error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OpsError {
    #[error("operation failed: {message}")]
    OperationFailed { message: String },

    #[error("component not found: {component}")]
    MissingComponent { component: String },

    #[error("mode {mode} is not available: {reason}")]
    ModeUnavailable { mode: String, reason: String },

    #[error("another nodectl run holds the lock (pid {holder_pid})")]
    AlreadyRunning { holder_pid: String },

    #[error("no existing installation found")]
    NoExistingInstall,

    #[error("serialization error: {message}")]
    SerializationError { message: String },

    #[error("invalid wallet address: {address}")]
    InvalidWalletAddress { address: String },

    #[error("context creation failed: {message}")]
    ContextCreationFailed { message: String },
}
