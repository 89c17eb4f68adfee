//! Environment probe error types
//!
//! Probes never abort a run on their own; these errors only surface where a
//! caller asks for a value that cannot be derived at all.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("cannot read {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("no filesystem found for {path}")]
    NoFilesystem { path: String },

    #[error("unsupported operating system: {label}")]
    UnsupportedOs { label: String },

    #[error("insufficient privileges: {message}")]
    InsufficientPrivileges { message: String },
}
