#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for host mutation.
//!
//! Every external command nodectl runs (package manager, build tools, service
//! manager, firewall, user management) goes through [`ProcessOperations`].
//! [`Platform`] wraps an implementation with event emission and the per-run
//! command log, so step failures can quote the tail of the failing output.

pub mod core;
pub mod fs;
pub mod implementations;
pub mod log;
pub mod process;
#[cfg(feature = "testing")]
pub mod testing;

pub use crate::core::{Platform, PlatformContext};
pub use implementations::linux::LinuxProcessOperations;
pub use log::CommandLog;

/// Re-export commonly used types
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};
