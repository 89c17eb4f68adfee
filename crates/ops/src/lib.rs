#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for nodectl
//!
//! This crate sits between the binaries and the specialised crates: it
//! surveys the host, offers the modes that make sense for it, takes the
//! run lock and hands off to the configurator, the task graph or the
//! wallet submenu.

mod context;
mod dispatch;
mod lock;
mod types;
mod wallet;

pub use context::{OpsContextBuilder, OpsCtx};
pub use dispatch::{available_modes, current_config, node_summary, run_mode, survey};
pub use lock::RunLock;
pub use types::{uninstall_exit_code, ModeOutcome, Survey};
pub use wallet::WalletManager;
