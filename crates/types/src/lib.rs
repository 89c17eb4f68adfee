#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for nodectl
//!
//! This crate holds the Configuration Model, the read-only host snapshots
//! produced by the probe, and the step/run vocabulary shared by the
//! installer, the dispatcher and the CLI.

pub mod host;
pub mod mode;
pub mod model;
pub mod partial;
pub mod reports;
pub mod secret;
pub mod step;
pub mod wallet;

// Re-export commonly used types
pub use host::{HostState, OsInfo, Resources};
pub use mode::Mode;
pub use model::{
    Auth, ChainMode, CompatibilityWarning, NetworkSettings, NodeConfig, Notification, Paths,
    Role, Tuning, LOOPBACK_ALLOW, WILDCARD_ALLOW,
};
pub use partial::PartialNodeConfig;
pub use reports::{NodeSummary, RunReport, SyncStatus, UninstallReport};
pub use secret::Secret;
pub use semver::Version;
pub use step::{
    Criticality, StepFailure, StepId, StepOutcome, StepRecord, StepState, StepSuccess,
};
pub use wallet::{is_valid_wallet_address, PoolWallet, PoolWalletMode, WalletAddress};
