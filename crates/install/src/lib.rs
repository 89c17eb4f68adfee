#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Provisioning and teardown of the managed node
//!
//! Install, update and reconfigure runs are expressed as a [`TaskGraph`]
//! of idempotent [`Step`]s executed in order against an
//! [`InstallContext`]. Teardown is handled separately by the
//! [`Uninstaller`], which keeps going past individual failures.

#[macro_use]
mod macros;
mod context;
mod graph;
pub mod steps;
mod uninstall;

pub use context::{firewall_tag, InstallContext};
pub use graph::{plan_for, remediation_for, Step, TaskGraph};
pub use steps::{wait_for_rpc, write_credentials};
pub use uninstall::{
    matching_rule_numbers, temp_patterns, DataRetention, UninstallOptions, Uninstaller,
};
