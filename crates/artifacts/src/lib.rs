#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! On-disk artifacts nodectl generates
//!
//! Pure renderers and parsers for the daemon's key=value config file, the
//! pool wallet credential file and the systemd unit. Writing them, and
//! setting ownership and permissions, is the installer's job.

pub mod credentials;
pub mod daemon_conf;
pub mod unit;

pub use credentials::PoolCredentials;
pub use daemon_conf::{parse_daemon_config, render_daemon_config, ROLE_MARKER};
pub use unit::{render_service_unit, UnitSpec};
