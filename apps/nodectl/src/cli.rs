//! Command line interface definition

use clap::Parser;

/// nodectl - provision and maintain a Litecoin full node
///
/// Fully interactive: the host is probed first and only the modes that make
/// sense for it are offered.
#[derive(Parser)]
#[command(name = "nodectl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive installer for a Litecoin full node")]
#[command(long_about = None)]
pub struct Cli {}
