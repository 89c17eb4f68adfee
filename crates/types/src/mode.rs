//! Run modes selected by the dispatcher

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exactly one mode is active per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    FreshInstall,
    Update,
    Reconfigure,
    WalletManagement,
    Uninstall,
    Exit,
}

impl Mode {
    /// Whether the mode changes host state and needs the run lock.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Self::FreshInstall | Self::Update | Self::Reconfigure | Self::Uninstall
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FreshInstall => "fresh install",
            Self::Update => "update",
            Self::Reconfigure => "reconfigure",
            Self::WalletManagement => "wallet management",
            Self::Uninstall => "uninstall",
            Self::Exit => "exit",
        };
        f.write_str(name)
    }
}
