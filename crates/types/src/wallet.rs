//! Pool wallet address handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal prefixes accepted for an externally supplied pool address.
///
/// This is a shallow format check; checksums are left to the daemon.
pub const ADDRESS_PREFIXES: [&str; 3] = ["ltc1", "L", "M"];

/// Whether `address` starts with one of [`ADDRESS_PREFIXES`].
#[must_use]
pub fn is_valid_wallet_address(address: &str) -> bool {
    let address = address.trim();
    !address.is_empty() && ADDRESS_PREFIXES.iter().any(|p| address.starts_with(p))
}

/// A pool payout address that passed [`is_valid_wallet_address`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse an address, returning `None` when the prefix check fails.
    #[must_use]
    pub fn parse(address: &str) -> Option<Self> {
        is_valid_wallet_address(address).then(|| Self(address.trim().to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the pool payout wallet is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolWalletMode {
    /// Create a wallet in the daemon during installation
    Create,
    /// Use an address the operator already controls
    ExistingAddress,
    /// Leave wallet setup for later
    Deferred,
}

/// Pool wallet settings; only present for the pool-backend role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolWallet {
    pub mode: PoolWalletMode,
    pub address: Option<WalletAddress>,
}

impl PoolWallet {
    #[must_use]
    pub fn create() -> Self {
        Self {
            mode: PoolWalletMode::Create,
            address: None,
        }
    }

    #[must_use]
    pub fn existing(address: WalletAddress) -> Self {
        Self {
            mode: PoolWalletMode::ExistingAddress,
            address: Some(address),
        }
    }

    #[must_use]
    pub fn deferred() -> Self {
        Self {
            mode: PoolWalletMode::Deferred,
            address: None,
        }
    }
}
