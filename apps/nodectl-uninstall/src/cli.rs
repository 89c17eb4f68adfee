//! Command line interface definition

use clap::Parser;
use nodectl_install::DataRetention;

/// nodectl-uninstall - remove a nodectl-managed node
#[derive(Parser, Debug)]
#[command(name = "nodectl-uninstall")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Remove a nodectl-managed Litecoin full node")]
#[command(long_about = None)]
pub struct Cli {
    /// Leave the blockchain data directory untouched
    #[arg(long, conflicts_with = "keep_wallets")]
    pub keep_blockchain: bool,

    /// Delete chain data but keep the wallet directory
    #[arg(long)]
    pub keep_wallets: bool,

    /// Do not ask for confirmation
    #[arg(long)]
    pub force: bool,

    /// Only print errors
    #[arg(long)]
    pub quiet: bool,
}

impl Cli {
    pub fn retention(&self) -> DataRetention {
        if self.keep_blockchain {
            DataRetention::KeepAll
        } else if self.keep_wallets {
            DataRetention::KeepWallets
        } else {
            DataRetention::Remove
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retention_follows_flags() {
        let cli = Cli::parse_from(["nodectl-uninstall", "--keep-wallets", "--force"]);
        assert_eq!(cli.retention(), DataRetention::KeepWallets);
        assert!(cli.force);

        let cli = Cli::parse_from(["nodectl-uninstall"]);
        assert_eq!(cli.retention(), DataRetention::Remove);
    }

    #[test]
    fn keep_flags_conflict() {
        let parsed =
            Cli::try_parse_from(["nodectl-uninstall", "--keep-blockchain", "--keep-wallets"]);
        assert!(parsed.is_err());
    }
}
