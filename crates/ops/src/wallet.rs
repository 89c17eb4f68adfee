//! Wallet management submenu
//!
//! Works only through the daemon's RPC interface and the pool credential
//! file. Nothing here touches the service, the build or the daemon config.

use nodectl_configurator::{NoticeLevel, Prompter};
use nodectl_errors::{Error, OpsError, RpcError};
use nodectl_install::{wait_for_rpc, write_credentials, InstallContext};
use nodectl_net::rpc::{RPC_WALLET_ALREADY_LOADED, RPC_WALLET_ERROR, RPC_WALLET_NOT_FOUND};
use nodectl_net::NodeRpc;
use nodectl_types::WalletAddress;
use std::sync::Arc;
use std::time::Duration;

const MENU: [&str; 5] = [
    "Create the pool wallet",
    "Set an external payout address",
    "Show wallet balance",
    "Get a new receiving address",
    "Back",
];

fn not_loaded(err: &RpcError) -> bool {
    matches!(err, RpcError::Remote { code, .. } if *code == RPC_WALLET_NOT_FOUND)
}

/// RPC-backed wallet operations for an installed node
pub struct WalletManager {
    cx: InstallContext,
    rpc: Arc<dyn NodeRpc>,
}

impl WalletManager {
    #[must_use]
    pub fn new(cx: InstallContext) -> Self {
        let rpc = cx.rpc.connect(&cx.rpc_endpoint());
        Self { cx, rpc }
    }

    #[must_use]
    pub fn wallet_name(&self) -> &str {
        &self.cx.tool.wallet.name
    }

    async fn ready(&self) -> Result<(), Error> {
        let wallet = &self.cx.tool.wallet;
        wait_for_rpc(
            self.rpc.as_ref(),
            wallet.ready_attempts,
            Duration::from_secs(wallet.ready_backoff_secs),
        )
        .await?;
        Ok(())
    }

    async fn load(&self) -> Result<(), Error> {
        let name = self.wallet_name();
        tracing::info!(wallet = name, "wallet not loaded, loading it");
        self.rpc.load_wallet(name).await?;
        Ok(())
    }

    async fn persist(&self, address: &str) -> Result<(), Error> {
        write_credentials(&self.cx, Some(address.to_string()))
            .await
            .map_err(|failure| {
                OpsError::OperationFailed {
                    message: failure.reason,
                }
                .into()
            })
    }

    /// Create the pool wallet (or reuse it) and record a fresh address
    ///
    /// # Errors
    ///
    /// Returns an RPC error when the daemon is unreachable or rejects the
    /// call, or an ops error when the credential file cannot be written.
    pub async fn create_wallet(&self) -> Result<String, Error> {
        self.ready().await?;
        let name = self.wallet_name();
        match self.rpc.create_wallet(name).await {
            Ok(()) => tracing::info!(wallet = name, "wallet created"),
            Err(RpcError::Remote { code, .. })
                if code == RPC_WALLET_ERROR || code == RPC_WALLET_ALREADY_LOADED =>
            {
                tracing::info!(wallet = name, "wallet already exists");
            }
            Err(e) => return Err(e.into()),
        }
        let address = self.rpc.get_new_address(name).await?;
        self.persist(&address).await?;
        Ok(address)
    }

    /// Record an externally managed payout address
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::InvalidWalletAddress`] when the address does not
    /// look like a Litecoin address.
    pub async fn set_external_address(&self, address: &str) -> Result<WalletAddress, Error> {
        let address = WalletAddress::parse(address.trim()).ok_or_else(|| {
            OpsError::InvalidWalletAddress {
                address: address.trim().to_string(),
            }
        })?;
        self.persist(address.as_str()).await?;
        tracing::info!(address = address.as_str(), "external payout address recorded");
        Ok(address)
    }

    /// # Errors
    ///
    /// Returns an RPC error when the wallet is missing or the daemon is
    /// unreachable.
    pub async fn balance(&self) -> Result<f64, Error> {
        self.ready().await?;
        let name = self.wallet_name();
        match self.rpc.get_balance(name).await {
            Err(e) if not_loaded(&e) => {
                self.load().await?;
                Ok(self.rpc.get_balance(name).await?)
            }
            result => Ok(result?),
        }
    }

    /// # Errors
    ///
    /// Returns an RPC error when the wallet is missing or the daemon is
    /// unreachable.
    pub async fn new_address(&self) -> Result<String, Error> {
        self.ready().await?;
        let name = self.wallet_name();
        match self.rpc.get_new_address(name).await {
            Err(e) if not_loaded(&e) => {
                self.load().await?;
                Ok(self.rpc.get_new_address(name).await?)
            }
            result => Ok(result?),
        }
    }

    /// Interactive loop until the operator picks "Back"
    ///
    /// Failed actions are shown as warnings and the menu continues.
    ///
    /// # Errors
    ///
    /// Returns an error only when the prompter itself fails.
    pub async fn run_menu(&self, prompter: &mut dyn Prompter) -> Result<(), Error> {
        loop {
            let choice = prompter.select("Wallet management", &MENU, 0)?;
            let name = self.wallet_name();
            let result = match choice {
                0 => self
                    .create_wallet()
                    .await
                    .map(|address| format!("wallet {name} ready, payout address {address}")),
                1 => {
                    let answer = prompter.input("Payout address", None)?;
                    self.set_external_address(&answer)
                        .await
                        .map(|address| format!("payout address set to {address}"))
                }
                2 => self
                    .balance()
                    .await
                    .map(|balance| format!("balance of {name}: {balance:.8}")),
                3 => self
                    .new_address()
                    .await
                    .map(|address| format!("new address: {address}")),
                _ => return Ok(()),
            };
            match result {
                Ok(message) => prompter.notice(NoticeLevel::Info, &message),
                Err(e) => {
                    tracing::warn!(error = %e, "wallet action failed");
                    prompter.notice(NoticeLevel::Warning, &e.to_string());
                }
            }
        }
    }
}
