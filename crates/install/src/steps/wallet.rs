//! Pool wallet provisioning
//!
//! The wallet is created through RPC against a throwaway daemon instance
//! started with networking disabled, so no peers are contacted and the
//! managed service does not need to exist yet.

use async_trait::async_trait;
use nodectl_artifacts::PoolCredentials;
use nodectl_errors::RpcError;
use nodectl_events::EventEmitter;
use nodectl_net::NodeRpc;
use nodectl_platform::{fs, PlatformCommand};
use nodectl_types::{PoolWalletMode, StepFailure, StepId, StepOutcome, StepSuccess};
use std::time::Duration;

use crate::context::InstallContext;
use crate::graph::Step;

/// Poll `getblockchaininfo` until the daemon answers
///
/// A node still warming up answers with an error, which counts as not
/// ready; bad credentials never recover and end the wait at once.
///
/// # Errors
///
/// Returns [`RpcError::Unauthorized`] on rejected credentials and
/// [`RpcError::NotReady`] once `attempts` polls have failed.
pub async fn wait_for_rpc(
    rpc: &dyn NodeRpc,
    attempts: u32,
    backoff: Duration,
) -> Result<(), RpcError> {
    for attempt in 1..=attempts {
        match rpc.get_blockchain_info().await {
            Ok(_) => return Ok(()),
            Err(RpcError::Unauthorized) => return Err(RpcError::Unauthorized),
            Err(e) => tracing::debug!(attempt, error = %e, "daemon not ready"),
        }
        if attempt < attempts {
            tokio::time::sleep(backoff).await;
        }
    }
    Err(RpcError::NotReady { attempts })
}

/// Write the pool credential file with owner-only permissions
///
/// # Errors
///
/// Returns a [`StepFailure`] when the file cannot be written.
pub async fn write_credentials(
    cx: &InstallContext,
    address: Option<String>,
) -> Result<(), StepFailure> {
    let name = cx.tool.wallet.name.clone();
    let credentials = PoolCredentials {
        wallet_path: cx.config.paths.wallet_dir.join(&name),
        wallet_name: name,
        wallet_address: address,
    };
    let path = cx.credentials_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| cx.failure(e.to_string()))?;
    }
    fs::write_file_with_mode(&path, &credentials.render(), 0o600)
        .await
        .map_err(|e| cx.failure(e.to_string()))
}

async fn daemon_running(cx: &InstallContext) -> bool {
    let profile = &cx.tool.daemon;
    cx.succeeds(PlatformCommand::new("pgrep").args([
        "-x",
        profile.daemon_binary.as_str(),
        "-u",
        profile.service_user.as_str(),
    ]))
    .await
}

async fn start_isolated_daemon(cx: &InstallContext) -> Result<(), StepFailure> {
    let profile = &cx.tool.daemon;
    let binary = cx.installed_binary(&profile.daemon_binary);
    cx.run_checked(
        PlatformCommand::new("runuser")
            .args(["-u", profile.service_user.as_str(), "--"])
            .arg(binary.display().to_string())
            .arg(format!("-conf={}", cx.daemon_config_path().display()))
            .args(["-daemon", "-listen=0", "-connect=0", "-dnsseed=0"]),
        "temporary daemon start",
    )
    .await?;
    Ok(())
}

async fn stop_isolated_daemon(cx: &InstallContext, rpc: &dyn NodeRpc) {
    if let Err(e) = rpc.stop().await {
        tracing::warn!(error = %e, "temporary daemon did not accept stop");
    }
    for _ in 0..cx.tool.service.stop_grace_secs {
        if !daemon_running(cx).await {
            return;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    if daemon_running(cx).await {
        let profile = &cx.tool.daemon;
        tracing::warn!("temporary daemon still running, terminating");
        let _ = cx
            .run(PlatformCommand::new("pkill").args([
                "-TERM",
                "-x",
                profile.daemon_binary.as_str(),
                "-u",
                profile.service_user.as_str(),
            ]))
            .await;
    }
}

async fn provision_address(
    cx: &InstallContext,
    rpc: &dyn NodeRpc,
    name: &str,
) -> Result<String, StepFailure> {
    let wallet = &cx.tool.wallet;
    wait_for_rpc(
        rpc,
        wallet.ready_attempts,
        Duration::from_secs(wallet.ready_backoff_secs),
    )
    .await
    .map_err(|e| cx.failure(format!("daemon RPC unavailable: {e}")))?;
    rpc.create_wallet(name)
        .await
        .map_err(|e| cx.failure(format!("createwallet failed: {e}")))?;
    rpc.get_new_address(name)
        .await
        .map_err(|e| cx.failure(format!("getnewaddress failed: {e}")))
}

/// Creates the pool payout wallet and records its first address
pub struct ProvisionPoolWallet;

#[async_trait]
impl Step for ProvisionPoolWallet {
    fn id(&self) -> StepId {
        StepId::ProvisionPoolWallet
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let Some(wallet) = cx.config.pool_wallet.as_ref() else {
            return Ok(StepSuccess::already("no pool wallet configured"));
        };
        if wallet.mode != PoolWalletMode::Create {
            return Ok(StepSuccess::already("wallet is not created by nodectl"));
        }

        let name = cx.tool.wallet.name.as_str();
        let existing = fs::read_optional(&cx.credentials_path())
            .await
            .ok()
            .flatten()
            .and_then(|text| PoolCredentials::parse(&text));
        if let Some(creds) = existing {
            if creds.wallet_name == name && creds.wallet_address.is_some() {
                return Ok(StepSuccess::already(format!("wallet {name} already provisioned")));
            }
        }

        let started_here = !daemon_running(cx).await;
        if started_here {
            cx.emit_step_progress(self.id(), "starting daemon without networking");
            start_isolated_daemon(cx).await?;
        }

        let rpc = cx.rpc.connect(&cx.rpc_endpoint());
        let result = provision_address(cx, rpc.as_ref(), name).await;
        if started_here {
            stop_isolated_daemon(cx, rpc.as_ref()).await;
        }
        let address = result?;

        write_credentials(cx, Some(address.clone())).await?;
        Ok(StepSuccess::done(format!(
            "wallet {name} created, payout address {address}"
        )))
    }
}
