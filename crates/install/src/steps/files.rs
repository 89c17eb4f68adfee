//! Generated config, credential and unit files

use async_trait::async_trait;
use nodectl_artifacts::{render_daemon_config, render_service_unit, UnitSpec};
use nodectl_platform::{fs, PlatformCommand};
use nodectl_types::{PoolWalletMode, StepFailure, StepId, StepOutcome, StepSuccess};
use std::path::Path;

use crate::context::InstallContext;
use crate::graph::Step;
use crate::steps::wallet::write_credentials;

/// Write `text` unless the file already holds exactly that; `true` when written
async fn write_if_changed(
    cx: &InstallContext,
    path: &Path,
    text: &str,
    mode: u32,
) -> Result<bool, StepFailure> {
    let current = fs::read_optional(path)
        .await
        .map_err(|e| cx.failure(e.to_string()))?;
    if current.as_deref() == Some(text) {
        fs::set_mode(path, mode)
            .await
            .map_err(|e| cx.failure(e.to_string()))?;
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| cx.failure(e.to_string()))?;
    }
    fs::write_file_with_mode(path, text, mode)
        .await
        .map_err(|e| cx.failure(e.to_string()))?;
    Ok(true)
}

/// Renders the daemon config and the pool credential file
pub struct WriteConfigFile;

#[async_trait]
impl Step for WriteConfigFile {
    fn id(&self) -> StepId {
        StepId::WriteConfigFile
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let user = cx.tool.daemon.service_user.as_str();
        let path = cx.daemon_config_path();
        let text = render_daemon_config(&cx.config);
        let written = write_if_changed(cx, &path, &text, 0o600).await?;
        cx.run_checked(
            PlatformCommand::new("chown")
                .arg(format!("{user}:{user}"))
                .arg(path.display().to_string()),
            "chown",
        )
        .await?;

        let credentials = cx.credentials_path();
        match cx.config.pool_wallet.as_ref() {
            Some(wallet) if wallet.mode == PoolWalletMode::ExistingAddress => {
                let address = wallet.address.as_ref().map(ToString::to_string);
                write_credentials(cx, address).await?;
            }
            Some(_) => {}
            None => {
                if fs::remove_file(&credentials)
                    .await
                    .map_err(|e| cx.failure(e.to_string()))?
                {
                    tracing::info!(path = %credentials.display(), "removed stale credential file");
                }
            }
        }

        if written {
            Ok(StepSuccess::done(format!("wrote {}", path.display())))
        } else {
            Ok(StepSuccess::already(format!(
                "{} unchanged",
                path.display()
            )))
        }
    }
}

/// Installs the systemd unit and reloads the manager
pub struct InstallServiceUnit;

#[async_trait]
impl Step for InstallServiceUnit {
    fn id(&self) -> StepId {
        StepId::InstallServiceUnit
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let profile = &cx.tool.daemon;
        let text = render_service_unit(&UnitSpec {
            profile,
            service: &cx.tool.service,
            config: &cx.config,
        });
        let path = cx.tool.paths.unit_file(&profile.service_unit);
        if !write_if_changed(cx, &path, &text, 0o644).await? {
            return Ok(StepSuccess::already(format!(
                "{} unchanged",
                profile.service_unit
            )));
        }
        let reloaded = cx
            .run_checked(
                PlatformCommand::new("systemctl").arg("daemon-reload"),
                "systemctl daemon-reload",
            )
            .await;
        if let Err(failure) = reloaded {
            // an unloaded unit must not look installed to the next run
            if let Err(e) = fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %e, "could not remove unit file");
            }
            return Err(failure);
        }
        Ok(StepSuccess::done(format!("installed {}", path.display())))
    }
}
