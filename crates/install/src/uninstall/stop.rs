//! Graduated daemon shutdown and account removal

use nodectl_platform::PlatformCommand;
use nodectl_types::UninstallReport;
use std::time::Duration;

use super::Uninstaller;

impl Uninstaller {
    async fn daemon_running(&self) -> bool {
        self.succeeds(
            PlatformCommand::new("pgrep").args(["-x", self.tool.daemon.daemon_binary.as_str()]),
        )
        .await
    }

    /// Poll for the daemon to exit for up to the configured grace period
    async fn wait_for_exit(&self) -> bool {
        for _ in 0..self.tool.service.stop_grace_secs {
            if !self.daemon_running().await {
                return true;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        !self.daemon_running().await
    }

    /// RPC stop, then the service manager, then signals
    pub(super) async fn stop_daemon(&self, report: &mut UninstallReport) {
        let action = "stop daemon";
        self.started(action);
        let profile = &self.tool.daemon;
        let unit = profile.service_unit.as_str();

        if let Some(rpc) = &self.rpc {
            match rpc.stop().await {
                Ok(()) => {
                    if self.wait_for_exit().await {
                        tracing::info!("daemon stopped through RPC");
                    }
                }
                Err(e) => tracing::debug!(error = %e, "RPC stop unavailable"),
            }
        }

        if self
            .succeeds(PlatformCommand::new("systemctl").args(["is-active", unit]))
            .await
        {
            if let Err(e) = self
                .exec(PlatformCommand::new("systemctl").args(["stop", unit]))
                .await
            {
                tracing::warn!(error = %e, "systemctl stop failed");
            }
        }

        for signal in ["-TERM", "-KILL"] {
            if !self.daemon_running().await {
                break;
            }
            tracing::warn!(signal, "daemon still running, signalling");
            let _ = self
                .exec(PlatformCommand::new("pkill").args([
                    signal,
                    "-x",
                    profile.daemon_binary.as_str(),
                ]))
                .await;
            self.wait_for_exit().await;
        }

        if self.daemon_running().await {
            self.failed(report, action, "daemon is still running".to_string());
        } else {
            self.completed(report, action, true);
        }
    }

    /// Kill leftover processes of the service user, then drop the account
    pub(super) async fn remove_account(&self, report: &mut UninstallReport) {
        let user = self.tool.daemon.service_user.as_str();

        if self
            .succeeds(PlatformCommand::new("pgrep").args(["-u", user]))
            .await
        {
            self.command(
                report,
                "kill user processes",
                PlatformCommand::new("pkill").args(["-KILL", "-u", user]),
                true,
            )
            .await;
        }
        if self
            .succeeds(PlatformCommand::new("id").args(["-u", user]))
            .await
        {
            self.command(
                report,
                "remove service user",
                PlatformCommand::new("userdel").arg(user),
                false,
            )
            .await;
        }
        if self
            .succeeds(PlatformCommand::new("getent").args(["group", user]))
            .await
        {
            self.command(
                report,
                "remove service group",
                PlatformCommand::new("groupdel").arg(user),
                false,
            )
            .await;
        }
    }
}
