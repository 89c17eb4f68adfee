//! Full teardown of a nodectl-managed node
//!
//! Teardown is best effort: every action runs even when an earlier one
//! failed, failures are collected into the [`UninstallReport`], and a final
//! verification pass lists whatever is still on the host.

mod stop;
mod sweep;

pub use sweep::{matching_rule_numbers, temp_patterns};

use nodectl_config::ToolConfig;
use nodectl_errors::Error;
use nodectl_events::{AppEvent, EventEmitter, EventSender, UninstallEvent};
use nodectl_net::NodeRpc;
use nodectl_platform::{fs, CommandOutput, Platform, PlatformCommand, PlatformContext};
use nodectl_probe::EnvironmentProbe;
use nodectl_types::{Paths, PartialNodeConfig, UninstallReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What happens to the blockchain data directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataRetention {
    /// Delete everything, wallets included
    #[default]
    Remove,
    /// Leave the data directory untouched
    KeepAll,
    /// Delete chain data but keep the wallet directory
    KeepWallets,
}

/// Options for [`Uninstaller::run`]
#[derive(Debug, Clone)]
pub struct UninstallOptions {
    pub retention: DataRetention,
    /// Skip interactive confirmation in the caller
    pub force: bool,
}

options_builder!(UninstallOptions {
    retention: DataRetention,
    force: bool,
});

/// Removes everything nodectl installed
pub struct Uninstaller {
    platform: Platform,
    ctx: PlatformContext,
    tool: Arc<ToolConfig>,
    paths: Paths,
    ports: Vec<u16>,
    rpc: Option<Arc<dyn NodeRpc>>,
}

impl Uninstaller {
    /// Teardown of the default layout described by `tool`
    #[must_use]
    pub fn new(platform: Platform, ctx: PlatformContext, tool: Arc<ToolConfig>) -> Self {
        let paths = tool.paths.node_paths();
        let ports = vec![tool.network.p2p_port, tool.network.rpc_port];
        Self {
            platform,
            ctx,
            tool,
            paths,
            ports,
            rpc: None,
        }
    }

    /// Follow the directories and ports recorded in an existing daemon config
    #[must_use]
    pub fn with_existing(mut self, existing: &PartialNodeConfig) -> Self {
        if let Some(dir) = &existing.data_dir {
            self.paths.data_dir.clone_from(dir);
        }
        if let Some(dir) = &existing.wallet_dir {
            self.paths.wallet_dir.clone_from(dir);
        }
        if let Some(dir) = existing.debug_log_file.as_ref().and_then(|f| f.parent()) {
            self.paths.log_dir = dir.to_path_buf();
        }
        self.ports = [existing.p2p_port, existing.rpc_port]
            .into_iter()
            .zip([self.tool.network.p2p_port, self.tool.network.rpc_port])
            .map(|(found, default)| found.unwrap_or(default))
            .collect();
        self
    }

    /// RPC handle used to ask the daemon to shut down cleanly
    #[must_use]
    pub fn with_rpc(mut self, rpc: Arc<dyn NodeRpc>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    #[must_use]
    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Tear everything down and verify what is left
    pub async fn run(&self, options: &UninstallOptions) -> UninstallReport {
        let mut report = UninstallReport::default();
        let profile = &self.tool.daemon;
        let tool_paths = &self.tool.paths;
        tracing::info!(retention = ?options.retention, "uninstall started");

        self.stop_daemon(&mut report).await;

        let unit_file = tool_paths.unit_file(&profile.service_unit);
        self.command(
            &mut report,
            "disable service",
            PlatformCommand::new("systemctl").args(["disable", profile.service_unit.as_str()]),
            true,
        )
        .await;
        self.remove(&mut report, "service unit", &unit_file).await;
        self.command(
            &mut report,
            "reload systemd",
            PlatformCommand::new("systemctl").arg("daemon-reload"),
            false,
        )
        .await;

        for binary in &profile.binaries {
            let link = tool_paths.bin_dir.join(binary);
            let target = self.tool.installed_binary(&self.paths.install_dir, binary);
            if fs::is_symlink_to(&link, &target).await {
                self.remove(&mut report, &format!("symlink {binary}"), &link)
                    .await;
            }
        }
        self.remove(&mut report, "install directory", &self.paths.install_dir)
            .await;
        self.remove(&mut report, "source directory", &self.paths.source_dir)
            .await;
        self.remove(
            &mut report,
            "legacy database",
            &self.tool.build.legacy_db.prefix,
        )
        .await;

        self.remove_firewall_rules(&mut report).await;

        self.remove(&mut report, "config directory", &self.paths.config_dir)
            .await;
        self.remove(&mut report, "log directory", &self.paths.log_dir)
            .await;
        self.remove_data(&mut report, options.retention).await;

        self.remove_account(&mut report).await;
        self.remove_temp_files(&mut report).await;

        report.residual = self.verify(options.retention).await;
        for artifact in &report.residual {
            self.emit(AppEvent::Uninstall(UninstallEvent::Residual {
                artifact: artifact.clone(),
            }));
        }
        self.emit(AppEvent::Uninstall(UninstallEvent::Finished {
            residual: report.residual.len(),
        }));
        tracing::info!(
            removed = report.removed.len(),
            failed = report.failed.len(),
            residual = report.residual.len(),
            "uninstall finished"
        );
        report
    }

    fn started(&self, action: &str) {
        self.emit(AppEvent::Uninstall(UninstallEvent::ActionStarted {
            action: action.to_string(),
        }));
    }

    fn completed(&self, report: &mut UninstallReport, action: &str, removed: bool) {
        if removed {
            report.removed.push(action.to_string());
        }
        self.emit(AppEvent::Uninstall(UninstallEvent::ActionCompleted {
            action: action.to_string(),
            removed,
        }));
    }

    fn failed(&self, report: &mut UninstallReport, action: &str, error: String) {
        tracing::warn!(action, error = %error, "uninstall action failed");
        self.emit(AppEvent::Uninstall(UninstallEvent::ActionFailed {
            action: action.to_string(),
            error: error.clone(),
        }));
        report.failed.push((action.to_string(), error));
    }

    /// Remove a file or directory tree; absence is not a failure
    async fn remove(&self, report: &mut UninstallReport, action: &str, path: &Path) {
        self.started(action);
        match fs::remove_path(path).await {
            Ok(removed) => self.completed(report, action, removed),
            Err(e) => self.failed(report, action, e.to_string()),
        }
    }

    /// Run a command; with `tolerate_failure` a non-zero exit only logs
    async fn command(
        &self,
        report: &mut UninstallReport,
        action: &str,
        cmd: PlatformCommand,
        tolerate_failure: bool,
    ) -> Option<CommandOutput> {
        self.started(action);
        match self.exec(cmd).await {
            Ok(output) if output.success() => {
                self.completed(report, action, true);
                Some(output)
            }
            Ok(output) if tolerate_failure => {
                tracing::debug!(action, status = %output.status_description(), "ignored failure");
                self.completed(report, action, false);
                Some(output)
            }
            Ok(output) => {
                let reason = output
                    .tail(1)
                    .pop()
                    .unwrap_or_else(|| output.status_description());
                self.failed(report, action, reason);
                None
            }
            Err(e) => {
                self.failed(report, action, e.to_string());
                None
            }
        }
    }

    async fn exec(&self, cmd: PlatformCommand) -> Result<CommandOutput, Error> {
        self.platform.execute_command(&self.ctx, cmd).await
    }

    async fn succeeds(&self, cmd: PlatformCommand) -> bool {
        self.platform.succeeds(&self.ctx, cmd).await
    }

    /// Whatever the teardown left behind
    async fn verify(&self, retention: DataRetention) -> Vec<String> {
        let mut residual = Vec::new();
        let host = EnvironmentProbe::new(&self.platform, &self.ctx, &self.tool)
            .detect_existing_install()
            .await;
        let profile = &self.tool.daemon;
        if host.binary_present {
            residual.push(format!("{} binary", profile.daemon_binary));
        }
        if host.service_registered {
            residual.push(format!("service {}", profile.service_unit));
        }
        if host.service_active {
            residual.push(format!("running service {}", profile.service_unit));
        }
        if host.user_exists {
            residual.push(format!("user {}", profile.service_user));
        }

        let mut paths: Vec<PathBuf> = vec![
            self.paths.install_dir.clone(),
            self.paths.source_dir.clone(),
            self.paths.config_dir.clone(),
            self.paths.log_dir.clone(),
            self.tool.build.legacy_db.prefix.clone(),
            self.tool.paths.unit_file(&profile.service_unit),
        ];
        paths.extend(
            profile
                .binaries
                .iter()
                .map(|b| self.tool.paths.bin_dir.join(b)),
        );
        if retention == DataRetention::Remove {
            paths.push(self.paths.data_dir.clone());
        }
        for path in paths {
            let label = path.display().to_string();
            if fs::exists(&path).await && !residual.contains(&label) {
                residual.push(label);
            }
        }
        residual
    }
}

impl EventEmitter for Uninstaller {
    fn event_sender(&self) -> Option<&EventSender> {
        self.ctx.event_sender()
    }
}
