//! Everything a step needs to touch the host

use nodectl_config::{constants::LOG_EXCERPT_LINES, ToolConfig};
use nodectl_events::{EventEmitter, EventSender};
use nodectl_net::{HttpRpcConnector, RpcConnector, RpcEndpoint};
use nodectl_platform::{CommandOutput, Platform, PlatformCommand, PlatformContext};
use nodectl_types::{NodeConfig, StepFailure};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared state for one task graph run
#[derive(Clone)]
pub struct InstallContext {
    pub platform: Platform,
    pub platform_ctx: PlatformContext,
    pub tool: Arc<ToolConfig>,
    pub config: Arc<NodeConfig>,
    pub rpc: Arc<dyn RpcConnector>,
}

impl InstallContext {
    #[must_use]
    pub fn new(
        platform: Platform,
        platform_ctx: PlatformContext,
        tool: Arc<ToolConfig>,
        config: Arc<NodeConfig>,
    ) -> Self {
        Self {
            platform,
            platform_ctx,
            tool,
            config,
            rpc: Arc::new(HttpRpcConnector),
        }
    }

    /// Replace the RPC connector
    #[must_use]
    pub fn with_rpc(mut self, rpc: Arc<dyn RpcConnector>) -> Self {
        self.rpc = rpc;
        self
    }

    /// RPC endpoint of the configured node
    #[must_use]
    pub fn rpc_endpoint(&self) -> RpcEndpoint {
        RpcEndpoint::for_config(&self.config)
    }

    #[must_use]
    pub fn daemon_config_path(&self) -> PathBuf {
        self.config
            .paths
            .config_file(&self.tool.daemon.config_file_name)
    }

    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.config
            .paths
            .config_file(&self.tool.wallet.credential_file_name)
    }

    #[must_use]
    pub fn installed_binary(&self, binary: &str) -> PathBuf {
        self.tool
            .installed_binary(&self.config.paths.install_dir, binary)
    }

    /// Failure carrying the path of the per-run command log
    pub fn failure(&self, reason: impl Into<String>) -> StepFailure {
        StepFailure::new(reason).with_log_path(self.platform_ctx.log_path())
    }

    /// Run a command; only a spawn failure is an error
    ///
    /// # Errors
    ///
    /// Returns a [`StepFailure`] when the command cannot be started.
    pub async fn run(&self, cmd: PlatformCommand) -> Result<CommandOutput, StepFailure> {
        let line = cmd.command_line();
        self.platform
            .execute_command(&self.platform_ctx, cmd)
            .await
            .map_err(|e| self.failure(format!("could not run `{line}`: {e}")))
    }

    /// Run a command and turn a non-zero exit into a [`StepFailure`] with
    /// the tail of its output
    ///
    /// # Errors
    ///
    /// Returns a [`StepFailure`] when the command cannot be started or exits
    /// non-zero.
    pub async fn run_checked(
        &self,
        cmd: PlatformCommand,
        what: &str,
    ) -> Result<CommandOutput, StepFailure> {
        let output = self.run(cmd).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(self
                .failure(format!("{what} failed ({})", output.status_description()))
                .with_excerpt(output.tail(LOG_EXCERPT_LINES)))
        }
    }

    /// Run a command and report only whether it exited zero
    pub async fn succeeds(&self, cmd: PlatformCommand) -> bool {
        self.platform.succeeds(&self.platform_ctx, cmd).await
    }

    /// Whether the service unit is currently active
    pub async fn service_active(&self) -> bool {
        self.succeeds(
            PlatformCommand::new("systemctl")
                .args(["is-active", self.tool.daemon.service_unit.as_str()]),
        )
        .await
    }

    /// Tag used as the ufw rule comment for rules nodectl adds
    #[must_use]
    pub fn firewall_tag(&self) -> String {
        firewall_tag(&self.tool)
    }
}

/// ufw comment identifying rules added for this daemon profile
#[must_use]
pub fn firewall_tag(tool: &ToolConfig) -> String {
    format!("nodectl-{}", tool.daemon.name)
}

impl EventEmitter for InstallContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.platform_ctx.event_sender()
    }
}
