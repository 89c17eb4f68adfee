//! Operations context for dependency injection

use nodectl_config::ToolConfig;
use nodectl_errors::{Error, OpsError};
use nodectl_events::{EventEmitter, EventSender};
use nodectl_install::InstallContext;
use nodectl_net::{HttpRpcConnector, NetClient, RpcConnector};
use nodectl_platform::{CommandLog, Platform, PlatformContext};
use nodectl_probe::EnvironmentProbe;
use nodectl_types::NodeConfig;
use std::sync::Arc;

/// Everything the dispatcher needs to reach the host, the network and the
/// daemon
pub struct OpsCtx {
    pub platform: Platform,
    pub platform_ctx: PlatformContext,
    pub tool: Arc<ToolConfig>,
    /// HTTP client for the release lookup; `None` forces the fallback version
    pub net: Option<NetClient>,
    pub rpc: Arc<dyn RpcConnector>,
    pub tx: EventSender,
}

impl OpsCtx {
    // No public constructor - use OpsContextBuilder instead

    #[must_use]
    pub fn probe(&self) -> EnvironmentProbe<'_> {
        EnvironmentProbe::new(&self.platform, &self.platform_ctx, &self.tool)
    }

    /// Step context for a task graph run against `config`
    #[must_use]
    pub fn install_context(&self, config: Arc<NodeConfig>) -> InstallContext {
        InstallContext::new(
            self.platform.clone(),
            self.platform_ctx.clone(),
            self.tool.clone(),
            config,
        )
        .with_rpc(self.rpc.clone())
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Builder for [`OpsCtx`]
pub struct OpsContextBuilder {
    platform: Option<Platform>,
    tool: Option<Arc<ToolConfig>>,
    tx: Option<EventSender>,
    command_log: Option<Arc<CommandLog>>,
    net: Option<NetClient>,
    rpc: Option<Arc<dyn RpcConnector>>,
}

impl OpsContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            platform: None,
            tool: None,
            tx: None,
            command_log: None,
            net: None,
            rpc: None,
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    #[must_use]
    pub fn with_tool_config(mut self, tool: Arc<ToolConfig>) -> Self {
        self.tool = Some(tool);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Per-run log receiving captured command output
    #[must_use]
    pub fn with_command_log(mut self, log: Arc<CommandLog>) -> Self {
        self.command_log = Some(log);
        self
    }

    /// Set network client
    #[must_use]
    pub fn with_net(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    /// Replace the daemon RPC connector
    #[must_use]
    pub fn with_rpc_connector(mut self, rpc: Arc<dyn RpcConnector>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    /// Build the context
    ///
    /// The platform defaults to the real host and the RPC connector to
    /// HTTP; the tool configuration and event sender are required.
    ///
    /// # Errors
    ///
    /// Returns an error if a required component is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let tool = self.tool.ok_or_else(|| OpsError::MissingComponent {
            component: "tool_config".to_string(),
        })?;
        let tx = self.tx.ok_or_else(|| OpsError::MissingComponent {
            component: "event_sender".to_string(),
        })?;

        Ok(OpsCtx {
            platform: self.platform.unwrap_or_else(Platform::current),
            platform_ctx: PlatformContext::new(Some(tx.clone()), self.command_log),
            tool,
            net: self.net,
            rpc: self.rpc.unwrap_or_else(|| Arc::new(HttpRpcConnector)),
            tx,
        })
    }
}

impl Default for OpsContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
