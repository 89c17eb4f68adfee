#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Interactive configurator for nodectl
//!
//! Turns probe results plus operator answers into a validated
//! [`NodeConfig`]. All decisions live here; collecting answers is the job
//! of a [`Prompter`], so the whole flow can be driven by a
//! [`ScriptedPrompter`] in tests. Nothing in this crate touches the host.

mod gates;
mod prompt;
mod summary;

pub use gates::{evaluate_gates, Gate, GateFinding, Severity};
pub use prompt::{Answer, NoticeLevel, Prompter, ScriptedPrompter};
pub use summary::{render_summary, summary_rows};

use nodectl_config::ToolConfig;
use nodectl_errors::{ConfigureError, Error};
use nodectl_types::{
    Auth, ChainMode, CompatibilityWarning, NetworkSettings, NodeConfig,
    Notification, PartialNodeConfig, Paths, PoolWallet, Resources, Role, Secret, Tuning,
    WalletAddress,
};
use rand::distr::{Alphanumeric, SampleString};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Length of generated RPC passwords
pub const GENERATED_PASSWORD_LEN: usize = 32;

/// Random alphanumeric RPC password
#[must_use]
pub fn generate_password() -> Secret {
    Secret::new(Alphanumeric.sample_string(&mut rand::rng(), GENERATED_PASSWORD_LEN))
}

/// What the configurator starts from
#[derive(Debug, Clone)]
pub struct ConfigureInputs<'a> {
    pub resources: &'a Resources,
    /// Settings recovered from an existing daemon config, used as defaults
    pub existing: Option<&'a PartialNodeConfig>,
    pub software_version: String,
}

/// A confirmed Configuration Model
#[derive(Debug, Clone)]
pub struct Configured {
    pub config: NodeConfig,
    pub warnings: Vec<CompatibilityWarning>,
    /// Hard gates the operator chose to continue past
    pub overridden_gates: Vec<Gate>,
}

/// Asks the configuration questions in a fixed order
pub struct Configurator<'a> {
    tool: &'a ToolConfig,
    prompter: &'a mut dyn Prompter,
}

const ROLE_ITEMS: [&str; 2] = ["Standard node", "Mining pool backend"];
const BIND_ITEMS: [&str; 2] = ["Local only (127.0.0.1)", "All interfaces (0.0.0.0)"];
const NOTIFY_ITEMS: [&str; 4] = [
    "RPC polling (compatible with every pool)",
    "ZMQ publishers",
    "blocknotify script",
    "ZMQ and blocknotify script",
];
const WALLET_ITEMS: [&str; 3] = [
    "Create a wallet on this node",
    "Use an existing payout address",
    "Set up later",
];

impl<'a> Configurator<'a> {
    pub fn new(tool: &'a ToolConfig, prompter: &'a mut dyn Prompter) -> Self {
        Self { tool, prompter }
    }

    /// Run the full question flow.
    ///
    /// # Errors
    ///
    /// [`ConfigureError::ResourceGateDeclined`] when the operator stops at a
    /// hard gate, [`Error::Cancelled`] when the summary is declined, or a
    /// [`nodectl_errors::ConfigError`] if the result violates an invariant.
    pub fn run(&mut self, inputs: &ConfigureInputs<'_>) -> Result<Configured, Error> {
        let empty = PartialNodeConfig::default();
        let existing = inputs.existing.unwrap_or(&empty);

        let role = self.ask_role(existing.role)?;
        let chain_mode = self.ask_chain(existing.chain_mode)?;
        let overridden_gates = self.check_gates(inputs.resources, role, chain_mode)?;

        let rpc_bind = match role {
            Role::PoolBackend => IpAddr::V4(Ipv4Addr::LOCALHOST),
            Role::Standard => self.ask_bind(existing.rpc_bind)?,
        };
        let notification = match role {
            Role::PoolBackend => self.ask_notification(existing)?,
            Role::Standard => Notification::None,
        };
        let auth = self.ask_credentials(existing)?;
        let tx_index = match role {
            Role::PoolBackend if chain_mode.is_pruned() => self.ask_keep_tx_index()?,
            Role::PoolBackend => true,
            Role::Standard => false,
        };
        let pool_wallet = match role {
            Role::PoolBackend => Some(self.ask_pool_wallet()?),
            Role::Standard => None,
        };
        let firewall_enabled = self
            .prompter
            .confirm("Open the P2P port with ufw?", true)?;

        let uses_zmq = notification.uses_zmq();
        let defaults = &self.tool.network;
        let config = NodeConfig {
            role,
            chain_mode,
            paths: node_paths(self.tool, existing),
            network: NetworkSettings {
                p2p_port: existing.p2p_port.unwrap_or(defaults.p2p_port),
                rpc_port: existing.rpc_port.unwrap_or(defaults.rpc_port),
                rpc_bind,
                rpc_allow: NetworkSettings::allow_list_for(rpc_bind),
                zmq_hashblock_port: uses_zmq.then(|| {
                    existing
                        .zmq_hashblock_port
                        .unwrap_or(defaults.zmq_hashblock_port)
                }),
                zmq_rawblock_port: uses_zmq.then(|| {
                    existing
                        .zmq_rawblock_port
                        .unwrap_or(defaults.zmq_rawblock_port)
                }),
            },
            auth,
            notification,
            firewall_enabled,
            pool_wallet,
            software_version: inputs.software_version.clone(),
            tuning: tuning(self.tool, role, tx_index, inputs.resources.cpu_cores, existing),
        };

        let warnings = config.validate()?;
        for warning in &warnings {
            self.prompter
                .notice(NoticeLevel::Warning, &warning.to_string());
        }

        self.prompter.notice(
            NoticeLevel::Info,
            &format!("Configuration summary:\n{}", render_summary(&config)),
        );
        if !self
            .prompter
            .confirm("Apply this configuration?", false)?
        {
            tracing::info!("configuration declined at summary");
            return Err(Error::Cancelled);
        }

        tracing::info!(role = %config.role, chain = %config.chain_mode, "configuration confirmed");
        Ok(Configured {
            config,
            warnings,
            overridden_gates,
        })
    }

    fn ask_role(&mut self, current: Option<Role>) -> Result<Role, ConfigureError> {
        let default = usize::from(current == Some(Role::PoolBackend));
        let index = self
            .prompter
            .select("Node role", &ROLE_ITEMS, default)?;
        Ok(if index == 1 {
            Role::PoolBackend
        } else {
            Role::Standard
        })
    }

    fn ask_chain(&mut self, current: Option<ChainMode>) -> Result<ChainMode, ConfigureError> {
        let prune_mb = match current {
            Some(ChainMode::Pruned(size)) => size,
            _ => self.tool.daemon_tuning.prune_size_mb,
        };
        let pruned_label = format!("Pruned (keep about {prune_mb} MB of recent blocks)");
        let items = ["Full (complete blockchain)", pruned_label.as_str()];
        let default = usize::from(current.is_some_and(ChainMode::is_pruned));
        let index = self.prompter.select("Chain mode", &items, default)?;
        Ok(if index == 1 {
            ChainMode::Pruned(prune_mb)
        } else {
            ChainMode::Full
        })
    }

    fn check_gates(
        &mut self,
        resources: &Resources,
        role: Role,
        chain_mode: ChainMode,
    ) -> Result<Vec<Gate>, ConfigureError> {
        let mut overridden = Vec::new();
        for finding in evaluate_gates(resources, role, chain_mode, &self.tool.thresholds) {
            self.prompter.notice(NoticeLevel::Warning, &finding.message);
            if !finding.is_hard() {
                continue;
            }
            let prompt = format!("The {} check failed. Continue anyway?", finding.gate);
            if !self.prompter.confirm(&prompt, false)? {
                return Err(ConfigureError::ResourceGateDeclined {
                    gate: finding.gate.to_string(),
                });
            }
            tracing::warn!(gate = %finding.gate, "hard gate overridden");
            overridden.push(finding.gate);
        }
        Ok(overridden)
    }

    fn ask_bind(&mut self, current: Option<IpAddr>) -> Result<IpAddr, ConfigureError> {
        let default = usize::from(current.is_some_and(|ip| ip.is_unspecified()));
        let index = self
            .prompter
            .select("RPC interface", &BIND_ITEMS, default)?;
        Ok(if index == 1 {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        })
    }

    fn ask_notification(
        &mut self,
        existing: &PartialNodeConfig,
    ) -> Result<Notification, ConfigureError> {
        let had_zmq = existing.zmq_hashblock_port.is_some() || existing.zmq_rawblock_port.is_some();
        let default = match (had_zmq, existing.block_notify.is_some()) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        };
        let index = self
            .prompter
            .select("Block notification method", &NOTIFY_ITEMS, default)?;
        Ok(match index {
            1 => Notification::Zmq,
            2 => Notification::ScriptHook {
                command: self.ask_hook(existing.block_notify.as_deref())?,
            },
            3 => Notification::Both {
                command: self.ask_hook(existing.block_notify.as_deref())?,
            },
            _ => Notification::None,
        })
    }

    fn ask_hook(&mut self, current: Option<&str>) -> Result<String, ConfigureError> {
        loop {
            let command = self
                .prompter
                .input("blocknotify command (%s is replaced by the block hash)", current)?;
            let command = command.trim();
            if command.contains("%s") {
                return Ok(command.to_string());
            }
            self.prompter.notice(
                NoticeLevel::Warning,
                "the command must contain the %s placeholder",
            );
        }
    }

    fn ask_credentials(&mut self, existing: &PartialNodeConfig) -> Result<Auth, ConfigureError> {
        let default_user = existing
            .rpc_user
            .clone()
            .unwrap_or_else(|| self.tool.daemon.rpc_user.clone());
        let rpc_user = loop {
            let user = self.prompter.input("RPC username", Some(default_user.as_str()))?;
            let user = user.trim();
            if !user.is_empty() && !user.contains(char::is_whitespace) {
                break user.to_string();
            }
            self.prompter
                .notice(NoticeLevel::Warning, "the username must be a single word");
        };

        let prompt = if existing.rpc_password.is_some() {
            "RPC password (leave empty to keep the current one)"
        } else {
            "RPC password (leave empty to generate one)"
        };
        let rpc_password = loop {
            let password = self.prompter.password(prompt)?;
            if password.is_empty() {
                break existing
                    .rpc_password
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(generate_password);
            }
            if !password.contains(|c: char| c.is_whitespace() || c == '#') {
                break Secret::new(password);
            }
            self.prompter.notice(
                NoticeLevel::Warning,
                "the password must not contain spaces or '#'",
            );
        };

        Ok(Auth {
            rpc_user,
            rpc_password,
        })
    }

    fn ask_keep_tx_index(&mut self) -> Result<bool, ConfigureError> {
        self.prompter.notice(
            NoticeLevel::Warning,
            &CompatibilityWarning::PrunedWithTxIndex.to_string(),
        );
        self.prompter
            .confirm("Keep the transaction index (txindex=1) on this pruned pool node?", true)
    }

    fn ask_pool_wallet(&mut self) -> Result<PoolWallet, ConfigureError> {
        let index = self
            .prompter
            .select("Pool payout wallet", &WALLET_ITEMS, 0)?;
        Ok(match index {
            1 => PoolWallet::existing(self.ask_address()?),
            2 => PoolWallet::deferred(),
            _ => PoolWallet::create(),
        })
    }

    fn ask_address(&mut self) -> Result<WalletAddress, ConfigureError> {
        loop {
            let answer = self.prompter.input("Payout address", None)?;
            if let Some(address) = WalletAddress::parse(&answer) {
                return Ok(address);
            }
            self.prompter.notice(
                NoticeLevel::Warning,
                "the address must start with L, M or ltc1",
            );
        }
    }
}

/// Paths for the node, following the data directory of an existing install
fn node_paths(tool: &ToolConfig, existing: &PartialNodeConfig) -> Paths {
    let mut paths = tool.paths.node_paths();
    if let Some(data_dir) = &existing.data_dir {
        let wallet_rel = paths
            .wallet_dir
            .strip_prefix(&paths.data_dir)
            .map_or_else(|_| PathBuf::from("wallets"), PathBuf::from);
        paths.wallet_dir = existing
            .wallet_dir
            .clone()
            .unwrap_or_else(|| data_dir.join(wallet_rel));
        paths.data_dir.clone_from(data_dir);
    }
    if let Some(dir) = existing.debug_log_file.as_ref().and_then(|f| f.parent()) {
        paths.log_dir = dir.to_path_buf();
    }
    paths
}

fn tuning(
    tool: &ToolConfig,
    role: Role,
    tx_index: bool,
    cpu_cores: u32,
    existing: &PartialNodeConfig,
) -> Tuning {
    let defaults = &tool.daemon_tuning;
    let role_default = match role {
        Role::Standard => defaults.max_connections_standard,
        Role::PoolBackend => defaults.max_connections_pool,
    };
    // A custom limit survives only while the role stays the same
    let max_connections = existing
        .max_connections
        .filter(|_| existing.role == Some(role))
        .unwrap_or(role_default);
    Tuning {
        tx_index,
        max_connections,
        db_cache_mb: existing.db_cache_mb.unwrap_or(defaults.db_cache_mb),
        par_threads: cpu_cores.max(1),
    }
}

/// Rebuild a model from an existing daemon config without asking anything
///
/// Used by modes that keep the current configuration. Keys the config does
/// not carry fall back to the tool defaults. The pool wallet is recorded as
/// deferred since its origin cannot be read back from the config.
#[must_use]
pub fn rehydrate(
    tool: &ToolConfig,
    existing: &PartialNodeConfig,
    software_version: &str,
    cpu_cores: u32,
) -> NodeConfig {
    let role = existing.role.unwrap_or(Role::Standard);
    let rpc_bind = existing
        .rpc_bind
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
    let has_zmq = existing.zmq_hashblock_port.is_some() || existing.zmq_rawblock_port.is_some();
    let notification = match (has_zmq, existing.block_notify.clone()) {
        (false, None) => Notification::None,
        (true, None) => Notification::Zmq,
        (false, Some(command)) => Notification::ScriptHook { command },
        (true, Some(command)) => Notification::Both { command },
    };
    let tx_index = existing.tx_index.unwrap_or(role == Role::PoolBackend);

    NodeConfig {
        role,
        chain_mode: existing.chain_mode.unwrap_or(ChainMode::Full),
        paths: node_paths(tool, existing),
        network: NetworkSettings {
            p2p_port: existing.p2p_port.unwrap_or(tool.network.p2p_port),
            rpc_port: existing.rpc_port.unwrap_or(tool.network.rpc_port),
            rpc_bind,
            rpc_allow: existing
                .rpc_allow
                .clone()
                .unwrap_or_else(|| NetworkSettings::allow_list_for(rpc_bind)),
            zmq_hashblock_port: existing.zmq_hashblock_port,
            zmq_rawblock_port: existing.zmq_rawblock_port,
        },
        auth: Auth {
            rpc_user: existing
                .rpc_user
                .clone()
                .unwrap_or_else(|| tool.daemon.rpc_user.clone()),
            rpc_password: existing
                .rpc_password
                .clone()
                .unwrap_or_else(|| Secret::new(String::new())),
        },
        notification,
        firewall_enabled: true,
        pool_wallet: (role == Role::PoolBackend).then(PoolWallet::deferred),
        software_version: software_version.to_string(),
        tuning: tuning(tool, role, tx_index, cpu_cores, existing),
    }
}
