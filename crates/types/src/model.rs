//! The node Configuration Model
//!
//! One [`NodeConfig`] value is built per run (defaults, rehydrated on-disk
//! settings, operator answers) and threaded through every step. Once the
//! operator confirms it, it is never mutated.

use crate::secret::Secret;
use crate::wallet::PoolWallet;
use nodectl_errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

/// Loopback allow-list entry used for pool backends and loopback binds.
pub const LOOPBACK_ALLOW: &str = "127.0.0.1";
/// Allow-list entry for a wildcard RPC bind.
pub const WILDCARD_ALLOW: &str = "0.0.0.0/0";

/// Node role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Standard,
    PoolBackend,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::PoolBackend => write!(f, "pool-backend"),
        }
    }
}

/// How much of the chain the daemon keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "size_mb")]
pub enum ChainMode {
    Full,
    Pruned(u32),
}

impl ChainMode {
    #[must_use]
    pub fn is_pruned(self) -> bool {
        matches!(self, Self::Pruned(_))
    }
}

impl fmt::Display for ChainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Pruned(mb) => write!(f, "pruned ({mb} MB)"),
        }
    }
}

/// Filesystem locations owned by the installation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paths {
    pub install_dir: PathBuf,
    pub data_dir: PathBuf,
    pub wallet_dir: PathBuf,
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
    pub source_dir: PathBuf,
}

impl Paths {
    fn named(&self) -> [(&'static str, &Path); 6] {
        [
            ("install_dir", &self.install_dir),
            ("data_dir", &self.data_dir),
            ("wallet_dir", &self.wallet_dir),
            ("config_dir", &self.config_dir),
            ("log_dir", &self.log_dir),
            ("source_dir", &self.source_dir),
        ]
    }

    /// Check absoluteness and the wallet-under-data invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violated path rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, path) in self.named() {
            if !path.is_absolute() {
                return Err(ConfigError::RelativePath {
                    field: field.to_string(),
                    path: path.display().to_string(),
                });
            }
        }
        if !self.wallet_dir.starts_with(&self.data_dir) {
            return Err(ConfigError::WalletOutsideDataDir {
                wallet_dir: self.wallet_dir.display().to_string(),
                data_dir: self.data_dir.display().to_string(),
            });
        }
        Ok(())
    }

    /// Location of the generated daemon config file.
    #[must_use]
    pub fn config_file(&self, file_name: &str) -> PathBuf {
        self.config_dir.join(file_name)
    }

    /// Location of the daemon's own debug log.
    #[must_use]
    pub fn debug_log_file(&self) -> PathBuf {
        self.log_dir.join("debug.log")
    }
}

/// Network settings of the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub p2p_port: u16,
    pub rpc_port: u16,
    pub rpc_bind: IpAddr,
    pub rpc_allow: Vec<String>,
    pub zmq_hashblock_port: Option<u16>,
    pub zmq_rawblock_port: Option<u16>,
}

impl NetworkSettings {
    #[must_use]
    pub fn rpc_bind_is_wildcard(&self) -> bool {
        self.rpc_bind.is_unspecified()
    }

    /// Every allow-list entry names a loopback address.
    #[must_use]
    pub fn allow_list_is_loopback(&self) -> bool {
        self.rpc_allow.iter().all(|entry| {
            let host = entry.split('/').next().unwrap_or_default();
            host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
        })
    }

    /// Allow list that matches a bind address.
    #[must_use]
    pub fn allow_list_for(bind: IpAddr) -> Vec<String> {
        if bind.is_unspecified() {
            vec![WILDCARD_ALLOW.to_string()]
        } else if bind.is_loopback() {
            vec![LOOPBACK_ALLOW.to_string()]
        } else {
            vec![bind.to_string()]
        }
    }

    /// The ZMQ publisher host; always local.
    #[must_use]
    pub fn zmq_host() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }
}

/// RPC credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    pub rpc_user: String,
    pub rpc_password: Secret,
}

/// How pool software learns about new blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum Notification {
    /// Pool polls over RPC; nothing to configure
    None,
    Zmq,
    ScriptHook { command: String },
    Both { command: String },
}

impl Notification {
    #[must_use]
    pub fn uses_zmq(&self) -> bool {
        matches!(self, Self::Zmq | Self::Both { .. })
    }

    #[must_use]
    pub fn hook_command(&self) -> Option<&str> {
        match self {
            Self::ScriptHook { command } | Self::Both { command } => Some(command),
            Self::None | Self::Zmq => None,
        }
    }
}

/// Daemon tuning derived from role and host resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuning {
    pub tx_index: bool,
    pub max_connections: u32,
    pub db_cache_mb: u32,
    pub par_threads: u32,
}

/// Advisories that do not invalidate a model but must be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityWarning {
    /// Pruning and the transaction index are enabled together; most daemons
    /// refuse to start with this combination.
    PrunedWithTxIndex,
}

impl fmt::Display for CompatibilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrunedWithTxIndex => write!(
                f,
                "pruned chain mode with txindex=1: the daemon may refuse to start"
            ),
        }
    }
}

/// The single source of truth for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub role: Role,
    pub chain_mode: ChainMode,
    pub paths: Paths,
    pub network: NetworkSettings,
    pub auth: Auth,
    pub notification: Notification,
    pub firewall_enabled: bool,
    pub pool_wallet: Option<PoolWallet>,
    pub software_version: String,
    pub tuning: Tuning,
}

impl NodeConfig {
    /// Check the model invariants.
    ///
    /// Hard rule violations are errors; combinations that are legal but
    /// risky come back as warnings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when an invariant does not hold.
    pub fn validate(&self) -> Result<Vec<CompatibilityWarning>, ConfigError> {
        self.paths.validate()?;

        if self.role == Role::PoolBackend {
            if !self.network.rpc_bind.is_loopback() {
                return Err(ConfigError::PoolBindNotLoopback {
                    address: self.network.rpc_bind.to_string(),
                });
            }
            if !self.network.allow_list_is_loopback() {
                return Err(ConfigError::PoolBindNotLoopback {
                    address: self.network.rpc_allow.join(","),
                });
            }
        } else if self.pool_wallet.is_some() {
            return Err(ConfigError::PoolWalletWithoutPoolRole);
        }

        if self.notification.uses_zmq()
            && (self.network.zmq_hashblock_port.is_none()
                || self.network.zmq_rawblock_port.is_none())
        {
            return Err(ConfigError::MissingField {
                field: "zmq ports".to_string(),
            });
        }

        if let Some(command) = self.notification.hook_command() {
            if !command.contains("%s") {
                return Err(ConfigError::InvalidValue {
                    field: "blocknotify".to_string(),
                    value: command.to_string(),
                });
            }
        }

        if self.auth.rpc_user.is_empty() || self.auth.rpc_password.is_empty() {
            return Err(ConfigError::MissingField {
                field: "rpc credentials".to_string(),
            });
        }

        let mut warnings = Vec::new();
        if self.chain_mode.is_pruned() && self.tuning.tx_index {
            warnings.push(CompatibilityWarning::PrunedWithTxIndex);
        }
        Ok(warnings)
    }

    /// Whether the firewall step should open the RPC port.
    #[must_use]
    pub fn exposes_rpc(&self) -> bool {
        self.firewall_enabled
            && self.role == Role::Standard
            && self.network.rpc_bind_is_wildcard()
    }

    /// Local RPC endpoint used by tooling on this host.
    #[must_use]
    pub fn local_rpc_url(&self) -> String {
        let host = if self.network.rpc_bind.is_unspecified() || self.network.rpc_bind.is_loopback()
        {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.network.rpc_bind
        };
        format!("http://{host}:{}", self.network.rpc_port)
    }
}
