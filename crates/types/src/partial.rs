//! Settings recovered from an existing daemon config file

use crate::model::{ChainMode, Role};
use crate::secret::Secret;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// A partially known Configuration Model.
///
/// Every field is `None` when the corresponding key was absent from the
/// parsed file; nothing is defaulted at this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialNodeConfig {
    pub role: Option<Role>,
    pub chain_mode: Option<ChainMode>,
    pub data_dir: Option<PathBuf>,
    pub wallet_dir: Option<PathBuf>,
    pub debug_log_file: Option<PathBuf>,
    pub p2p_port: Option<u16>,
    pub rpc_port: Option<u16>,
    pub rpc_bind: Option<IpAddr>,
    pub rpc_allow: Option<Vec<String>>,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<Secret>,
    pub zmq_hashblock_port: Option<u16>,
    pub zmq_rawblock_port: Option<u16>,
    pub block_notify: Option<String>,
    pub tx_index: Option<bool>,
    pub max_connections: Option<u32>,
    pub db_cache_mb: Option<u32>,
}

impl PartialNodeConfig {
    /// True when nothing was recovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
