//! Read-only host snapshots produced by the environment probe

use crate::partial::PartialNodeConfig;
use serde::{Deserialize, Serialize};

/// Operating system identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsInfo {
    pub is_supported_distro: bool,
    pub version_label: String,
}

/// Host capacity relevant to running a full node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub cpu_cores: u32,
    pub ram_mb: u64,
    pub disk_free_gb: u64,
    pub disk_is_rotational: bool,
}

/// Installation artifacts found on the host. Recomputed every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostState {
    pub binary_present: bool,
    pub config_present: bool,
    pub service_registered: bool,
    pub service_active: bool,
    pub user_exists: bool,
    pub existing_config: Option<PartialNodeConfig>,
}

impl HostState {
    /// Whether a previous installation left anything behind.
    #[must_use]
    pub fn has_existing_install(&self) -> bool {
        self.binary_present || self.config_present || self.service_registered
    }
}
