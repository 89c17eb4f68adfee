//! Configuration sections shared across crates

use nodectl_types::Paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything specific to the daemon being installed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonProfile {
    #[serde(default = "default_daemon_name")]
    pub name: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_service_user")]
    pub service_user: String,
    #[serde(default = "default_daemon_binary")]
    pub daemon_binary: String,
    #[serde(default = "default_cli_binary")]
    pub cli_binary: String,
    /// Every executable the build installs and the symlink step links.
    #[serde(default = "default_binaries")]
    pub binaries: Vec<String>,
    #[serde(default = "default_repository_url")]
    pub repository_url: String,
    #[serde(default = "default_release_url")]
    pub release_url: String,
    /// Pinned tag or `"latest"`
    #[serde(default = "default_version")]
    pub version: String,
    /// Last-known-good tag used when the release lookup fails
    #[serde(default = "default_fallback_version")]
    pub fallback_version: String,
    #[serde(default = "default_config_file_name")]
    pub config_file_name: String,
    #[serde(default = "default_service_unit")]
    pub service_unit: String,
    #[serde(default = "default_rpc_user")]
    pub rpc_user: String,
    #[serde(default = "default_configure_flags")]
    pub configure_flags: Vec<String>,
}

impl Default for DaemonProfile {
    fn default() -> Self {
        Self {
            name: default_daemon_name(),
            display_name: default_display_name(),
            service_user: default_service_user(),
            daemon_binary: default_daemon_binary(),
            cli_binary: default_cli_binary(),
            binaries: default_binaries(),
            repository_url: default_repository_url(),
            release_url: default_release_url(),
            version: default_version(),
            fallback_version: default_fallback_version(),
            config_file_name: default_config_file_name(),
            service_unit: default_service_unit(),
            rpc_user: default_rpc_user(),
            configure_flags: default_configure_flags(),
        }
    }
}

/// Default locations for the Configuration Model paths and the tool's own files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_wallet_dir")]
    pub wallet_dir: PathBuf,
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Where convenience symlinks are placed
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,
    #[serde(default = "default_unit_dir")]
    pub unit_dir: PathBuf,
    /// nodectl's own logs (command log, debug JSON log)
    #[serde(default = "default_tool_log_dir")]
    pub tool_log_dir: PathBuf,
    #[serde(default = "default_lock_path")]
    pub lock_path: PathBuf,
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    #[serde(default = "default_os_release")]
    pub os_release: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            install_dir: default_install_dir(),
            data_dir: default_data_dir(),
            wallet_dir: default_wallet_dir(),
            config_dir: default_config_dir(),
            log_dir: default_log_dir(),
            source_dir: default_source_dir(),
            bin_dir: default_bin_dir(),
            unit_dir: default_unit_dir(),
            tool_log_dir: default_tool_log_dir(),
            lock_path: default_lock_path(),
            temp_dir: default_temp_dir(),
            os_release: default_os_release(),
        }
    }
}

impl PathConfig {
    /// Default path set for a new Configuration Model
    #[must_use]
    pub fn node_paths(&self) -> Paths {
        Paths {
            install_dir: self.install_dir.clone(),
            data_dir: self.data_dir.clone(),
            wallet_dir: self.wallet_dir.clone(),
            config_dir: self.config_dir.clone(),
            log_dir: self.log_dir.clone(),
            source_dir: self.source_dir.clone(),
        }
    }

    /// Path of the generated service unit
    #[must_use]
    pub fn unit_file(&self, unit: &str) -> PathBuf {
        self.unit_dir.join(unit)
    }

    /// Tool-managed directories that must be absolute
    #[must_use]
    pub fn tool_paths(&self) -> [(&'static str, &Path); 5] {
        [
            ("bin_dir", &self.bin_dir),
            ("unit_dir", &self.unit_dir),
            ("tool_log_dir", &self.tool_log_dir),
            ("lock_path", &self.lock_path),
            ("temp_dir", &self.temp_dir),
        ]
    }
}

/// Default ports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDefaults {
    #[serde(default = "default_p2p_port")]
    pub p2p_port: u16,
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,
    #[serde(default = "default_zmq_hashblock_port")]
    pub zmq_hashblock_port: u16,
    #[serde(default = "default_zmq_rawblock_port")]
    pub zmq_rawblock_port: u16,
}

impl Default for NetworkDefaults {
    fn default() -> Self {
        Self {
            p2p_port: default_p2p_port(),
            rpc_port: default_rpc_port(),
            zmq_hashblock_port: default_zmq_hashblock_port(),
            zmq_rawblock_port: default_zmq_rawblock_port(),
        }
    }
}

/// The legacy database library built from source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyDbConfig {
    #[serde(default = "default_legacy_db_version")]
    pub version: String,
    #[serde(default = "default_legacy_db_url")]
    pub url: String,
    #[serde(default = "default_legacy_db_prefix")]
    pub prefix: PathBuf,
    /// Relative to `prefix`; its presence means the library is installed
    #[serde(default = "default_legacy_db_marker")]
    pub marker: PathBuf,
}

impl Default for LegacyDbConfig {
    fn default() -> Self {
        Self {
            version: default_legacy_db_version(),
            url: default_legacy_db_url(),
            prefix: default_legacy_db_prefix(),
            marker: default_legacy_db_marker(),
        }
    }
}

impl LegacyDbConfig {
    #[must_use]
    pub fn marker_path(&self) -> PathBuf {
        self.prefix.join(&self.marker)
    }

    /// Name of the unpacked source directory
    #[must_use]
    pub fn source_dir_name(&self) -> String {
        format!("db-{}.NC", self.version)
    }
}

/// Build settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Parallel make jobs; 0 = auto-detect
    #[serde(default = "default_build_jobs")]
    pub jobs: usize,
    #[serde(default)]
    pub legacy_db: LegacyDbConfig,
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,
    /// Files that must exist once packages are installed
    #[serde(default = "default_critical_headers")]
    pub critical_headers: Vec<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            jobs: default_build_jobs(),
            legacy_db: LegacyDbConfig::default(),
            packages: default_packages(),
            critical_headers: default_critical_headers(),
        }
    }
}

/// Resource gates applied by the configurator
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_disk_hard_full_gb")]
    pub disk_hard_full_gb: u64,
    #[serde(default = "default_disk_hard_pruned_gb")]
    pub disk_hard_pruned_gb: u64,
    #[serde(default = "default_disk_recommended_full_gb")]
    pub disk_recommended_full_gb: u64,
    #[serde(default = "default_disk_recommended_pruned_gb")]
    pub disk_recommended_pruned_gb: u64,
    #[serde(default = "default_ram_hard_mb")]
    pub ram_hard_mb: u64,
    #[serde(default = "default_ram_recommended_mb")]
    pub ram_recommended_mb: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            disk_hard_full_gb: default_disk_hard_full_gb(),
            disk_hard_pruned_gb: default_disk_hard_pruned_gb(),
            disk_recommended_full_gb: default_disk_recommended_full_gb(),
            disk_recommended_pruned_gb: default_disk_recommended_pruned_gb(),
            ram_hard_mb: default_ram_hard_mb(),
            ram_recommended_mb: default_ram_recommended_mb(),
        }
    }
}

impl Thresholds {
    #[must_use]
    pub fn disk_hard_gb(&self, pruned: bool) -> u64 {
        if pruned {
            self.disk_hard_pruned_gb
        } else {
            self.disk_hard_full_gb
        }
    }

    #[must_use]
    pub fn disk_recommended_gb(&self, pruned: bool) -> u64 {
        if pruned {
            self.disk_recommended_pruned_gb
        } else {
            self.disk_recommended_full_gb
        }
    }
}

/// Daemon tuning defaults
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TuningDefaults {
    #[serde(default = "default_db_cache_mb")]
    pub db_cache_mb: u32,
    #[serde(default = "default_max_connections_standard")]
    pub max_connections_standard: u32,
    #[serde(default = "default_max_connections_pool")]
    pub max_connections_pool: u32,
    #[serde(default = "default_prune_size_mb")]
    pub prune_size_mb: u32,
}

impl Default for TuningDefaults {
    fn default() -> Self {
        Self {
            db_cache_mb: default_db_cache_mb(),
            max_connections_standard: default_max_connections_standard(),
            max_connections_pool: default_max_connections_pool(),
            prune_size_mb: default_prune_size_mb(),
        }
    }
}

/// Pool wallet provisioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default = "default_wallet_name")]
    pub name: String,
    #[serde(default = "default_credential_file_name")]
    pub credential_file_name: String,
    /// Readiness polls before giving up on the temporary daemon
    #[serde(default = "default_ready_attempts")]
    pub ready_attempts: u32,
    #[serde(default = "default_ready_backoff_secs")]
    pub ready_backoff_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            name: default_wallet_name(),
            credential_file_name: default_credential_file_name(),
            ready_attempts: default_ready_attempts(),
            ready_backoff_secs: default_ready_backoff_secs(),
        }
    }
}

/// Service unit and service-control timing
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_restart_sec")]
    pub restart_sec: u64,
    #[serde(default = "default_timeout_stop_sec")]
    pub timeout_stop_sec: u64,
    #[serde(default = "default_start_poll_attempts")]
    pub start_poll_attempts: u32,
    #[serde(default = "default_start_poll_interval_secs")]
    pub start_poll_interval_secs: u64,
    /// Wait after each stop escalation before checking again
    #[serde(default = "default_stop_grace_secs")]
    pub stop_grace_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            restart_sec: default_restart_sec(),
            timeout_stop_sec: default_timeout_stop_sec(),
            start_poll_attempts: default_start_poll_attempts(),
            start_poll_interval_secs: default_start_poll_interval_secs(),
            stop_grace_secs: default_stop_grace_secs(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

// Default value functions for serde
fn default_daemon_name() -> String {
    "litecoin".to_string()
}

fn default_display_name() -> String {
    "Litecoin Core".to_string()
}

fn default_service_user() -> String {
    "litecoin".to_string()
}

fn default_daemon_binary() -> String {
    "litecoind".to_string()
}

fn default_cli_binary() -> String {
    "litecoin-cli".to_string()
}

fn default_binaries() -> Vec<String> {
    ["litecoind", "litecoin-cli", "litecoin-tx", "litecoin-wallet"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_repository_url() -> String {
    "https://github.com/litecoin-project/litecoin.git".to_string()
}

fn default_release_url() -> String {
    "https://api.github.com/repos/litecoin-project/litecoin/releases/latest".to_string()
}

fn default_version() -> String {
    crate::constants::LATEST.to_string()
}

fn default_fallback_version() -> String {
    "v0.21.4".to_string()
}

fn default_config_file_name() -> String {
    "litecoin.conf".to_string()
}

fn default_service_unit() -> String {
    "litecoind.service".to_string()
}

fn default_rpc_user() -> String {
    "litecoinrpc".to_string()
}

fn default_configure_flags() -> Vec<String> {
    ["--without-gui", "--disable-tests", "--disable-bench"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_install_dir() -> PathBuf {
    PathBuf::from("/opt/litecoin")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/litecoin")
}

fn default_wallet_dir() -> PathBuf {
    PathBuf::from("/var/lib/litecoin/wallets")
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("/etc/litecoin")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/litecoin")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("/usr/local/src/litecoin")
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from("/usr/local/bin")
}

fn default_unit_dir() -> PathBuf {
    PathBuf::from("/etc/systemd/system")
}

fn default_tool_log_dir() -> PathBuf {
    PathBuf::from("/var/log/nodectl")
}

fn default_lock_path() -> PathBuf {
    PathBuf::from("/run/nodectl.lock")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

fn default_os_release() -> PathBuf {
    PathBuf::from(crate::constants::OS_RELEASE_PATH)
}

fn default_p2p_port() -> u16 {
    9333
}

fn default_rpc_port() -> u16 {
    9332
}

fn default_zmq_hashblock_port() -> u16 {
    28332
}

fn default_zmq_rawblock_port() -> u16 {
    28333
}

fn default_legacy_db_version() -> String {
    "4.8.30".to_string()
}

fn default_legacy_db_url() -> String {
    "https://download.oracle.com/berkeley-db/db-4.8.30.NC.tar.gz".to_string()
}

fn default_legacy_db_prefix() -> PathBuf {
    PathBuf::from("/opt/db4")
}

fn default_legacy_db_marker() -> PathBuf {
    PathBuf::from("lib/libdb_cxx-4.8.a")
}

fn default_build_jobs() -> usize {
    4
}

fn default_packages() -> Vec<String> {
    [
        "build-essential",
        "libtool",
        "autotools-dev",
        "automake",
        "pkg-config",
        "bsdmainutils",
        "python3",
        "libssl-dev",
        "libevent-dev",
        "libboost-system-dev",
        "libboost-filesystem-dev",
        "libboost-thread-dev",
        "libboost-program-options-dev",
        "libboost-test-dev",
        "libzmq3-dev",
        "libminiupnpc-dev",
        "libfmt-dev",
        "git",
        "curl",
        "ufw",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_critical_headers() -> Vec<PathBuf> {
    [
        "/usr/include/boost/version.hpp",
        "/usr/include/event2/event.h",
        "/usr/include/openssl/ssl.h",
        "/usr/include/zmq.h",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

fn default_disk_hard_full_gb() -> u64 {
    150
}

fn default_disk_hard_pruned_gb() -> u64 {
    20
}

fn default_disk_recommended_full_gb() -> u64 {
    250
}

fn default_disk_recommended_pruned_gb() -> u64 {
    50
}

fn default_ram_hard_mb() -> u64 {
    4096
}

fn default_ram_recommended_mb() -> u64 {
    8192
}

fn default_db_cache_mb() -> u32 {
    1000
}

fn default_max_connections_standard() -> u32 {
    125
}

fn default_max_connections_pool() -> u32 {
    256
}

fn default_prune_size_mb() -> u32 {
    4000
}

fn default_wallet_name() -> String {
    "pool".to_string()
}

fn default_credential_file_name() -> String {
    "pool-wallet.conf".to_string()
}

fn default_ready_attempts() -> u32 {
    30
}

fn default_ready_backoff_secs() -> u64 {
    2
}

fn default_restart_sec() -> u64 {
    30
}

fn default_timeout_stop_sec() -> u64 {
    600
}

fn default_start_poll_attempts() -> u32 {
    5
}

fn default_start_poll_interval_secs() -> u64 {
    2
}

fn default_stop_grace_secs() -> u64 {
    10
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1 // 1 second
}
