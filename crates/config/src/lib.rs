#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Tool configuration for nodectl
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (/etc/nodectl/config.toml or `NODECTL_CONFIG`)
//! - Environment variables
//!
//! This is nodectl's own configuration. The daemon's config file is produced
//! by `nodectl-artifacts` from a `NodeConfig`.

pub mod constants;
pub mod core;

pub use self::core::{
    BuildConfig, DaemonProfile, HttpConfig, LegacyDbConfig, NetworkDefaults, PathConfig,
    ServiceConfig, Thresholds, TuningDefaults, WalletConfig,
};

use nodectl_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolConfig {
    #[serde(default)]
    pub daemon: DaemonProfile,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub network: NetworkDefaults,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub daemon_tuning: TuningDefaults,

    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

impl ToolConfig {
    /// Config file location, honouring `NODECTL_CONFIG`
    #[must_use]
    pub fn default_path() -> PathBuf {
        std::env::var_os(constants::ENV_CONFIG)
            .map_or_else(|| PathBuf::from(constants::CONFIG_PATH), PathBuf::from)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// A missing file at the default location is not an error. A file named
    /// explicitly through `NODECTL_CONFIG` must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or
    /// contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let explicit = std::env::var_os(constants::ENV_CONFIG).is_some();
        let config_path = Self::default_path();

        if explicit || config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading tool configuration");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load, merge the environment and validate in one go
    ///
    /// # Errors
    ///
    /// Returns an error if loading, merging or validation fails.
    pub async fn load_effective() -> Result<Self, Error> {
        let mut config = Self::load().await?;
        config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // NODECTL_VERSION
        if let Ok(version) = std::env::var(constants::ENV_VERSION) {
            if !is_version_request(&version) {
                return Err(ConfigError::InvalidValue {
                    field: constants::ENV_VERSION.to_string(),
                    value: version,
                }
                .into());
            }
            self.daemon.version = version;
        }

        // NODECTL_BUILD_JOBS
        if let Ok(jobs) = std::env::var(constants::ENV_BUILD_JOBS) {
            self.build.jobs = jobs.parse().map_err(|_| ConfigError::InvalidValue {
                field: constants::ENV_BUILD_JOBS.to_string(),
                value: jobs,
            })?;
        }

        // NODECTL_BIN_DIR
        if let Ok(dir) = std::env::var(constants::ENV_BIN_DIR) {
            self.paths.bin_dir = absolute_env_path(constants::ENV_BIN_DIR, dir)?;
        }

        // NODECTL_LOG_DIR
        if let Ok(dir) = std::env::var(constants::ENV_LOG_DIR) {
            self.paths.tool_log_dir = absolute_env_path(constants::ENV_LOG_DIR, dir)?;
        }

        Ok(())
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for relative paths, an unusable version
    /// request or an empty binary list.
    pub fn validate(&self) -> Result<(), Error> {
        self.paths.node_paths().validate()?;
        for (field, path) in self.paths.tool_paths() {
            if !path.is_absolute() {
                return Err(ConfigError::RelativePath {
                    field: field.to_string(),
                    path: path.display().to_string(),
                }
                .into());
            }
        }
        if !is_version_request(&self.daemon.version) {
            return Err(ConfigError::InvalidValue {
                field: "daemon.version".to_string(),
                value: self.daemon.version.clone(),
            }
            .into());
        }
        if !is_version_request(&self.daemon.fallback_version)
            || self.daemon.fallback_version == constants::LATEST
        {
            return Err(ConfigError::InvalidValue {
                field: "daemon.fallback_version".to_string(),
                value: self.daemon.fallback_version.clone(),
            }
            .into());
        }
        if self.daemon.binaries.is_empty() {
            return Err(ConfigError::MissingField {
                field: "daemon.binaries".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Full path of the generated daemon config for the default config dir
    #[must_use]
    pub fn daemon_config_path(&self) -> PathBuf {
        self.paths.config_dir.join(&self.daemon.config_file_name)
    }

    /// Installed location of a daemon executable
    #[must_use]
    pub fn installed_binary(&self, install_dir: &Path, binary: &str) -> PathBuf {
        install_dir.join("bin").join(binary)
    }

    /// Effective parallel build jobs
    #[must_use]
    pub fn build_jobs(&self) -> usize {
        calculate_build_jobs(self.build.jobs)
    }
}

/// `"latest"` or a semantic version with an optional leading `v`
#[must_use]
pub fn is_version_request(value: &str) -> bool {
    value == constants::LATEST || semver::Version::parse(value.trim_start_matches('v')).is_ok()
}

fn absolute_env_path(field: &str, value: String) -> Result<PathBuf, Error> {
    let path = PathBuf::from(&value);
    if path.is_absolute() {
        Ok(path)
    } else {
        Err(ConfigError::RelativePath {
            field: field.to_string(),
            path: value,
        }
        .into())
    }
}

/// Calculate build jobs based on CPU count
#[must_use]
pub fn calculate_build_jobs(config_value: usize) -> usize {
    if config_value > 0 {
        config_value // User override
    } else {
        // Use 75% of CPUs for builds, minimum 1
        let cpus = num_cpus::get();
        (cpus * 3 / 4).max(1)
    }
}
