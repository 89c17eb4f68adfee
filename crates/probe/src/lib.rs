#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Environment probe for nodectl
//!
//! Read-only checks of the host. No check here mutates anything, and none
//! fails the run: when something cannot be determined the result degrades
//! to a conservative value and a `ProbeEvent::CheckDegraded` is emitted.
//! Acting on the findings is left to the configurator and the dispatcher.

pub mod os;
pub mod resources;

use nodectl_artifacts::parse_daemon_config;
use nodectl_config::{constants, DaemonProfile, ToolConfig};
use nodectl_errors::ProbeError;
use nodectl_events::{AppEvent, EventEmitter, ProbeEvent};
use nodectl_net::{fetch_latest_tag, NetClient};
use nodectl_platform::{fs, Platform, PlatformCommand, PlatformContext};
use nodectl_types::{HostState, OsInfo, Resources};
use std::path::Path;

/// Outcome of the software version lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub version: String,
    /// Set when the remote lookup failed and the fallback was used
    pub fallback_reason: Option<String>,
}

/// Fail unless running as root.
///
/// # Errors
///
/// Returns [`ProbeError::InsufficientPrivileges`] for a non-root user.
pub fn require_root() -> Result<(), ProbeError> {
    if nix::unistd::geteuid().is_root() {
        Ok(())
    } else {
        Err(ProbeError::InsufficientPrivileges {
            message: "nodectl must run as root".to_string(),
        })
    }
}

/// Read-only view of the host through the platform seam
pub struct EnvironmentProbe<'a> {
    platform: &'a Platform,
    ctx: &'a PlatformContext,
    tool: &'a ToolConfig,
}

impl<'a> EnvironmentProbe<'a> {
    #[must_use]
    pub fn new(platform: &'a Platform, ctx: &'a PlatformContext, tool: &'a ToolConfig) -> Self {
        Self { platform, ctx, tool }
    }

    /// Identify the distribution from os-release
    pub async fn detect_os(&self) -> OsInfo {
        let path = &self.tool.paths.os_release;
        match tokio::fs::read_to_string(path).await {
            Ok(text) => os::classify_os(&os::parse_os_release(&text)),
            Err(e) => {
                self.ctx
                    .emit_check_degraded("os", format!("cannot read {}: {e}", path.display()));
                OsInfo {
                    is_supported_distro: false,
                    version_label: "unknown".to_string(),
                }
            }
        }
    }

    /// Measure CPU, memory and the filesystem that will hold `data_dir`
    pub async fn detect_resources(&self, data_dir: &Path) -> Resources {
        let data_dir = data_dir.to_path_buf();
        let measured = tokio::task::spawn_blocking(move || resources::measure(&data_dir)).await;
        match measured {
            Ok((resources, degraded)) => {
                for reason in degraded {
                    self.ctx.emit_check_degraded("resources", reason);
                }
                resources
            }
            Err(e) => {
                self.ctx.emit_check_degraded("resources", e.to_string());
                Resources {
                    cpu_cores: 1,
                    ram_mb: 0,
                    disk_free_gb: 0,
                    disk_is_rotational: false,
                }
            }
        }
    }

    /// Snapshot of installation artifacts, with a best-effort parse of an
    /// existing daemon config
    pub async fn detect_existing_install(&self) -> HostState {
        let profile = &self.tool.daemon;
        let paths = &self.tool.paths;

        let binary = self
            .tool
            .installed_binary(&paths.install_dir, &profile.daemon_binary);
        let config_path = self.tool.daemon_config_path();
        let unit_path = paths.unit_file(&profile.service_unit);

        let binary_present = fs::exists(&binary).await;
        let existing_config = match fs::read_optional(&config_path).await {
            Ok(Some(text)) => Some(parse_daemon_config(&text)),
            Ok(None) => None,
            Err(e) => {
                self.ctx.emit_check_degraded("config", e.to_string());
                None
            }
        };
        let config_present = fs::exists(&config_path).await;

        let service_registered = fs::exists(&unit_path).await
            || self
                .check(PlatformCommand::new("systemctl").args(["is-enabled", profile.service_unit.as_str()]))
                .await;
        let service_active = self
            .check(PlatformCommand::new("systemctl").args(["is-active", profile.service_unit.as_str()]))
            .await;
        let user_exists = self
            .check(PlatformCommand::new("id").args(["-u", profile.service_user.as_str()]))
            .await;

        HostState {
            binary_present,
            config_present,
            service_registered,
            service_active,
            user_exists,
            existing_config,
        }
    }

    async fn check(&self, cmd: PlatformCommand) -> bool {
        self.platform.succeeds(self.ctx, cmd).await
    }

    /// Resolve the daemon version to build
    ///
    /// A pinned version is returned as is. `"latest"` asks the release
    /// endpoint; any failure there falls back to the last-known-good
    /// version.
    pub async fn resolve_software_version(&self, client: Option<&NetClient>) -> ResolvedVersion {
        resolve_software_version(&self.tool.daemon, client, self.ctx).await
    }
}

/// Free-standing form of [`EnvironmentProbe::resolve_software_version`]
pub async fn resolve_software_version(
    profile: &DaemonProfile,
    client: Option<&NetClient>,
    emitter: &impl EventEmitter,
) -> ResolvedVersion {
    if profile.version != constants::LATEST {
        return ResolvedVersion {
            version: profile.version.clone(),
            fallback_reason: None,
        };
    }

    let lookup = match client {
        Some(client) => fetch_latest_tag(client, &profile.release_url)
            .await
            .map_err(|e| e.to_string()),
        None => Err("no HTTP client available".to_string()),
    };

    match lookup {
        Ok(version) => {
            emitter.emit(AppEvent::Probe(ProbeEvent::VersionResolved {
                version: version.clone(),
            }));
            ResolvedVersion {
                version,
                fallback_reason: None,
            }
        }
        Err(reason) => {
            tracing::warn!(%reason, fallback = %profile.fallback_version, "release lookup failed");
            emitter.emit(AppEvent::Probe(ProbeEvent::VersionFallback {
                requested: profile.version.clone(),
                fallback: profile.fallback_version.clone(),
                reason: reason.clone(),
            }));
            ResolvedVersion {
                version: profile.fallback_version.clone(),
                fallback_reason: Some(reason),
            }
        }
    }
}
