//! systemd unit for the daemon

use nodectl_config::{DaemonProfile, ServiceConfig};
use nodectl_types::NodeConfig;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Inputs for the unit file
#[derive(Debug, Clone)]
pub struct UnitSpec<'a> {
    pub profile: &'a DaemonProfile,
    pub service: &'a ServiceConfig,
    pub config: &'a NodeConfig,
}

impl UnitSpec<'_> {
    fn binary(&self, name: &str) -> PathBuf {
        self.config.paths.install_dir.join("bin").join(name)
    }
}

/// Render the unit: restart on failure with a fixed backoff, a bounded stop
/// timeout, and a read-only system except for the data and log directories.
#[must_use]
pub fn render_service_unit(spec: &UnitSpec<'_>) -> String {
    let profile = spec.profile;
    let paths = &spec.config.paths;
    let conf = paths.config_file(&profile.config_file_name);
    let user = &profile.service_user;

    let mut out = String::new();
    let _ = writeln!(out, "[Unit]");
    let _ = writeln!(out, "Description={} daemon (managed by nodectl)", profile.display_name);
    let _ = writeln!(out, "After=network-online.target");
    let _ = writeln!(out, "Wants=network-online.target");
    out.push('\n');

    let _ = writeln!(out, "[Service]");
    let _ = writeln!(out, "Type=simple");
    let _ = writeln!(out, "User={user}");
    let _ = writeln!(out, "Group={user}");
    let _ = writeln!(
        out,
        "ExecStart={} -conf={} -printtoconsole=0",
        spec.binary(&profile.daemon_binary).display(),
        conf.display()
    );
    let _ = writeln!(
        out,
        "ExecStop={} -conf={} stop",
        spec.binary(&profile.cli_binary).display(),
        conf.display()
    );
    let _ = writeln!(out, "Restart=on-failure");
    let _ = writeln!(out, "RestartSec={}", spec.service.restart_sec);
    let _ = writeln!(out, "TimeoutStopSec={}", spec.service.timeout_stop_sec);
    out.push('\n');

    let _ = writeln!(out, "# Hardening");
    for line in [
        "NoNewPrivileges=true",
        "PrivateTmp=true",
        "PrivateDevices=true",
        "ProtectSystem=strict",
        "ProtectHome=true",
        "ProtectKernelTunables=true",
        "ProtectControlGroups=true",
        "MemoryDenyWriteExecute=true",
        "LimitNOFILE=8192",
    ] {
        let _ = writeln!(out, "{line}");
    }
    let _ = writeln!(
        out,
        "ReadWritePaths={} {}",
        paths.data_dir.display(),
        paths.log_dir.display()
    );
    out.push('\n');

    let _ = writeln!(out, "[Install]");
    let _ = writeln!(out, "WantedBy=multi-user.target");
    out
}
