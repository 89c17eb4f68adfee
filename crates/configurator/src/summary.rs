//! Human-readable view of a resolved Configuration Model

use nodectl_types::{NodeConfig, Notification, PoolWalletMode};

/// Label/value rows describing `config`; the RPC password is masked
#[must_use]
pub fn summary_rows(config: &NodeConfig) -> Vec<(&'static str, String)> {
    let net = &config.network;
    let mut rows = vec![
        ("Role", config.role.to_string()),
        ("Chain", config.chain_mode.to_string()),
        ("Version", config.software_version.clone()),
        ("Install dir", config.paths.install_dir.display().to_string()),
        ("Data dir", config.paths.data_dir.display().to_string()),
        ("Wallet dir", config.paths.wallet_dir.display().to_string()),
        ("Config dir", config.paths.config_dir.display().to_string()),
        ("P2P port", net.p2p_port.to_string()),
        ("RPC", format!("{}:{}", net.rpc_bind, net.rpc_port)),
        ("RPC allow", net.rpc_allow.join(", ")),
        ("RPC user", config.auth.rpc_user.clone()),
        ("RPC password", config.auth.rpc_password.masked()),
        (
            "Notification",
            match &config.notification {
                Notification::None => "RPC polling".to_string(),
                Notification::Zmq => "ZMQ".to_string(),
                Notification::ScriptHook { command } => format!("blocknotify: {command}"),
                Notification::Both { command } => format!("ZMQ + blocknotify: {command}"),
            },
        ),
        ("Transaction index", on_off(config.tuning.tx_index)),
        ("Max connections", config.tuning.max_connections.to_string()),
        ("Firewall", on_off(config.firewall_enabled)),
    ];
    if let Some(wallet) = &config.pool_wallet {
        let value = match wallet.mode {
            PoolWalletMode::Create => "create during install".to_string(),
            PoolWalletMode::ExistingAddress => wallet
                .address
                .as_ref()
                .map_or_else(String::new, ToString::to_string),
            PoolWalletMode::Deferred => "set up later".to_string(),
        };
        rows.push(("Pool wallet", value));
    }
    rows
}

fn on_off(value: bool) -> String {
    if value { "enabled" } else { "disabled" }.to_string()
}

/// [`summary_rows`] as aligned plain text
#[must_use]
pub fn render_summary(config: &NodeConfig) -> String {
    let rows = summary_rows(config);
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("  {label:<width$}  {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
