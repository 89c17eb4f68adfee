//! The daemon's key=value configuration file

use nodectl_types::{ChainMode, NetworkSettings, NodeConfig, PartialNodeConfig, Role, Secret};
use std::fmt::Write as _;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Comment line that records the role, since not every role is inferable
/// from keys alone.
pub const ROLE_MARKER: &str = "# Role:";

/// Serialize a Configuration Model into the daemon config format.
///
/// `par` is derived from `tuning.par_threads`; `prune` is written only for a
/// pruned chain and `txindex` only when the index is enabled.
#[must_use]
pub fn render_daemon_config(config: &NodeConfig) -> String {
    let mut out = String::new();
    let net = &config.network;
    let paths = &config.paths;

    // writeln! into a String cannot fail
    let _ = writeln!(out, "# Generated by nodectl. Changes are overwritten on reconfigure.");
    let _ = writeln!(out, "{ROLE_MARKER} {}", config.role);
    let _ = writeln!(out, "# Chain: {}", config.chain_mode);
    out.push('\n');

    let _ = writeln!(out, "datadir={}", paths.data_dir.display());
    let _ = writeln!(out, "walletdir={}", paths.wallet_dir.display());
    let _ = writeln!(out, "listen=1");
    let _ = writeln!(out, "port={}", net.p2p_port);
    let _ = writeln!(out, "upnp=0");
    out.push('\n');

    let _ = writeln!(out, "server=1");
    let _ = writeln!(out, "rpcuser={}", config.auth.rpc_user);
    let _ = writeln!(out, "rpcpassword={}", config.auth.rpc_password.expose());
    let _ = writeln!(out, "rpcbind={}", net.rpc_bind);
    let _ = writeln!(out, "rpcport={}", net.rpc_port);
    for allow in &net.rpc_allow {
        let _ = writeln!(out, "rpcallowip={allow}");
    }
    out.push('\n');

    if config.tuning.tx_index {
        let _ = writeln!(out, "txindex=1");
    }
    let _ = writeln!(out, "maxconnections={}", config.tuning.max_connections);
    if config.notification.uses_zmq() {
        let host = NetworkSettings::zmq_host();
        if let Some(port) = net.zmq_hashblock_port {
            let _ = writeln!(out, "zmqpubhashblock=tcp://{host}:{port}");
        }
        if let Some(port) = net.zmq_rawblock_port {
            let _ = writeln!(out, "zmqpubrawblock=tcp://{host}:{port}");
        }
    }
    if let Some(command) = config.notification.hook_command() {
        let _ = writeln!(out, "blocknotify={command}");
    }
    if let ChainMode::Pruned(size_mb) = config.chain_mode {
        let _ = writeln!(out, "prune={size_mb}");
    }
    out.push('\n');

    let _ = writeln!(out, "logtimestamps=1");
    let _ = writeln!(out, "debuglogfile={}", paths.debug_log_file().display());
    let _ = writeln!(out, "dbcache={}", config.tuning.db_cache_mb);
    let _ = writeln!(out, "par={}", config.tuning.par_threads);
    out
}

fn parse_role(value: &str) -> Option<Role> {
    match value.trim() {
        "standard" => Some(Role::Standard),
        "pool-backend" => Some(Role::PoolBackend),
        _ => None,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// Port out of a `tcp://host:port` publisher URI
fn zmq_port(value: &str) -> Option<u16> {
    value
        .strip_prefix("tcp://")?
        .rsplit_once(':')
        .and_then(|(_, port)| port.parse().ok())
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Option<T> {
    let parsed = value.parse().ok();
    if parsed.is_none() {
        tracing::debug!(key, value, "ignoring unparseable config value");
    }
    parsed
}

/// Best-effort parse of an existing daemon config into a partial model.
///
/// Unknown keys and unparseable values are left unset. Role comes from the
/// role marker when present, otherwise from pool-only keys (`txindex=1`,
/// ZMQ publishers, `blocknotify`). Chain mode is `Pruned` when a non-zero
/// `prune` key exists and `Full` otherwise. Neither is inferred from an
/// empty file.
#[must_use]
pub fn parse_daemon_config(text: &str) -> PartialNodeConfig {
    let mut partial = PartialNodeConfig::default();
    let mut marker_role = None;
    let mut saw_key = false;
    let mut prune = None;
    let mut allow = Vec::new();

    for raw in text.lines() {
        let line = raw.trim();
        if let Some(rest) = line.strip_prefix(ROLE_MARKER) {
            marker_role = parse_role(rest);
            continue;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        // Section headers ([main], [test]) are not produced by nodectl
        if line.starts_with('[') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        saw_key = true;

        match key {
            "datadir" => partial.data_dir = Some(PathBuf::from(value)),
            "walletdir" => partial.wallet_dir = Some(PathBuf::from(value)),
            "debuglogfile" => partial.debug_log_file = Some(PathBuf::from(value)),
            "port" => partial.p2p_port = parse_value(key, value),
            "rpcport" => partial.rpc_port = parse_value(key, value),
            "rpcbind" => {
                // rpcbind may carry a port suffix
                let host = value
                    .parse::<IpAddr>()
                    .ok()
                    .or_else(|| value.rsplit_once(':').and_then(|(h, _)| h.parse().ok()));
                partial.rpc_bind = host;
            }
            "rpcallowip" => allow.push(value.to_string()),
            "rpcuser" => partial.rpc_user = Some(value.to_string()),
            "rpcpassword" => partial.rpc_password = Some(Secret::new(value)),
            "zmqpubhashblock" => partial.zmq_hashblock_port = zmq_port(value),
            "zmqpubrawblock" => partial.zmq_rawblock_port = zmq_port(value),
            "blocknotify" => partial.block_notify = Some(value.to_string()),
            "txindex" => partial.tx_index = parse_flag(value),
            "maxconnections" => partial.max_connections = parse_value(key, value),
            "dbcache" => partial.db_cache_mb = parse_value(key, value),
            "prune" => prune = parse_value::<u32>(key, value),
            _ => {}
        }
    }

    if !allow.is_empty() {
        partial.rpc_allow = Some(allow);
    }

    if saw_key {
        partial.chain_mode = Some(match prune {
            Some(size) if size > 0 => ChainMode::Pruned(size),
            _ => ChainMode::Full,
        });
        let pool_keys = partial.tx_index == Some(true)
            || partial.zmq_hashblock_port.is_some()
            || partial.zmq_rawblock_port.is_some()
            || partial.block_notify.is_some();
        partial.role = Some(marker_role.unwrap_or(if pool_keys {
            Role::PoolBackend
        } else {
            Role::Standard
        }));
    } else {
        partial.role = marker_role;
    }

    partial
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zmq_uri_port() {
        assert_eq!(zmq_port("tcp://127.0.0.1:28332"), Some(28332));
        assert_eq!(zmq_port("ipc:///tmp/x"), None);
    }

    #[test]
    fn rpcbind_with_port_suffix() {
        let partial = parse_daemon_config("rpcbind=127.0.0.1:9332\n");
        assert_eq!(partial.rpc_bind, Some("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn empty_file_infers_nothing() {
        assert!(parse_daemon_config("# only comments\n\n").is_empty());
    }
}
