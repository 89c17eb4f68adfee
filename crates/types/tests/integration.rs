//! Integration tests for types

#[cfg(test)]
mod tests {
    use nodectl_types::*;
    use proptest::prelude::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;

    fn sample_config(role: Role, chain_mode: ChainMode) -> NodeConfig {
        let bind = match role {
            Role::Standard => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Role::PoolBackend => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        NodeConfig {
            role,
            chain_mode,
            paths: Paths {
                install_dir: PathBuf::from("/opt/litecoin"),
                data_dir: PathBuf::from("/var/lib/litecoin"),
                wallet_dir: PathBuf::from("/var/lib/litecoin/wallets"),
                config_dir: PathBuf::from("/etc/litecoin"),
                log_dir: PathBuf::from("/var/log/litecoin"),
                source_dir: PathBuf::from("/usr/local/src/litecoin"),
            },
            network: NetworkSettings {
                p2p_port: 9333,
                rpc_port: 9332,
                rpc_bind: bind,
                rpc_allow: NetworkSettings::allow_list_for(bind),
                zmq_hashblock_port: None,
                zmq_rawblock_port: None,
            },
            auth: Auth {
                rpc_user: "litecoinrpc".into(),
                rpc_password: Secret::new("s3cretvalue"),
            },
            notification: Notification::None,
            firewall_enabled: true,
            pool_wallet: None,
            software_version: "v0.21.4".into(),
            tuning: Tuning {
                tx_index: role == Role::PoolBackend,
                max_connections: 125,
                db_cache_mb: 1000,
                par_threads: 4,
            },
        }
    }

    #[test]
    fn test_wallet_address_prefixes() {
        assert!(is_valid_wallet_address("LabcDEF123456789"));
        assert!(is_valid_wallet_address("Mabcdef456789"));
        assert!(is_valid_wallet_address("ltc1qexampleaddress"));
        assert!(!is_valid_wallet_address("1abcdef"));
        assert!(!is_valid_wallet_address(""));
        assert!(!is_valid_wallet_address("   "));
        assert!(WalletAddress::parse("bc1qnotlitecoin").is_none());
    }

    #[test]
    fn test_standard_config_is_valid() {
        let config = sample_config(Role::Standard, ChainMode::Full);
        assert_eq!(config.validate().unwrap(), vec![]);
        assert!(config.exposes_rpc());
    }

    #[test]
    fn test_pool_backend_requires_loopback_bind() {
        let mut config = sample_config(Role::PoolBackend, ChainMode::Full);
        config.network.rpc_bind = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_backend_requires_loopback_allow_list() {
        let mut config = sample_config(Role::PoolBackend, ChainMode::Full);
        config.network.rpc_allow = vec![WILDCARD_ALLOW.to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_wallet_only_for_pool_role() {
        let mut config = sample_config(Role::Standard, ChainMode::Full);
        config.pool_wallet = Some(PoolWallet::deferred());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wallet_dir_must_be_under_data_dir() {
        let mut config = sample_config(Role::Standard, ChainMode::Full);
        config.paths.wallet_dir = PathBuf::from("/srv/wallets");
        assert!(config.validate().is_err());

        config.paths.wallet_dir = PathBuf::from("relative/wallets");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pruned_pool_backend_surfaces_txindex_warning() {
        let config = sample_config(Role::PoolBackend, ChainMode::Pruned(4000));
        assert_eq!(
            config.validate().unwrap(),
            vec![CompatibilityWarning::PrunedWithTxIndex]
        );
        assert!(!config.exposes_rpc());
    }

    #[test]
    fn test_hook_command_needs_placeholder() {
        let mut config = sample_config(Role::PoolBackend, ChainMode::Full);
        config.notification = Notification::ScriptHook {
            command: "/usr/local/bin/notify".into(),
        };
        assert!(config.validate().is_err());
        config.notification = Notification::ScriptHook {
            command: "/usr/local/bin/notify %s".into(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_step_state_machine() {
        let mut record = StepRecord::pending(StepId::WriteConfigFile);
        assert!(record.transition(StepState::Succeeded).is_err());
        record.transition(StepState::Running).unwrap();
        assert!(record.started_at.is_some());
        record.transition(StepState::Succeeded).unwrap();
        assert!(record.transition(StepState::Pending).is_err());
        assert!(record.transition(StepState::Running).is_err());
    }

    #[test]
    fn test_step_criticality() {
        assert_eq!(StepId::InstallDependencies.criticality(), Criticality::Fatal);
        assert_eq!(StepId::WriteConfigFile.criticality(), Criticality::Fatal);
        assert_eq!(
            StepId::ProvisionPoolWallet.criticality(),
            Criticality::Advisory
        );
        assert_eq!(StepId::ConfigureFirewall.criticality(), Criticality::Advisory);
        assert!(StepId::ConfigureFirewall.remediation().is_some());
    }

    #[test]
    fn test_secret_not_serialized_in_debug() {
        let config = sample_config(Role::Standard, ChainMode::Full);
        assert!(!format!("{config:?}").contains("s3cretvalue"));
    }

    proptest! {
        #[test]
        fn pool_backend_never_exposes_rpc(
            pruned in any::<bool>(),
            firewall in any::<bool>(),
            size in 550u32..100_000,
        ) {
            let mode = if pruned { ChainMode::Pruned(size) } else { ChainMode::Full };
            let mut config = sample_config(Role::PoolBackend, mode);
            config.firewall_enabled = firewall;
            prop_assert!(config.validate().is_ok());
            prop_assert!(config.network.rpc_bind.is_loopback());
            prop_assert!(!config.exposes_rpc());
        }
    }
}
