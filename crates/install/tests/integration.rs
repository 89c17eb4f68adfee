//! Integration tests for the install crate

#[cfg(test)]
mod tests {
    use nodectl_artifacts::PoolCredentials;
    use nodectl_config::ToolConfig;
    use nodectl_events::{channel, AppEvent, EventReceiver, StepEvent, UninstallEvent};
    use nodectl_install::*;
    use nodectl_net::testing::FakeNode;
    use nodectl_platform::testing::FakeHost;
    use nodectl_platform::{CommandOutput, PlatformContext};
    use nodectl_types::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};

    const VERSION: &str = "v0.21.4";

    fn tool_in(root: &Path) -> ToolConfig {
        let mut tool = ToolConfig::default();
        let paths = &mut tool.paths;
        paths.install_dir = root.join("opt/litecoin");
        paths.data_dir = root.join("var/lib/litecoin");
        paths.wallet_dir = root.join("var/lib/litecoin/wallets");
        paths.config_dir = root.join("etc/litecoin");
        paths.log_dir = root.join("var/log/litecoin");
        paths.source_dir = root.join("usr/src/litecoin");
        paths.bin_dir = root.join("usr/local/bin");
        paths.unit_dir = root.join("etc/systemd/system");
        paths.tool_log_dir = root.join("var/log/nodectl");
        paths.lock_path = root.join("run/nodectl.lock");
        paths.temp_dir = root.join("tmp");
        paths.os_release = root.join("etc/os-release");
        tool.build.legacy_db.prefix = root.join("opt/db4");
        tool.build.critical_headers = vec![root.join("usr/include/boost/version.hpp")];
        tool.build.jobs = 2;
        tool.service.start_poll_attempts = 2;
        tool.service.start_poll_interval_secs = 0;
        tool.service.stop_grace_secs = 0;
        tool.wallet.ready_attempts = 5;
        tool.wallet.ready_backoff_secs = 0;
        tool
    }

    fn fixture() -> (TempDir, Arc<ToolConfig>) {
        let dir = tempdir().unwrap();
        let tool = tool_in(dir.path());
        for header in &tool.build.critical_headers {
            std::fs::create_dir_all(header.parent().unwrap()).unwrap();
            std::fs::write(header, b"").unwrap();
        }
        (dir, Arc::new(tool))
    }

    fn node_config(tool: &ToolConfig, role: Role, wallet: Option<PoolWallet>) -> NodeConfig {
        let bind = match role {
            Role::Standard => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Role::PoolBackend => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        NodeConfig {
            role,
            chain_mode: ChainMode::Full,
            paths: tool.paths.node_paths(),
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
                rpc_password: Secret::new("Zx9secretpw"),
            },
            notification: Notification::None,
            firewall_enabled: true,
            pool_wallet: wallet,
            software_version: VERSION.into(),
            tuning: Tuning {
                tx_index: role == Role::PoolBackend,
                max_connections: 125,
                db_cache_mb: 1000,
                par_threads: 4,
            },
        }
    }

    fn create_wallet() -> Option<PoolWallet> {
        Some(PoolWallet {
            mode: PoolWalletMode::Create,
            address: None,
        })
    }

    /// A host whose `make install` produces the artifacts a real build would.
    /// The wallet tool is never built so the symlink step has a gap to skip.
    fn build_host(tool: &ToolConfig) -> FakeHost {
        let marker = tool.build.legacy_db.marker_path();
        let bin = tool.paths.install_dir.join("bin");
        let binaries: Vec<String> = tool
            .daemon
            .binaries
            .iter()
            .filter(|b| *b != "litecoin-wallet")
            .cloned()
            .collect();
        let version_probe = format!("{} -version", bin.join("litecoind").display());
        FakeHost::new()
            .respond(
                &version_probe,
                CommandOutput::ok(format!("Litecoin Core Daemon version {VERSION}\n")),
            )
            .on("make install", move |cmd| {
                let legacy = cmd
                    .get_current_dir()
                    .is_some_and(|d| d.ends_with("build_unix"));
                if legacy {
                    std::fs::create_dir_all(marker.parent().unwrap()).unwrap();
                    std::fs::write(&marker, b"").unwrap();
                } else {
                    std::fs::create_dir_all(&bin).unwrap();
                    for name in &binaries {
                        std::fs::write(bin.join(name), b"").unwrap();
                    }
                }
            })
    }

    fn context(
        host: &FakeHost,
        tool: &Arc<ToolConfig>,
        config: NodeConfig,
        node: &FakeNode,
    ) -> InstallContext {
        InstallContext::new(
            host.platform(),
            PlatformContext::default(),
            tool.clone(),
            Arc::new(config),
        )
        .with_rpc(Arc::new(node.clone()))
    }

    fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            events.push(message.event);
        }
        events
    }

    fn mode_of(path: &Path) -> u32 {
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    fn state_of(report: &RunReport, id: StepId) -> StepState {
        report.record(id).unwrap().state
    }

    #[test]
    fn test_plans_per_mode() {
        let (_dir, tool) = fixture();
        let standard = node_config(&tool, Role::Standard, None);
        let pool = node_config(&tool, Role::PoolBackend, create_wallet());

        let fresh = plan_for(Mode::FreshInstall, &standard);
        assert_eq!(fresh.first(), Some(&StepId::InstallDependencies));
        assert_eq!(fresh.last(), Some(&StepId::StartService));
        assert!(!fresh.contains(&StepId::ProvisionPoolWallet));
        assert!(!fresh.contains(&StepId::StopService));

        let fresh_pool = plan_for(Mode::FreshInstall, &pool);
        let wallet = fresh_pool
            .iter()
            .position(|s| *s == StepId::ProvisionPoolWallet)
            .unwrap();
        let config = fresh_pool
            .iter()
            .position(|s| *s == StepId::WriteConfigFile)
            .unwrap();
        assert!(config < wallet);

        assert_eq!(
            plan_for(Mode::Update, &standard),
            vec![
                StepId::StopService,
                StepId::InstallDependencies,
                StepId::InstallLegacyDatabase,
                StepId::BuildAndInstallDaemon,
                StepId::CreateSymlinks,
                StepId::StartService,
            ]
        );
        assert_eq!(plan_for(Mode::Reconfigure, &standard).len(), 4);
        assert!(plan_for(Mode::WalletManagement, &standard).is_empty());
        assert_eq!(
            TaskGraph::for_mode(Mode::Reconfigure, &pool).step_ids(),
            plan_for(Mode::Reconfigure, &pool)
        );
    }

    #[tokio::test]
    async fn test_fresh_install_provisions_everything() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool).with_firewall_rule("22/tcp", None);
        let node = FakeNode::new();
        let cx = context(&host, &tool, node_config(&tool, Role::Standard, None), &node);

        let report = TaskGraph::for_mode(Mode::FreshInstall, &cx.config).run(&cx).await;

        assert!(report.succeeded(), "{report:?}");
        assert!(report.halted_at.is_none());
        assert!(report.warnings.is_empty());
        assert!(report
            .records
            .iter()
            .all(|r| r.state == StepState::Succeeded));

        assert!(host.user_exists("litecoin"));
        assert!(tool.build.legacy_db.marker_path().exists());
        // curl is in the dependency package list; wget is not
        assert_eq!(host.count("curl -fsSL -o"), 1);
        assert_eq!(host.count("wget"), 0);
        assert_eq!(mode_of(&cx.daemon_config_path()), 0o600);
        assert_eq!(mode_of(&tool.paths.wallet_dir), 0o700);
        let conf = std::fs::read_to_string(cx.daemon_config_path()).unwrap();
        assert!(conf.contains("rpcuser=litecoinrpc"));
        assert!(tool
            .paths
            .unit_file("litecoind.service")
            .exists());
        assert!(!cx.credentials_path().exists());

        let link = tool.paths.bin_dir.join("litecoind");
        assert_eq!(
            std::fs::read_link(&link).unwrap(),
            cx.installed_binary("litecoind")
        );
        assert!(!tool.paths.bin_dir.join("litecoin-wallet").exists());
        let symlinks = report.record(StepId::CreateSymlinks).unwrap();
        assert!(symlinks.note.as_deref().is_some_and(|n| n.contains("litecoin-wallet")));

        assert_eq!(
            host.firewall_rules(),
            vec!["22/tcp", "9333/tcp", "9332/tcp"]
        );
        assert!(host.unit_active("litecoind.service"));
        assert!(host.unit_enabled("litecoind.service"));
        assert_eq!(host.count("systemctl daemon-reload"), 1);
        assert!(host
            .calls()
            .iter()
            .any(|c| c.ends_with(&format!("checkout --force {VERSION}"))));
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool);
        let node = FakeNode::new();
        let cx = context(&host, &tool, node_config(&tool, Role::Standard, None), &node);
        let graph = TaskGraph::for_mode(Mode::FreshInstall, &cx.config);

        assert!(graph.run(&cx).await.succeeded());
        let again = graph.run(&cx).await;

        assert!(again.succeeded());
        for record in &again.records {
            if record.id == StepId::StartService {
                continue;
            }
            assert!(
                record.already_satisfied,
                "{} was not already satisfied: {:?}",
                record.id, record.note
            );
        }
        assert_eq!(host.count("useradd"), 1);
        assert_eq!(host.count("make install"), 2);
        assert_eq!(host.count("apt-get"), 0);
        assert_eq!(host.count("systemctl daemon-reload"), 1);
        assert_eq!(host.firewall_rules(), vec!["9333/tcp", "9332/tcp"]);
    }

    #[tokio::test]
    async fn test_missing_headers_trigger_package_install() {
        let (_dir, tool) = fixture();
        let header = tool.build.critical_headers[0].clone();
        std::fs::remove_file(&header).unwrap();
        let restored = header.clone();
        let host = build_host(&tool).on("apt-get install", move |_| {
            std::fs::write(&restored, b"").unwrap();
        });
        let node = FakeNode::new();
        let cx = context(&host, &tool, node_config(&tool, Role::Standard, None), &node);

        let report = TaskGraph::new(
            Mode::FreshInstall,
            vec![steps::step_for(StepId::InstallDependencies)],
        )
        .run(&cx)
        .await;

        assert!(report.succeeded());
        assert_eq!(host.count("apt-get update"), 1);
        let install = host
            .calls()
            .into_iter()
            .find(|c| c.starts_with("apt-get install"))
            .unwrap();
        assert!(install.contains("--no-install-recommends"));
        assert!(install.contains("libboost"));
    }

    #[tokio::test]
    async fn test_headers_still_missing_is_fatal() {
        let (_dir, tool) = fixture();
        std::fs::remove_file(&tool.build.critical_headers[0]).unwrap();
        let host = build_host(&tool);
        let node = FakeNode::new();
        let cx = context(&host, &tool, node_config(&tool, Role::Standard, None), &node);

        let report = TaskGraph::for_mode(Mode::FreshInstall, &cx.config).run(&cx).await;

        assert_eq!(report.halted_at, Some(StepId::InstallDependencies));
        let failure = report
            .record(StepId::InstallDependencies)
            .unwrap()
            .failure
            .clone()
            .unwrap();
        assert!(failure.reason.contains("version.hpp"));
    }

    #[tokio::test]
    async fn test_fatal_failure_halts_with_excerpt() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool).fail_on("make -j", 2, "db_cxx.h: error: compile failed");
        let node = FakeNode::new();
        let (tx, mut rx) = channel();
        let cx = InstallContext::new(
            host.platform(),
            PlatformContext::new(Some(tx), None),
            tool.clone(),
            Arc::new(node_config(&tool, Role::Standard, None)),
        )
        .with_rpc(Arc::new(node));

        let report = TaskGraph::for_mode(Mode::FreshInstall, &cx.config).run(&cx).await;

        assert!(!report.succeeded());
        assert_eq!(report.halted_at, Some(StepId::InstallLegacyDatabase));
        assert_eq!(
            state_of(&report, StepId::InstallLegacyDatabase),
            StepState::Failed
        );
        let failure = report
            .record(StepId::InstallLegacyDatabase)
            .unwrap()
            .failure
            .clone()
            .unwrap();
        assert!(failure.reason.contains("legacy database build"));
        assert_eq!(
            failure.log_excerpt,
            vec!["db_cxx.h: error: compile failed".to_string()]
        );
        assert_eq!(report.not_run().count(), 8);
        assert_eq!(host.count("useradd"), 0);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::Step(StepEvent::Failed {
                step: StepId::InstallLegacyDatabase,
                ..
            })
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::Step(StepEvent::GraphFinished {
                halted_at: Some(StepId::InstallLegacyDatabase),
                ..
            })
        )));
    }

    #[tokio::test]
    async fn test_advisory_failure_continues_with_remediation() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool).without_program("ufw");
        let node = FakeNode::new();
        let (tx, mut rx) = channel();
        let cx = InstallContext::new(
            host.platform(),
            PlatformContext::new(Some(tx), None),
            tool.clone(),
            Arc::new(node_config(&tool, Role::Standard, None)),
        )
        .with_rpc(Arc::new(node));

        let report = TaskGraph::for_mode(Mode::FreshInstall, &cx.config).run(&cx).await;

        assert!(report.succeeded());
        assert_eq!(
            state_of(&report, StepId::ConfigureFirewall),
            StepState::SkippedAdvisory
        );
        assert_eq!(state_of(&report, StepId::StartService), StepState::Succeeded);
        assert_eq!(report.advisory_gaps().count(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("ufw allow 9333/tcp"));

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::Step(StepEvent::AdvisoryFailed {
                step: StepId::ConfigureFirewall,
                remediation: Some(_),
                ..
            })
        )));
    }

    #[tokio::test]
    async fn test_slow_start_is_advisory() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool).respond(
            "systemctl is-active",
            CommandOutput::failed(3, "activating"),
        );
        let node = FakeNode::new();
        let cx = context(&host, &tool, node_config(&tool, Role::Standard, None), &node);

        let report = TaskGraph::for_mode(Mode::FreshInstall, &cx.config).run(&cx).await;

        assert!(report.succeeded());
        assert_eq!(
            state_of(&report, StepId::StartService),
            StepState::SkippedAdvisory
        );
        assert!(report.warnings[0].contains("systemctl status litecoind.service"));
    }

    #[tokio::test]
    async fn test_pool_wallet_is_created_through_rpc() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool);
        let node = FakeNode::new().warming_up(2);
        let cx = context(
            &host,
            &tool,
            node_config(&tool, Role::PoolBackend, create_wallet()),
            &node,
        );

        let report = TaskGraph::for_mode(Mode::FreshInstall, &cx.config).run(&cx).await;

        assert!(report.succeeded(), "{report:?}");
        assert_eq!(
            state_of(&report, StepId::ProvisionPoolWallet),
            StepState::Succeeded
        );
        assert_eq!(node.polls(), 3);
        assert_eq!(node.wallets(), vec!["pool".to_string()]);
        assert!(node.stopped());
        assert_eq!(node.endpoints(), vec!["http://127.0.0.1:9332".to_string()]);
        let start = host
            .calls()
            .into_iter()
            .find(|c| c.starts_with("runuser"))
            .unwrap();
        assert!(start.contains("-listen=0"));
        assert!(start.contains("-connect=0"));

        let path = cx.credentials_path();
        assert_eq!(mode_of(&path), 0o600);
        let creds = PoolCredentials::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(creds.wallet_name, "pool");
        assert_eq!(creds.wallet_address, node.addresses("pool").first().cloned());
        assert_eq!(creds.wallet_path, tool.paths.wallet_dir.join("pool"));

        // Pool nodes never open the RPC port
        assert_eq!(host.firewall_rules(), vec!["9333/tcp"]);

        let again = TaskGraph::for_mode(Mode::FreshInstall, &cx.config).run(&cx).await;
        assert!(again
            .record(StepId::ProvisionPoolWallet)
            .unwrap()
            .already_satisfied);
        assert_eq!(host.count("runuser"), 1);
    }

    #[tokio::test]
    async fn test_rejected_rpc_credentials_leave_advisory_gap() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool);
        let node = FakeNode::new().unauthorized();
        let cx = context(
            &host,
            &tool,
            node_config(&tool, Role::PoolBackend, create_wallet()),
            &node,
        );

        let report = TaskGraph::for_mode(Mode::FreshInstall, &cx.config).run(&cx).await;

        assert!(report.succeeded());
        assert_eq!(
            state_of(&report, StepId::ProvisionPoolWallet),
            StepState::SkippedAdvisory
        );
        assert_eq!(node.polls(), 1);
        assert!(report.warnings[0].contains("wallet management"));
        assert!(!cx.credentials_path().exists());
        assert!(host.unit_active("litecoind.service"));
    }

    #[tokio::test]
    async fn test_reconfigure_rewrites_config_and_credentials() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool);
        let node = FakeNode::new();
        let cx = context(&host, &tool, node_config(&tool, Role::Standard, None), &node);
        assert!(TaskGraph::for_mode(Mode::FreshInstall, &cx.config)
            .run(&cx)
            .await
            .succeeded());

        let address = WalletAddress::parse("ltc1qexternalpayout").unwrap();
        let pool = node_config(
            &tool,
            Role::PoolBackend,
            Some(PoolWallet {
                mode: PoolWalletMode::ExistingAddress,
                address: Some(address.clone()),
            }),
        );
        let cx = context(&host, &tool, pool, &node);
        let report = TaskGraph::for_mode(Mode::Reconfigure, &cx.config).run(&cx).await;

        assert!(report.succeeded());
        assert_eq!(
            report.records.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![
                StepId::StopService,
                StepId::WriteConfigFile,
                StepId::ConfigureFirewall,
                StepId::StartService,
            ]
        );
        assert!(!report.record(StepId::StopService).unwrap().already_satisfied);
        let conf = std::fs::read_to_string(cx.daemon_config_path()).unwrap();
        assert!(conf.contains("rpcbind=127.0.0.1"));
        let creds =
            PoolCredentials::parse(&std::fs::read_to_string(cx.credentials_path()).unwrap())
                .unwrap();
        assert_eq!(creds.wallet_address.as_deref(), Some(address.as_str()));
        assert_eq!(host.count("useradd"), 1);
        assert!(host.unit_active("litecoind.service"));

        let cx = context(&host, &tool, node_config(&tool, Role::Standard, None), &node);
        let report = TaskGraph::for_mode(Mode::Reconfigure, &cx.config).run(&cx).await;
        assert!(report.succeeded());
        assert!(!cx.credentials_path().exists());
    }

    async fn installed(host: &FakeHost, tool: &Arc<ToolConfig>) {
        let node = FakeNode::new();
        let cx = context(host, tool, node_config(tool, Role::Standard, None), &node);
        let report = TaskGraph::for_mode(Mode::FreshInstall, &cx.config).run(&cx).await;
        assert!(report.succeeded(), "{report:?}");

        let data = &tool.paths.data_dir;
        std::fs::create_dir_all(data.join("blocks")).unwrap();
        std::fs::write(data.join("blocks/blk00000.dat"), b"blocks").unwrap();
        std::fs::create_dir_all(tool.paths.wallet_dir.join("pool")).unwrap();
        std::fs::write(tool.paths.wallet_dir.join("pool/wallet.dat"), b"keys").unwrap();
        let tmp = &tool.paths.temp_dir;
        std::fs::create_dir_all(tmp.join("nodectl-build-1")).unwrap();
        std::fs::create_dir_all(tmp.join("db-4.8.30.NC")).unwrap();
        std::fs::write(tmp.join("keep-me"), b"").unwrap();
    }

    #[tokio::test]
    async fn test_uninstall_removes_everything() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool).with_firewall_rule("22/tcp", None);
        installed(&host, &tool).await;
        let (tx, mut rx) = channel();

        let report = Uninstaller::new(
            host.platform(),
            PlatformContext::new(Some(tx), None),
            tool.clone(),
        )
        .run(&UninstallOptions::new())
        .await;

        assert!(report.is_clean(), "{report:?}");
        assert!(!tool.paths.install_dir.exists());
        assert!(!tool.paths.data_dir.exists());
        assert!(!tool.paths.config_dir.exists());
        assert!(!tool.paths.log_dir.exists());
        assert!(!tool.build.legacy_db.prefix.exists());
        assert!(!tool.paths.unit_file("litecoind.service").exists());
        assert!(std::fs::symlink_metadata(tool.paths.bin_dir.join("litecoind")).is_err());
        assert!(!host.user_exists("litecoin"));
        assert!(!host.group_exists("litecoin"));
        assert!(!host.unit_active("litecoind.service"));
        assert!(!host.unit_enabled("litecoind.service"));
        assert_eq!(host.firewall_rules(), vec!["22/tcp"]);
        assert!(!tool.paths.temp_dir.join("nodectl-build-1").exists());
        assert!(!tool.paths.temp_dir.join("db-4.8.30.NC").exists());
        assert!(tool.paths.temp_dir.join("keep-me").exists());

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            AppEvent::Uninstall(UninstallEvent::Finished { residual: 0 })
        )));
    }

    #[tokio::test]
    async fn test_uninstall_keeps_wallets() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool);
        installed(&host, &tool).await;

        let report = Uninstaller::new(host.platform(), PlatformContext::default(), tool.clone())
            .run(&UninstallOptions::new().with_retention(DataRetention::KeepWallets))
            .await;

        assert!(report.is_clean(), "{report:?}");
        assert!(!tool.paths.data_dir.join("blocks").exists());
        assert!(tool.paths.wallet_dir.join("pool/wallet.dat").exists());
        assert!(!tool.paths.install_dir.exists());
    }

    #[tokio::test]
    async fn test_uninstall_keeps_blockchain() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool);
        installed(&host, &tool).await;

        let report = Uninstaller::new(host.platform(), PlatformContext::default(), tool.clone())
            .run(&UninstallOptions::new().with_retention(DataRetention::KeepAll))
            .await;

        assert!(report.is_clean());
        assert!(tool.paths.data_dir.join("blocks/blk00000.dat").exists());
        assert!(tool.paths.wallet_dir.join("pool/wallet.dat").exists());
        assert!(!host.user_exists("litecoin"));
    }

    #[tokio::test]
    async fn test_uninstall_escalates_shutdown() {
        let (_dir, tool) = fixture();
        let host = FakeHost::new()
            .with_user("litecoin")
            .with_active_unit("litecoind.service")
            .with_process("litecoind", "litecoin");
        let node = FakeNode::new();

        let report = Uninstaller::new(host.platform(), PlatformContext::default(), tool.clone())
            .with_rpc(Arc::new(node.clone()))
            .run(&UninstallOptions::new())
            .await;

        assert!(node.stopped());
        assert_eq!(host.process_count(), 0);
        assert_eq!(host.count("systemctl stop"), 1);
        assert_eq!(host.count("pkill -TERM -x litecoind"), 1);
        assert_eq!(host.count("pkill -KILL -x litecoind"), 0);
        assert!(report.removed.contains(&"stop daemon".to_string()));
        assert!(!host.user_exists("litecoin"));
    }

    #[tokio::test]
    async fn test_uninstall_reports_failures_and_residue() {
        let (_dir, tool) = fixture();
        let host = build_host(&tool).fail_on("userdel", 8, "userdel: user litecoin is currently used");
        installed(&host, &tool).await;

        let report = Uninstaller::new(host.platform(), PlatformContext::default(), tool.clone())
            .run(&UninstallOptions::new())
            .await;

        assert!(!report.is_clean());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "remove service user");
        assert_eq!(report.residual, vec!["user litecoin".to_string()]);
        // Later actions still ran
        assert!(!tool.paths.temp_dir.join("nodectl-build-1").exists());
    }

    #[tokio::test]
    async fn test_uninstall_follows_existing_config_paths() {
        let (dir, tool) = fixture();
        let custom = dir.path().join("srv/chain");
        std::fs::create_dir_all(custom.join("blocks")).unwrap();
        let host = FakeHost::new().with_firewall_rule("19333/tcp", Some("nodectl-litecoin"));
        let existing = PartialNodeConfig {
            data_dir: Some(custom.clone()),
            wallet_dir: Some(custom.join("wallets")),
            p2p_port: Some(19333),
            ..PartialNodeConfig::default()
        };

        let uninstaller =
            Uninstaller::new(host.platform(), PlatformContext::default(), tool.clone())
                .with_existing(&existing);
        assert_eq!(uninstaller.paths().data_dir, custom);
        let report = uninstaller.run(&UninstallOptions::new()).await;

        assert!(report.is_clean(), "{report:?}");
        assert!(!custom.exists());
        assert!(host.firewall_rules().is_empty());
    }
}
