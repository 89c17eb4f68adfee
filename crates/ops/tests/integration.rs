//! Integration tests for ops crate

#[cfg(test)]
mod tests {
    use nodectl_artifacts::PoolCredentials;
    use nodectl_config::ToolConfig;
    use nodectl_configurator::{Answer, NoticeLevel, ScriptedPrompter};
    use nodectl_errors::{Error, OpsError, ProbeError, RpcError};
    use nodectl_events::{channel, AppEvent, EventReceiver, GeneralEvent};
    use nodectl_net::testing::FakeNode;
    use nodectl_net::NodeRpc;
    use nodectl_ops::*;
    use nodectl_platform::testing::FakeHost;
    use nodectl_platform::CommandOutput;
    use nodectl_probe::ResolvedVersion;
    use nodectl_types::*;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::{tempdir, TempDir};

    const VERSION: &str = "v0.21.4";
    const UBUNTU: &str = "NAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nID=ubuntu\nPRETTY_NAME=\"Ubuntu 22.04.4 LTS\"\n";

    fn tool_in(root: &Path) -> ToolConfig {
        let mut tool = ToolConfig::default();
        tool.daemon.version = VERSION.to_string();
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
        tool.wallet.ready_attempts = 3;
        tool.wallet.ready_backoff_secs = 0;
        tool
    }

    fn fixture(os_release: &str) -> (TempDir, Arc<ToolConfig>) {
        let dir = tempdir().unwrap();
        let tool = tool_in(dir.path());
        for header in &tool.build.critical_headers {
            std::fs::create_dir_all(header.parent().unwrap()).unwrap();
            std::fs::write(header, b"").unwrap();
        }
        std::fs::create_dir_all(tool.paths.os_release.parent().unwrap()).unwrap();
        std::fs::write(&tool.paths.os_release, os_release).unwrap();
        (dir, Arc::new(tool))
    }

    /// A host whose `make install` produces the artifacts a real build would
    fn build_host(tool: &ToolConfig) -> FakeHost {
        let marker = tool.build.legacy_db.marker_path();
        let bin = tool.paths.install_dir.join("bin");
        let binaries = tool.daemon.binaries.clone();
        let version_probe = format!("{} -version", bin.join("litecoind").display());
        FakeHost::new()
            .respond(
                &version_probe,
                CommandOutput::ok(format!("Litecoin Core Daemon version {VERSION}\n")),
            )
            .on("make install", move |cmd| {
                if cmd
                    .get_current_dir()
                    .is_some_and(|d| d.ends_with("build_unix"))
                {
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

    fn context(host: &FakeHost, tool: &Arc<ToolConfig>, node: &FakeNode) -> (OpsCtx, EventReceiver) {
        let (tx, rx) = channel();
        let ctx = OpsContextBuilder::new()
            .with_platform(host.platform())
            .with_tool_config(tool.clone())
            .with_event_sender(tx)
            .with_rpc_connector(Arc::new(node.clone()))
            .build()
            .unwrap();
        (ctx, rx)
    }

    fn roomy() -> Resources {
        Resources {
            cpu_cores: 4,
            ram_mb: 16_384,
            disk_free_gb: 1_000,
            disk_is_rotational: false,
        }
    }

    fn fresh_survey() -> Survey {
        Survey {
            os: OsInfo {
                is_supported_distro: true,
                version_label: "Ubuntu 22.04.4 LTS".into(),
            },
            resources: roomy(),
            host: HostState::default(),
            version: ResolvedVersion {
                version: VERSION.into(),
                fallback_reason: None,
            },
        }
    }

    fn installed_survey(existing: PartialNodeConfig) -> Survey {
        Survey {
            host: HostState {
                binary_present: true,
                config_present: true,
                existing_config: Some(existing),
                ..HostState::default()
            },
            ..fresh_survey()
        }
    }

    fn standard_wildcard_answers() -> Vec<Answer> {
        vec![
            Answer::Default,   // role: standard
            Answer::Default,   // chain: full
            Answer::Select(1), // bind: wildcard
            Answer::Default,   // rpc user
            Answer::Default,   // password: generate
            Answer::Default,   // firewall
            Answer::Confirm(true),
        ]
    }

    fn general_events(rx: &mut EventReceiver) -> Vec<GeneralEvent> {
        let mut events = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::General(event) = message.event {
                events.push(event);
            }
        }
        events
    }

    #[test]
    fn test_context_builder_requires_components() {
        let (tx, _rx) = channel();
        let missing_tool = OpsContextBuilder::new().with_event_sender(tx).build();
        assert!(matches!(
            missing_tool,
            Err(Error::Ops(OpsError::MissingComponent { component })) if component == "tool_config"
        ));

        let missing_tx = OpsContextBuilder::new()
            .with_tool_config(Arc::new(ToolConfig::default()))
            .build();
        assert!(matches!(
            missing_tx,
            Err(Error::Ops(OpsError::MissingComponent { component })) if component == "event_sender"
        ));
    }

    #[test]
    fn test_modes_offered_per_host() {
        assert_eq!(
            available_modes(&HostState::default()),
            vec![Mode::FreshInstall, Mode::Exit]
        );
        let installed = HostState {
            service_registered: true,
            ..HostState::default()
        };
        assert_eq!(
            available_modes(&installed),
            vec![
                Mode::Update,
                Mode::Reconfigure,
                Mode::FreshInstall,
                Mode::WalletManagement,
                Mode::Exit
            ]
        );
    }

    #[tokio::test]
    async fn test_survey_rejects_unsupported_os() {
        let (_dir, tool) = fixture("ID=fedora\nVERSION_ID=40\nPRETTY_NAME=\"Fedora Linux 40\"\n");
        let host = FakeHost::new();
        let (ctx, _rx) = context(&host, &tool, &FakeNode::new());

        match survey(&ctx).await {
            Err(Error::Probe(ProbeError::UnsupportedOs { label })) => {
                assert_eq!(label, "Fedora Linux 40");
            }
            other => panic!("expected UnsupportedOs, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_survey_of_fresh_host() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = FakeHost::new();
        let (ctx, _rx) = context(&host, &tool, &FakeNode::new());

        let survey = survey(&ctx).await.unwrap();
        assert!(survey.os.is_supported_distro);
        assert!(!survey.has_existing_install());
        assert_eq!(survey.version.version, VERSION);
        assert!(survey.version.fallback_reason.is_none());
        assert!(survey.resources.cpu_cores >= 1);
    }

    #[tokio::test]
    async fn test_fresh_install_end_to_end() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = build_host(&tool);
        let node = FakeNode::new().with_height(1_200, 2_400);
        let (ctx, mut rx) = context(&host, &tool, &node);
        let mut prompter = ScriptedPrompter::new(standard_wildcard_answers());

        let outcome = run_mode(&ctx, Mode::FreshInstall, &fresh_survey(), &mut prompter)
            .await
            .unwrap();

        assert_eq!(outcome.exit_code(), 0);
        let report = outcome.report.as_ref().unwrap();
        assert!(report
            .records
            .iter()
            .all(|r| r.state == StepState::Succeeded));

        let conf = std::fs::read_to_string(tool.daemon_config_path()).unwrap();
        assert!(conf.contains("rpcbind=0.0.0.0"));
        assert!(conf.contains("rpcallowip=0.0.0.0/0"));
        assert!(conf.contains("maxconnections=125"));
        assert!(!conf.contains("txindex"));
        assert!(!conf.contains("prune"));

        let summary = outcome.summary.as_ref().unwrap();
        assert!(summary.service_active);
        assert_eq!(summary.version, VERSION);
        assert_eq!(summary.rpc_url, "http://127.0.0.1:9332");
        let sync = summary.sync.as_ref().unwrap();
        assert_eq!((sync.blocks, sync.headers), (1_200, 2_400));
        assert!((sync.percent() - 50.0).abs() < f64::EPSILON);

        let events = general_events(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            GeneralEvent::OperationCompleted { success: true, .. }
        )));
        // lock released once the mode returns
        assert!(RunLock::acquire(&tool.paths.lock_path).is_ok());
    }

    #[tokio::test]
    async fn test_pool_install_provisions_wallet() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = build_host(&tool);
        let node = FakeNode::new().warming_up(1);
        let (ctx, _rx) = context(&host, &tool, &node);
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Select(1), // pool backend
            Answer::Select(1), // pruned
            Answer::Select(1), // zmq
            Answer::Default,   // rpc user
            Answer::text("S3cretPassw0rd"),
            Answer::Default, // keep txindex
            Answer::Default, // create wallet
            Answer::Default, // firewall
            Answer::Confirm(true),
        ]);

        let outcome = run_mode(&ctx, Mode::FreshInstall, &fresh_survey(), &mut prompter)
            .await
            .unwrap();

        let report = outcome.report.as_ref().unwrap();
        assert!(report.succeeded(), "{report:?}");
        assert_eq!(
            report.record(StepId::ProvisionPoolWallet).unwrap().state,
            StepState::Succeeded
        );
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains(&CompatibilityWarning::PrunedWithTxIndex.to_string())));

        let conf = std::fs::read_to_string(tool.daemon_config_path()).unwrap();
        assert!(conf.contains("rpcbind=127.0.0.1"));
        assert!(conf.contains("txindex=1"));
        assert!(conf.contains("prune=4000"));
        assert!(conf.contains("zmqpubhashblock=tcp://127.0.0.1:28332"));

        let creds_path = tool.paths.config_dir.join(&tool.wallet.credential_file_name);
        let creds = PoolCredentials::parse(&std::fs::read_to_string(creds_path).unwrap()).unwrap();
        assert_eq!(creds.wallet_name, "pool");
        assert_eq!(
            creds.wallet_address.as_deref(),
            node.addresses("pool").first().map(String::as_str)
        );
        // the temporary daemon was stopped; the wallet comes back with the service
        assert!(node.stopped());
        assert_eq!(node.loaded_wallets(), vec!["pool".to_string()]);
        assert!(!host
            .firewall_rules()
            .iter()
            .any(|rule| rule.starts_with("9332")));
    }

    #[tokio::test]
    async fn test_declined_summary_is_a_clean_cancel() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = build_host(&tool);
        let (ctx, _rx) = context(&host, &tool, &FakeNode::new());
        let mut answers = standard_wildcard_answers();
        *answers.last_mut().unwrap() = Answer::Confirm(false);
        let mut prompter = ScriptedPrompter::new(answers);

        let err = run_mode(&ctx, Mode::FreshInstall, &fresh_survey(), &mut prompter)
            .await
            .unwrap_err();
        assert!(err.is_cancellation());
        assert_eq!(err.exit_code(), 0);
        assert!(host.calls().is_empty());
        assert!(!tool.daemon_config_path().exists());
    }

    #[tokio::test]
    async fn test_held_lock_blocks_mutating_modes() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = build_host(&tool);
        let (ctx, _rx) = context(&host, &tool, &FakeNode::new());
        let _held = RunLock::acquire(&tool.paths.lock_path).unwrap();
        let mut prompter = ScriptedPrompter::new(standard_wildcard_answers());

        let err = run_mode(&ctx, Mode::FreshInstall, &fresh_survey(), &mut prompter)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ops(OpsError::AlreadyRunning { .. })));
        assert_eq!(err.exit_code(), 1);
        assert!(prompter.prompts().is_empty());
        assert!(host.calls().is_empty());

        // read-only modes do not need the lock
        let outcome = run_mode(&ctx, Mode::Exit, &fresh_survey(), &mut prompter)
            .await
            .unwrap();
        assert_eq!(outcome.exit_code(), 0);
        assert!(outcome.report.is_none());
    }

    #[tokio::test]
    async fn test_modes_must_match_host() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = FakeHost::new();
        let (ctx, _rx) = context(&host, &tool, &FakeNode::new());
        let mut prompter = ScriptedPrompter::new(Vec::new());

        let err = run_mode(&ctx, Mode::Update, &fresh_survey(), &mut prompter)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ops(OpsError::NoExistingInstall)));

        let installed = installed_survey(PartialNodeConfig::default());
        let err = run_mode(&ctx, Mode::Uninstall, &installed, &mut prompter)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ops(OpsError::ModeUnavailable { .. })));
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_interrupted_install_finishes_on_rerun() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = build_host(&tool).fail_on("systemctl daemon-reload", 1, "Failed to reload");
        let node = FakeNode::new();
        let (ctx, _rx) = context(&host, &tool, &node);

        let mut prompter = ScriptedPrompter::new(standard_wildcard_answers());
        let outcome = run_mode(&ctx, Mode::FreshInstall, &fresh_survey(), &mut prompter)
            .await
            .unwrap();
        assert_eq!(outcome.exit_code(), 1);
        let report = outcome.report.as_ref().unwrap();
        assert_eq!(
            report.record(StepId::InstallServiceUnit).unwrap().state,
            StepState::Failed
        );
        assert!(!tool.paths.unit_file("litecoind.service").exists());
        let conf = std::fs::read_to_string(tool.daemon_config_path()).unwrap();

        let surveyed = Survey {
            resources: roomy(),
            version: fresh_survey().version,
            ..survey(&ctx).await.unwrap()
        };
        assert!(surveyed.has_existing_install());
        assert!(!surveyed.host.service_registered);
        assert!(available_modes(&surveyed.host).contains(&Mode::FreshInstall));

        host.clear_failures();
        let mut prompter = ScriptedPrompter::new(standard_wildcard_answers());
        let outcome = run_mode(&ctx, Mode::FreshInstall, &surveyed, &mut prompter)
            .await
            .unwrap();
        let report = outcome.report.as_ref().unwrap();
        assert!(report.succeeded(), "{report:?}");
        assert!(report.record(StepId::WriteConfigFile).unwrap().already_satisfied);
        assert_eq!(
            std::fs::read_to_string(tool.daemon_config_path()).unwrap(),
            conf
        );
        assert!(tool.paths.unit_file("litecoind.service").exists());
        assert!(host.unit_active("litecoind.service"));
        assert_eq!(host.count("useradd"), 1);
    }

    #[tokio::test]
    async fn test_update_rebuilds_and_keeps_config() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = build_host(&tool);
        let node = FakeNode::new();
        let (ctx, _rx) = context(&host, &tool, &node);

        let mut prompter = ScriptedPrompter::new(standard_wildcard_answers());
        run_mode(&ctx, Mode::FreshInstall, &fresh_survey(), &mut prompter)
            .await
            .unwrap();
        let before = std::fs::read_to_string(tool.daemon_config_path()).unwrap();

        let surveyed = survey(&ctx).await.unwrap();
        assert!(surveyed.has_existing_install());
        assert!(surveyed.host.service_active);

        let mut prompter = ScriptedPrompter::new(vec![Answer::Confirm(true)]);
        let outcome = run_mode(&ctx, Mode::Update, &surveyed, &mut prompter)
            .await
            .unwrap();
        let report = outcome.report.as_ref().unwrap();
        assert!(report.succeeded(), "{report:?}");
        assert_eq!(
            report.records.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![
                StepId::StopService,
                StepId::InstallDependencies,
                StepId::InstallLegacyDatabase,
                StepId::BuildAndInstallDaemon,
                StepId::CreateSymlinks,
                StepId::StartService,
            ]
        );
        assert_eq!(
            std::fs::read_to_string(tool.daemon_config_path()).unwrap(),
            before
        );
        assert!(host.unit_active("litecoind.service"));
    }

    #[tokio::test]
    async fn test_update_declined_touches_nothing() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = build_host(&tool);
        let (ctx, _rx) = context(&host, &tool, &FakeNode::new());
        let mut prompter = ScriptedPrompter::new(vec![Answer::Confirm(false)]);

        let err = run_mode(
            &ctx,
            Mode::Update,
            &installed_survey(PartialNodeConfig::default()),
            &mut prompter,
        )
        .await
        .unwrap_err();
        assert!(err.is_cancellation());
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reconfigure_switches_role() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = build_host(&tool);
        let node = FakeNode::new();
        let (ctx, _rx) = context(&host, &tool, &node);

        let mut prompter = ScriptedPrompter::new(standard_wildcard_answers());
        run_mode(&ctx, Mode::FreshInstall, &fresh_survey(), &mut prompter)
            .await
            .unwrap();
        // measured resources vary by machine; keep the gates quiet
        let surveyed = Survey {
            resources: roomy(),
            ..survey(&ctx).await.unwrap()
        };
        let existing = surveyed.host.existing_config.clone().unwrap();
        assert_eq!(existing.role, Some(Role::Standard));
        let rpc_rule = format!("{}/tcp", existing.rpc_port.unwrap());
        assert!(host.firewall_rules().contains(&rpc_rule));

        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Select(1), // pool backend
            Answer::Default,   // chain from existing
            Answer::Default,   // rpc polling
            Answer::Default,   // keep rpc user
            Answer::Default,   // keep password
            Answer::Select(2), // wallet later
            Answer::Default,   // firewall
            Answer::Confirm(true),
        ]);
        let outcome = run_mode(&ctx, Mode::Reconfigure, &surveyed, &mut prompter)
            .await
            .unwrap();
        let report = outcome.report.as_ref().unwrap();
        assert!(report.succeeded(), "{report:?}");
        assert!(report.record(StepId::BuildAndInstallDaemon).is_none());

        let conf = std::fs::read_to_string(tool.daemon_config_path()).unwrap();
        assert!(conf.contains("rpcbind=127.0.0.1"));
        assert!(conf.contains("maxconnections=256"));
        assert!(conf.contains(&format!(
            "rpcpassword={}",
            existing.rpc_password.unwrap().expose()
        )));
        let config = outcome.config.unwrap();
        assert_eq!(config.role, Role::PoolBackend);
        let rules = host.firewall_rules();
        assert!(!rules.contains(&rpc_rule), "{rules:?}");
        assert!(rules.contains(&format!("{}/tcp", config.network.p2p_port)));
    }

    #[tokio::test]
    async fn test_wallet_menu_actions() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = FakeHost::new();
        let node = FakeNode::new().with_wallet("pool", 1.5);
        let (ctx, _rx) = context(&host, &tool, &node);
        let existing = PartialNodeConfig {
            role: Some(Role::PoolBackend),
            rpc_user: Some("pooluser".into()),
            rpc_password: Some(Secret::new("keepme")),
            rpc_port: Some(19332),
            ..PartialNodeConfig::default()
        };
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Select(2), // balance
            Answer::Select(1),
            Answer::text("1BitcoinAddress"),
            Answer::Select(1),
            Answer::text("MExternalPayoutAddr"),
            Answer::Select(3), // new address
            Answer::Select(4), // back
        ]);

        let outcome = run_mode(&ctx, Mode::WalletManagement, &installed_survey(existing), &mut prompter)
            .await
            .unwrap();
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(prompter.remaining(), 0);

        let notices = prompter.notices();
        assert!(notices
            .iter()
            .any(|(level, text)| *level == NoticeLevel::Info && text.contains("1.50000000")));
        assert!(prompter
            .warnings()
            .iter()
            .any(|w| w.contains("invalid wallet address: 1BitcoinAddress")));
        assert_eq!(node.addresses("pool").len(), 1);
        assert_eq!(node.endpoints(), vec!["http://127.0.0.1:19332".to_string()]);

        let creds_path = tool.paths.config_dir.join(&tool.wallet.credential_file_name);
        let creds = PoolCredentials::parse(&std::fs::read_to_string(creds_path).unwrap()).unwrap();
        assert_eq!(creds.wallet_address.as_deref(), Some("MExternalPayoutAddr"));
        // wallet management never touches the host
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wallet_calls_load_an_unloaded_wallet() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = FakeHost::new();
        let node = FakeNode::new().with_unloaded_wallet("pool", 2.25);
        let (ctx, _rx) = context(&host, &tool, &node);
        let config = Arc::new(current_config(&ctx, &installed_survey(PartialNodeConfig::default())));
        let manager = WalletManager::new(ctx.install_context(config));

        assert!(node.loaded_wallets().is_empty());
        assert!((manager.balance().await.unwrap() - 2.25).abs() < f64::EPSILON);
        assert_eq!(node.loaded_wallets(), vec!["pool".to_string()]);

        // still loaded after a daemon restart
        node.stop().await.unwrap();
        let address = manager.new_address().await.unwrap();
        assert_eq!(node.addresses("pool"), vec![address]);
    }

    #[tokio::test]
    async fn test_wallet_calls_report_missing_wallet() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = FakeHost::new();
        let node = FakeNode::new();
        let (ctx, _rx) = context(&host, &tool, &node);
        let config = Arc::new(current_config(&ctx, &installed_survey(PartialNodeConfig::default())));
        let manager = WalletManager::new(ctx.install_context(config));

        let err = manager.balance().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Rpc(RpcError::Remote { code: -18, .. })
        ));
    }

    #[tokio::test]
    async fn test_wallet_create_reports_rpc_failure() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = FakeHost::new();
        let node = FakeNode::new().unauthorized();
        let (ctx, _rx) = context(&host, &tool, &node);
        let config = Arc::new(current_config(&ctx, &installed_survey(PartialNodeConfig::default())));
        let manager = WalletManager::new(ctx.install_context(config));

        let err = manager.create_wallet().await.unwrap_err();
        assert!(matches!(err, Error::Rpc(_)));
        assert_eq!(node.polls(), 1);
        assert!(!tool
            .paths
            .config_dir
            .join(&tool.wallet.credential_file_name)
            .exists());
    }

    #[tokio::test]
    async fn test_summary_without_running_service() {
        let (_dir, tool) = fixture(UBUNTU);
        let host = FakeHost::new();
        let node = FakeNode::new().with_height(10, 10);
        let (ctx, _rx) = context(&host, &tool, &node);
        let config = current_config(&ctx, &installed_survey(PartialNodeConfig::default()));

        let summary = node_summary(&ctx, &config).await;
        assert!(!summary.service_active);
        assert!(summary.sync.is_none());
        assert_eq!(node.polls(), 0);
        assert!(summary.config_path.ends_with("litecoin.conf"));
    }

    #[test]
    fn test_outcome_json_and_exit_codes() {
        let mut report = RunReport::new(Mode::Update, &[StepId::StopService]);
        let mut outcome = ModeOutcome {
            mode: Mode::Update,
            report: Some(report.clone()),
            summary: None,
            config: None,
        };
        assert_eq!(outcome.exit_code(), 0);
        let json = outcome.to_json().unwrap();
        assert!(json.contains("\"mode\": \"update\""));

        report.halted_at = Some(StepId::StopService);
        outcome.report = Some(report);
        assert_eq!(outcome.exit_code(), 1);

        let mut teardown = UninstallReport::default();
        teardown.residual.push("user litecoin".into());
        assert_eq!(uninstall_exit_code(&teardown), 0);
        teardown.failed.push(("service unit".into(), "busy".into()));
        assert_eq!(uninstall_exit_code(&teardown), 1);
    }
}
