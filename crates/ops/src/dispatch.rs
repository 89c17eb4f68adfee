//! Mode dispatch
//!
//! One mode runs per invocation. The probe decides which modes are on
//! offer, the operator picks one, and the chosen mode either runs a task
//! graph or the wallet submenu. Every mode that changes the host holds the
//! run lock for its whole duration.

use nodectl_configurator::{rehydrate, ConfigureInputs, Configurator, Prompter};
use nodectl_errors::{Error, OpsError, ProbeError};
use nodectl_events::EventEmitter;
use nodectl_install::TaskGraph;
use nodectl_net::RpcEndpoint;
use nodectl_types::{HostState, Mode, NodeConfig, NodeSummary, SyncStatus};
use std::sync::Arc;

use crate::context::OpsCtx;
use crate::lock::RunLock;
use crate::types::{ModeOutcome, Survey};
use crate::wallet::WalletManager;

/// Probe the host before anything is asked.
///
/// # Errors
///
/// Returns [`ProbeError::UnsupportedOs`] on a distribution nodectl does not
/// support. Every other check degrades instead of failing.
pub async fn survey(ctx: &OpsCtx) -> Result<Survey, Error> {
    let probe = ctx.probe();
    let os = probe.detect_os().await;
    if !os.is_supported_distro {
        return Err(ProbeError::UnsupportedOs {
            label: os.version_label,
        }
        .into());
    }

    let host = probe.detect_existing_install().await;
    let data_dir = host
        .existing_config
        .as_ref()
        .and_then(|c| c.data_dir.clone())
        .unwrap_or_else(|| ctx.tool.paths.data_dir.clone());
    let resources = probe.detect_resources(&data_dir).await;
    let version = probe.resolve_software_version(ctx.net.as_ref()).await;

    tracing::info!(
        os = %os.version_label,
        existing = host.has_existing_install(),
        version = %version.version,
        "host surveyed"
    );
    Ok(Survey {
        os,
        resources,
        host,
        version,
    })
}

/// Modes offered for a host, in menu order
///
/// A fresh install stays on offer next to an existing one: its graph is
/// idempotent, so re-running it finishes an install that stopped part way.
#[must_use]
pub fn available_modes(host: &HostState) -> Vec<Mode> {
    if host.has_existing_install() {
        vec![
            Mode::Update,
            Mode::Reconfigure,
            Mode::FreshInstall,
            Mode::WalletManagement,
            Mode::Exit,
        ]
    } else {
        vec![Mode::FreshInstall, Mode::Exit]
    }
}

fn check_available(mode: Mode, survey: &Survey) -> Result<(), OpsError> {
    if available_modes(&survey.host).contains(&mode) {
        return Ok(());
    }
    match mode {
        Mode::Update | Mode::Reconfigure | Mode::WalletManagement => {
            Err(OpsError::NoExistingInstall)
        }
        Mode::Uninstall => Err(OpsError::ModeUnavailable {
            mode: mode.to_string(),
            reason: "use nodectl-uninstall".to_string(),
        }),
        Mode::FreshInstall | Mode::Exit => Ok(()),
    }
}

/// Model of the installed node, read back from its daemon config
#[must_use]
pub fn current_config(ctx: &OpsCtx, survey: &Survey) -> NodeConfig {
    let existing = survey.host.existing_config.clone().unwrap_or_default();
    rehydrate(
        &ctx.tool,
        &existing,
        &survey.version.version,
        survey.resources.cpu_cores,
    )
}

/// Run `mode` to completion.
///
/// # Errors
///
/// Returns an error when the mode is not on offer for this host, the run
/// lock is held elsewhere, the configurator aborts (a declined summary or
/// confirmation is [`Error::Cancelled`]), or the prompter fails. Step
/// failures are not errors; they are recorded in the outcome's report.
pub async fn run_mode(
    ctx: &OpsCtx,
    mode: Mode,
    survey: &Survey,
    prompter: &mut dyn Prompter,
) -> Result<ModeOutcome, Error> {
    check_available(mode, survey)?;
    let _lock = if mode.is_mutating() {
        Some(RunLock::acquire(&ctx.tool.paths.lock_path)?)
    } else {
        None
    };
    ctx.emit_operation_started(mode.to_string());

    let outcome = match mode {
        Mode::FreshInstall | Mode::Reconfigure => {
            // a repeated fresh install keeps the credentials it already wrote
            let existing = if mode == Mode::Reconfigure {
                Some(survey.host.existing_config.clone().unwrap_or_default())
            } else {
                survey.host.existing_config.clone()
            };
            let configured = Configurator::new(&ctx.tool, prompter).run(&ConfigureInputs {
                resources: &survey.resources,
                existing: existing.as_ref(),
                software_version: survey.version.version.clone(),
            })?;
            let mut warnings: Vec<String> =
                configured.warnings.iter().map(ToString::to_string).collect();
            warnings.extend(
                configured
                    .overridden_gates
                    .iter()
                    .map(|gate| format!("continued past the {gate} check")),
            );
            if mode == Mode::FreshInstall {
                warnings.extend(fallback_warning(survey));
            }
            run_graph(ctx, mode, configured.config, warnings).await
        }
        Mode::Update => {
            let config = current_config(ctx, survey);
            let question = format!(
                "Rebuild {} {} and restart {}?",
                ctx.tool.daemon.daemon_binary, config.software_version, ctx.tool.daemon.service_unit
            );
            if !prompter.confirm(&question, true)? {
                tracing::info!("update declined");
                return Err(Error::Cancelled);
            }
            run_graph(ctx, mode, config, fallback_warning(survey).into_iter().collect()).await
        }
        Mode::WalletManagement => {
            let config = Arc::new(current_config(ctx, survey));
            WalletManager::new(ctx.install_context(config))
                .run_menu(prompter)
                .await?;
            ModeOutcome::without_graph(mode)
        }
        Mode::Uninstall | Mode::Exit => ModeOutcome::without_graph(mode),
    };

    ctx.emit_operation_completed(mode.to_string(), outcome.succeeded());
    Ok(outcome)
}

fn fallback_warning(survey: &Survey) -> Option<String> {
    survey.version.fallback_reason.as_ref().map(|reason| {
        format!(
            "release lookup failed ({reason}); building {}",
            survey.version.version
        )
    })
}

async fn run_graph(
    ctx: &OpsCtx,
    mode: Mode,
    config: NodeConfig,
    warnings: Vec<String>,
) -> ModeOutcome {
    let config = Arc::new(config);
    let cx = ctx.install_context(config.clone());
    let mut report = TaskGraph::for_mode(mode, &config).run(&cx).await;
    report.warnings.splice(0..0, warnings);

    let summary = if report.succeeded() {
        Some(node_summary(ctx, &config).await)
    } else {
        None
    };
    ModeOutcome {
        mode,
        report: Some(report),
        summary,
        config: Some(Arc::unwrap_or_clone(config)),
    }
}

/// Service and chain-sync state for the final summary
///
/// The sync query is best effort: a daemon that is still starting simply
/// reports no sync status.
pub async fn node_summary(ctx: &OpsCtx, config: &NodeConfig) -> NodeSummary {
    let cx = ctx.install_context(Arc::new(config.clone()));
    let service_active = cx.service_active().await;

    let sync = if service_active {
        let rpc = ctx.rpc.connect(&RpcEndpoint::for_config(config));
        match rpc.get_blockchain_info().await {
            Ok(info) => Some(SyncStatus {
                chain: info.chain,
                blocks: info.blocks,
                headers: info.headers,
                verification_progress: info.verification_progress,
            }),
            Err(e) => {
                tracing::debug!(error = %e, "sync status unavailable");
                None
            }
        }
    } else {
        None
    };

    NodeSummary {
        version: config.software_version.clone(),
        service_unit: ctx.tool.daemon.service_unit.clone(),
        service_active,
        rpc_url: config.local_rpc_url(),
        config_path: cx.daemon_config_path().display().to_string(),
        sync,
    }
}
