//! Task graph execution
//!
//! A graph is an ordered list of steps run strictly one after another.
//! A failing fatal step halts the graph; a failing advisory step is
//! recorded as `SkippedAdvisory` and the next step runs. Nothing is retried
//! within a run; re-running the whole mode relies on step idempotency.

use async_trait::async_trait;
use nodectl_events::{AppEvent, EventEmitter, FailureContext, StepEvent};
use nodectl_types::{
    Criticality, Mode, NodeConfig, PoolWalletMode, Role, RunReport, StepId, StepOutcome,
    StepRecord, StepState,
};
use std::time::Instant;

use crate::context::InstallContext;
use crate::steps;

/// One idempotent provisioning step
#[async_trait]
pub trait Step: Send + Sync {
    fn id(&self) -> StepId;

    async fn run(&self, cx: &InstallContext) -> StepOutcome;
}

/// Steps a mode runs, in order
#[must_use]
pub fn plan_for(mode: Mode, config: &NodeConfig) -> Vec<StepId> {
    let creates_wallet = config.role == Role::PoolBackend
        && config
            .pool_wallet
            .as_ref()
            .is_some_and(|w| w.mode == PoolWalletMode::Create);

    let mut plan = match mode {
        Mode::FreshInstall => vec![
            StepId::InstallDependencies,
            StepId::InstallLegacyDatabase,
            StepId::CreateServiceUser,
            StepId::CreateDirectories,
            StepId::BuildAndInstallDaemon,
            StepId::CreateSymlinks,
            StepId::WriteConfigFile,
            StepId::ProvisionPoolWallet,
            StepId::InstallServiceUnit,
            StepId::ConfigureFirewall,
            StepId::StartService,
        ],
        Mode::Update => vec![
            StepId::StopService,
            StepId::InstallDependencies,
            StepId::InstallLegacyDatabase,
            StepId::BuildAndInstallDaemon,
            StepId::CreateSymlinks,
            StepId::StartService,
        ],
        Mode::Reconfigure => vec![
            StepId::StopService,
            StepId::WriteConfigFile,
            StepId::ProvisionPoolWallet,
            StepId::ConfigureFirewall,
            StepId::StartService,
        ],
        Mode::WalletManagement | Mode::Uninstall | Mode::Exit => Vec::new(),
    };
    if !creates_wallet {
        plan.retain(|id| *id != StepId::ProvisionPoolWallet);
    }
    plan
}

/// Manual follow-up for an advisory gap, with placeholders filled in
#[must_use]
pub fn remediation_for(id: StepId, cx: &InstallContext) -> Option<String> {
    id.remediation().map(|text| {
        text.replace("<unit>", &cx.tool.daemon.service_unit)
            .replace("<port>", &cx.config.network.p2p_port.to_string())
    })
}

/// An ordered list of steps bound to a mode
pub struct TaskGraph {
    mode: Mode,
    steps: Vec<Box<dyn Step>>,
}

impl TaskGraph {
    #[must_use]
    pub fn new(mode: Mode, steps: Vec<Box<dyn Step>>) -> Self {
        Self { mode, steps }
    }

    /// Graph of the built-in steps for `mode`
    #[must_use]
    pub fn for_mode(mode: Mode, config: &NodeConfig) -> Self {
        let steps = plan_for(mode, config)
            .into_iter()
            .map(steps::step_for)
            .collect();
        Self::new(mode, steps)
    }

    #[must_use]
    pub fn step_ids(&self) -> Vec<StepId> {
        self.steps.iter().map(|s| s.id()).collect()
    }

    /// Run every step in order and report what happened
    pub async fn run(&self, cx: &InstallContext) -> RunReport {
        let started = Instant::now();
        let ids = self.step_ids();
        let mut report = RunReport::new(self.mode, &ids);

        cx.emit(AppEvent::Step(StepEvent::GraphStarted {
            mode: self.mode.to_string(),
            steps: ids,
        }));
        tracing::info!(mode = %self.mode, steps = self.steps.len(), "task graph started");

        for step in &self.steps {
            let id = step.id();
            if let Err(halt) = Self::run_step(step.as_ref(), cx, &mut report).await {
                report.halted_at = Some(halt);
                break;
            }
            tracing::debug!(step = %id, "step finished");
        }

        report.duration_ms = elapsed_ms(started);
        cx.emit(AppEvent::Step(StepEvent::GraphFinished {
            halted_at: report.halted_at,
            warnings: report.warnings.len(),
        }));
        report
    }

    /// `Err(id)` when the step was fatal and failed
    async fn run_step(
        step: &dyn Step,
        cx: &InstallContext,
        report: &mut RunReport,
    ) -> Result<(), StepId> {
        let id = step.id();
        let Some(record) = report.record_mut(id) else {
            return Ok(());
        };
        if let Err(e) = record.transition(StepState::Running) {
            tracing::error!(step = %id, error = %e, "step cannot start");
            return Err(id);
        }
        cx.emit(AppEvent::Step(StepEvent::Started { step: id }));
        tracing::info!(step = %id, "running step");

        let started = Instant::now();
        let outcome = step.run(cx).await;
        let duration_ms = elapsed_ms(started);
        record.duration_ms = Some(duration_ms);

        match outcome {
            Ok(success) => {
                settle(record, StepState::Succeeded);
                record.note.clone_from(&success.note);
                record.already_satisfied = success.already_satisfied;
                cx.emit(AppEvent::Step(StepEvent::Succeeded {
                    step: id,
                    already_satisfied: success.already_satisfied,
                    note: success.note,
                    duration_ms,
                }));
                Ok(())
            }
            Err(failure) => match id.criticality() {
                Criticality::Fatal => {
                    settle(record, StepState::Failed);
                    tracing::error!(step = %id, reason = %failure.reason, "fatal step failed");
                    cx.emit(AppEvent::Step(StepEvent::Failed {
                        step: id,
                        failure: FailureContext::message(failure.reason.clone()),
                        log_excerpt: failure.log_excerpt.clone(),
                    }));
                    record.failure = Some(failure);
                    Err(id)
                }
                Criticality::Advisory => {
                    settle(record, StepState::SkippedAdvisory);
                    let remediation = remediation_for(id, cx);
                    tracing::warn!(step = %id, reason = %failure.reason, "advisory step failed");
                    cx.emit(AppEvent::Step(StepEvent::AdvisoryFailed {
                        step: id,
                        failure: FailureContext::message(failure.reason.clone()),
                        remediation: remediation.clone(),
                    }));
                    report.warnings.push(match remediation {
                        Some(fix) => format!("{id}: {} ({fix})", failure.reason),
                        None => format!("{id}: {}", failure.reason),
                    });
                    if let Some(record) = report.record_mut(id) {
                        record.failure = Some(failure);
                    }
                    Ok(())
                }
            },
        }
    }
}

fn settle(record: &mut StepRecord, state: StepState) {
    if let Err(e) = record.transition(state) {
        tracing::error!(step = %record.id, error = %e, "unexpected step transition");
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
