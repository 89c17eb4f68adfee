//! Report type definitions for runs

use crate::mode::Mode;
use crate::step::{StepId, StepRecord, StepState};
use serde::{Deserialize, Serialize};

/// Outcome of one task graph run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: Mode,
    /// One record per planned step, in execution order
    pub records: Vec<StepRecord>,
    /// The fatal step that stopped the run
    pub halted_at: Option<StepId>,
    /// Model-level warnings and advisory gaps worth repeating at the end
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

impl RunReport {
    #[must_use]
    pub fn new(mode: Mode, steps: &[StepId]) -> Self {
        Self {
            mode,
            records: steps.iter().copied().map(StepRecord::pending).collect(),
            halted_at: None,
            warnings: Vec::new(),
            duration_ms: 0,
        }
    }

    /// No fatal step failed
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.halted_at.is_none()
    }

    #[must_use]
    pub fn record(&self, id: StepId) -> Option<&StepRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn record_mut(&mut self, id: StepId) -> Option<&mut StepRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Advisory steps that failed and need manual follow-up
    pub fn advisory_gaps(&self) -> impl Iterator<Item = &StepRecord> {
        self.records
            .iter()
            .filter(|r| r.state == StepState::SkippedAdvisory)
    }

    /// Steps that never ran because the graph halted
    pub fn not_run(&self) -> impl Iterator<Item = &StepRecord> {
        self.records
            .iter()
            .filter(|r| r.state == StepState::Pending)
    }
}

/// Chain synchronisation as reported by the daemon
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub chain: String,
    pub blocks: u64,
    pub headers: u64,
    /// 0.0 to 1.0
    pub verification_progress: f64,
}

impl SyncStatus {
    #[must_use]
    pub fn percent(&self) -> f64 {
        (self.verification_progress * 100.0).clamp(0.0, 100.0)
    }
}

/// What the operator sees after a successful run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub version: String,
    pub service_unit: String,
    pub service_active: bool,
    pub rpc_url: String,
    pub config_path: String,
    /// `None` when the daemon did not answer yet
    pub sync: Option<SyncStatus>,
}

/// Outcome of a teardown
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UninstallReport {
    /// Actions that removed something
    pub removed: Vec<String>,
    /// Actions that failed, with the reason; teardown continued
    pub failed: Vec<(String, String)>,
    /// Artifacts the verification pass still found
    pub residual: Vec<String>,
}

impl UninstallReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.residual.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_report_is_all_pending() {
        let report = RunReport::new(
            Mode::Update,
            &[StepId::StopService, StepId::BuildAndInstallDaemon],
        );
        assert!(report.succeeded());
        assert_eq!(report.not_run().count(), 2);
        assert!(report.record(StepId::StopService).is_some());
        assert!(report.record(StepId::WriteConfigFile).is_none());
    }
}
