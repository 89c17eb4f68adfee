//! Provisioning step identities, states and records

use chrono::{DateTime, Utc};
use nodectl_errors::InstallError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Every provisioning step the task graph knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    StopService,
    InstallDependencies,
    InstallLegacyDatabase,
    CreateServiceUser,
    CreateDirectories,
    BuildAndInstallDaemon,
    CreateSymlinks,
    WriteConfigFile,
    ProvisionPoolWallet,
    InstallServiceUnit,
    ConfigureFirewall,
    StartService,
}

/// Whether a failing step halts the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    Fatal,
    Advisory,
}

impl StepId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StopService => "stop-service",
            Self::InstallDependencies => "install-dependencies",
            Self::InstallLegacyDatabase => "install-legacy-database",
            Self::CreateServiceUser => "create-service-user",
            Self::CreateDirectories => "create-directories",
            Self::BuildAndInstallDaemon => "build-and-install-daemon",
            Self::CreateSymlinks => "create-symlinks",
            Self::WriteConfigFile => "write-config-file",
            Self::ProvisionPoolWallet => "provision-pool-wallet",
            Self::InstallServiceUnit => "install-service-unit",
            Self::ConfigureFirewall => "configure-firewall",
            Self::StartService => "start-service",
        }
    }

    #[must_use]
    pub fn criticality(self) -> Criticality {
        match self {
            Self::StopService
            | Self::ProvisionPoolWallet
            | Self::ConfigureFirewall
            | Self::StartService => Criticality::Advisory,
            _ => Criticality::Fatal,
        }
    }

    /// Manual follow-up shown when an advisory step leaves a gap.
    #[must_use]
    pub fn remediation(self) -> Option<&'static str> {
        match self {
            Self::ProvisionPoolWallet => {
                Some("run `nodectl` again and choose wallet management to create the pool wallet")
            }
            Self::ConfigureFirewall => Some("open the P2P port manually: `ufw allow <port>/tcp`"),
            Self::StartService => Some("check `systemctl status <unit>` and `journalctl -u <unit>`"),
            Self::StopService => Some("stop the daemon manually: `systemctl stop <unit>`"),
            _ => None,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution state of one step within a run
///
/// `Pending -> Running -> {Succeeded, Failed, SkippedAdvisory}`; nothing
/// ever returns to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Pending,
    Running,
    Succeeded,
    /// A fatal step failed and halted the graph
    Failed,
    /// An advisory step failed; the gap is recorded and the run continued
    SkippedAdvisory,
}

impl StepState {
    #[must_use]
    pub fn can_transition_to(self, next: StepState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (
                    Self::Running,
                    Self::Succeeded | Self::Failed | Self::SkippedAdvisory
                )
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::SkippedAdvisory)
    }
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::SkippedAdvisory => "skipped (advisory)",
        };
        f.write_str(name)
    }
}

/// Why a step failed, with a bounded diagnostic excerpt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub reason: String,
    pub log_excerpt: Vec<String>,
    pub log_path: Option<PathBuf>,
}

impl StepFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            log_excerpt: Vec::new(),
            log_path: None,
        }
    }

    #[must_use]
    pub fn with_excerpt(mut self, excerpt: Vec<String>) -> Self {
        self.log_excerpt = excerpt;
        self
    }

    #[must_use]
    pub fn with_log_path(mut self, path: Option<PathBuf>) -> Self {
        self.log_path = path;
        self
    }

    /// Convert into the cross-crate error for a halted run.
    #[must_use]
    pub fn into_error(self, step: StepId) -> InstallError {
        InstallError::StepFailed {
            step: step.to_string(),
            reason: self.reason,
            log_excerpt: self.log_excerpt,
            log_path: self.log_path.map(|p| p.display().to_string()),
        }
    }
}

/// What a successful step reports back
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSuccess {
    pub note: Option<String>,
    /// The step found its target state already in place and did nothing.
    pub already_satisfied: bool,
}

impl StepSuccess {
    pub fn done(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            already_satisfied: false,
        }
    }

    pub fn already(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            already_satisfied: true,
        }
    }
}

/// Result of running one step
pub type StepOutcome = Result<StepSuccess, StepFailure>;

/// One line of the run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub id: StepId,
    pub state: StepState,
    pub started_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    pub note: Option<String>,
    pub already_satisfied: bool,
    pub failure: Option<StepFailure>,
}

impl StepRecord {
    #[must_use]
    pub fn pending(id: StepId) -> Self {
        Self {
            id,
            state: StepState::Pending,
            started_at: None,
            duration_ms: None,
            note: None,
            already_satisfied: false,
            failure: None,
        }
    }

    /// Move to `next`, rejecting transitions outside the step state machine.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::InvalidTransition`] for an illegal move.
    pub fn transition(&mut self, next: StepState) -> Result<(), InstallError> {
        if !self.state.can_transition_to(next) {
            return Err(InstallError::InvalidTransition {
                step: self.id.to_string(),
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        if next == StepState::Running {
            self.started_at = Some(Utc::now());
        }
        self.state = next;
        Ok(())
    }
}
