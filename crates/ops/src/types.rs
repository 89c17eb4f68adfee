//! Result types returned by the dispatcher

use nodectl_errors::{Error, OpsError};
use nodectl_probe::ResolvedVersion;
use nodectl_types::{
    HostState, Mode, NodeConfig, NodeSummary, OsInfo, Resources, RunReport, UninstallReport,
};
use serde::Serialize;

/// Probe results gathered before a mode is chosen
#[derive(Debug, Clone)]
pub struct Survey {
    pub os: OsInfo,
    pub resources: Resources,
    pub host: HostState,
    pub version: ResolvedVersion,
}

impl Survey {
    /// Whether a previous nodectl install was found
    #[must_use]
    pub fn has_existing_install(&self) -> bool {
        self.host.has_existing_install()
    }
}

/// What a dispatched mode did
#[derive(Debug, Clone, Serialize)]
pub struct ModeOutcome {
    pub mode: Mode,
    /// Task graph report; `None` for modes that run no graph
    pub report: Option<RunReport>,
    /// State of the node after a successful graph run
    pub summary: Option<NodeSummary>,
    /// The model the graph ran against
    #[serde(skip)]
    pub config: Option<NodeConfig>,
}

impl ModeOutcome {
    #[must_use]
    pub fn without_graph(mode: Mode) -> Self {
        Self {
            mode,
            report: None,
            summary: None,
            config: None,
        }
    }

    /// No fatal step failed
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.report.as_ref().is_none_or(RunReport::succeeded)
    }

    /// 0 on success, 1 when a fatal step halted the graph
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.succeeded())
    }

    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::SerializationError`] if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Exit code for a finished teardown; leftover artifacts are warnings only
#[must_use]
pub fn uninstall_exit_code(report: &UninstallReport) -> i32 {
    i32::from(!report.failed.is_empty())
}
