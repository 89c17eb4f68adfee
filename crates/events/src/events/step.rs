//! Task graph step events

use serde::{Deserialize, Serialize};
use nodectl_types::StepId;

use super::FailureContext;

/// Lifecycle of provisioning steps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepEvent {
    /// A graph run is about to start
    GraphStarted { mode: String, steps: Vec<StepId> },

    Started { step: StepId },

    /// Free-form progress line from a long-running step
    Progress { step: StepId, message: String },

    Succeeded {
        step: StepId,
        already_satisfied: bool,
        note: Option<String>,
        duration_ms: u64,
    },

    /// Fatal failure; the graph halts after this
    Failed {
        step: StepId,
        failure: FailureContext,
        log_excerpt: Vec<String>,
    },

    /// Advisory failure; the graph continues
    AdvisoryFailed {
        step: StepId,
        failure: FailureContext,
        remediation: Option<String>,
    },

    GraphFinished { halted_at: Option<StepId>, warnings: usize },
}
