//! Teardown events

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UninstallEvent {
    ActionStarted { action: String },

    ActionCompleted { action: String, removed: bool },

    /// A removal failed; teardown continues
    ActionFailed { action: String, error: String },

    /// The verification pass found something still present
    Residual { artifact: String },

    Finished { residual: usize },
}
