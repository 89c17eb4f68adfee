//! Environment probe events

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbeEvent {
    /// A check could not complete; the value was defaulted
    CheckDegraded { check: String, reason: String },

    /// Remote version lookup failed and the fallback was used
    VersionFallback { requested: String, fallback: String, reason: String },

    VersionResolved { version: String },
}
