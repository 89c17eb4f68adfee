//! Resource gates evaluated before any mutation

use nodectl_config::Thresholds;
use nodectl_types::{ChainMode, Resources, Role};
use std::fmt;

/// Which resource a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    DiskSpace,
    DiskType,
    Memory,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiskSpace => write!(f, "disk space"),
            Self::DiskType => write!(f, "disk type"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Shown, nothing else
    Warning,
    /// Continuing needs an explicit override
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateFinding {
    pub gate: Gate,
    pub severity: Severity,
    pub message: String,
}

impl GateFinding {
    fn new(gate: Gate, severity: Severity, message: String) -> Self {
        Self {
            gate,
            severity,
            message,
        }
    }

    #[must_use]
    pub fn is_hard(&self) -> bool {
        self.severity == Severity::Hard
    }
}

/// Compare measured resources against the thresholds for a role and chain
/// mode. Values strictly below a threshold trip it.
#[must_use]
pub fn evaluate_gates(
    resources: &Resources,
    role: Role,
    chain_mode: ChainMode,
    thresholds: &Thresholds,
) -> Vec<GateFinding> {
    let mut findings = Vec::new();
    let pruned = chain_mode.is_pruned();

    let hard_gb = thresholds.disk_hard_gb(pruned);
    let recommended_gb = thresholds.disk_recommended_gb(pruned);
    if resources.disk_free_gb < hard_gb {
        findings.push(GateFinding::new(
            Gate::DiskSpace,
            Severity::Hard,
            format!(
                "{} GB free, at least {hard_gb} GB is required for a {chain_mode} chain",
                resources.disk_free_gb
            ),
        ));
    } else if resources.disk_free_gb < recommended_gb {
        findings.push(GateFinding::new(
            Gate::DiskSpace,
            Severity::Warning,
            format!(
                "{} GB free, {recommended_gb} GB is recommended for a {chain_mode} chain",
                resources.disk_free_gb
            ),
        ));
    }

    if resources.disk_is_rotational {
        match role {
            Role::PoolBackend => findings.push(GateFinding::new(
                Gate::DiskType,
                Severity::Hard,
                "the data directory is on a spinning disk; pool RPC latency needs an SSD"
                    .to_string(),
            )),
            Role::Standard => findings.push(GateFinding::new(
                Gate::DiskType,
                Severity::Warning,
                "the data directory is on a spinning disk; initial sync will be slow".to_string(),
            )),
        }
    }

    if resources.ram_mb < thresholds.ram_hard_mb {
        findings.push(GateFinding::new(
            Gate::Memory,
            Severity::Hard,
            format!(
                "{} MB of RAM, at least {} MB is required",
                resources.ram_mb, thresholds.ram_hard_mb
            ),
        ));
    } else if resources.ram_mb < thresholds.ram_recommended_mb {
        findings.push(GateFinding::new(
            Gate::Memory,
            Severity::Warning,
            format!(
                "{} MB of RAM, {} MB is recommended",
                resources.ram_mb, thresholds.ram_recommended_mb
            ),
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(disk_free_gb: u64, ram_mb: u64, rotational: bool) -> Resources {
        Resources {
            cpu_cores: 4,
            ram_mb,
            disk_free_gb,
            disk_is_rotational: rotational,
        }
    }

    fn disk_severity(findings: &[GateFinding]) -> Option<Severity> {
        findings
            .iter()
            .find(|f| f.gate == Gate::DiskSpace)
            .map(|f| f.severity)
    }

    #[test]
    fn full_chain_disk_threshold() {
        let t = Thresholds::default();
        let below = evaluate_gates(&host(149, 16_384, false), Role::Standard, ChainMode::Full, &t);
        let above = evaluate_gates(&host(151, 16_384, false), Role::Standard, ChainMode::Full, &t);
        assert_eq!(disk_severity(&below), Some(Severity::Hard));
        assert_eq!(disk_severity(&above), Some(Severity::Warning));
    }

    #[test]
    fn pruned_chain_disk_threshold() {
        let t = Thresholds::default();
        let pruned = ChainMode::Pruned(4000);
        let below = evaluate_gates(&host(19, 16_384, false), Role::Standard, pruned, &t);
        let above = evaluate_gates(&host(21, 16_384, false), Role::Standard, pruned, &t);
        let plenty = evaluate_gates(&host(400, 16_384, false), Role::Standard, pruned, &t);
        assert_eq!(disk_severity(&below), Some(Severity::Hard));
        assert_eq!(disk_severity(&above), Some(Severity::Warning));
        assert_eq!(disk_severity(&plenty), None);
    }

    #[test]
    fn rotational_disk_is_hard_only_for_pool() {
        let t = Thresholds::default();
        let pool = evaluate_gates(&host(500, 16_384, true), Role::PoolBackend, ChainMode::Full, &t);
        let standard = evaluate_gates(&host(500, 16_384, true), Role::Standard, ChainMode::Full, &t);
        assert!(pool.iter().any(|f| f.gate == Gate::DiskType && f.is_hard()));
        assert!(standard.iter().all(|f| !f.is_hard()));
    }

    #[test]
    fn memory_thresholds() {
        let t = Thresholds::default();
        let low = evaluate_gates(&host(500, 2048, false), Role::Standard, ChainMode::Full, &t);
        let mid = evaluate_gates(&host(500, 6144, false), Role::Standard, ChainMode::Full, &t);
        let high = evaluate_gates(&host(500, 8192, false), Role::Standard, ChainMode::Full, &t);
        assert!(low.iter().any(|f| f.gate == Gate::Memory && f.is_hard()));
        assert!(mid.iter().any(|f| f.gate == Gate::Memory && !f.is_hard()));
        assert!(high.is_empty());
    }
}
