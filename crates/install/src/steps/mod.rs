//! Built-in provisioning steps

mod build;
mod files;
mod firewall;
mod service;
mod system;
mod wallet;

pub use build::{BuildAndInstallDaemon, CreateSymlinks, InstallLegacyDatabase};
pub use files::{InstallServiceUnit, WriteConfigFile};
pub use firewall::{status_has_rule, ConfigureFirewall};
pub use service::{StartService, StopService};
pub use system::{CreateDirectories, CreateServiceUser, InstallDependencies};
pub use wallet::{wait_for_rpc, write_credentials, ProvisionPoolWallet};

use crate::graph::Step;
use nodectl_types::StepId;

/// The step implementing `id`
#[must_use]
pub fn step_for(id: StepId) -> Box<dyn Step> {
    match id {
        StepId::StopService => Box::new(StopService),
        StepId::InstallDependencies => Box::new(InstallDependencies),
        StepId::InstallLegacyDatabase => Box::new(InstallLegacyDatabase),
        StepId::CreateServiceUser => Box::new(CreateServiceUser),
        StepId::CreateDirectories => Box::new(CreateDirectories),
        StepId::BuildAndInstallDaemon => Box::new(BuildAndInstallDaemon),
        StepId::CreateSymlinks => Box::new(CreateSymlinks),
        StepId::WriteConfigFile => Box::new(WriteConfigFile),
        StepId::ProvisionPoolWallet => Box::new(ProvisionPoolWallet),
        StepId::InstallServiceUnit => Box::new(InstallServiceUnit),
        StepId::ConfigureFirewall => Box::new(ConfigureFirewall),
        StepId::StartService => Box::new(StartService),
    }
}
