//! Service start and stop

use async_trait::async_trait;
use nodectl_events::EventEmitter;
use nodectl_platform::PlatformCommand;
use nodectl_types::{StepId, StepOutcome, StepSuccess};
use std::time::Duration;

use crate::context::InstallContext;
use crate::graph::Step;

fn systemctl(action: &str, unit: &str) -> PlatformCommand {
    PlatformCommand::new("systemctl").args([action, unit])
}

/// Enables and starts the service, then waits for it to report active
pub struct StartService;

#[async_trait]
impl Step for StartService {
    fn id(&self) -> StepId {
        StepId::StartService
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let unit = cx.tool.daemon.service_unit.as_str();
        let service = &cx.tool.service;

        cx.run_checked(systemctl("enable", unit), "systemctl enable")
            .await?;
        cx.run_checked(systemctl("start", unit), "systemctl start")
            .await?;

        let interval = Duration::from_secs(service.start_poll_interval_secs);
        for attempt in 1..=service.start_poll_attempts {
            if cx.service_active().await {
                return Ok(StepSuccess::done(format!("{unit} is active")));
            }
            cx.emit_step_progress(
                self.id(),
                format!(
                    "waiting for {unit} ({attempt}/{})",
                    service.start_poll_attempts
                ),
            );
            tokio::time::sleep(interval).await;
        }
        Err(cx.failure(format!(
            "{unit} did not report active after {} checks",
            service.start_poll_attempts
        )))
    }
}

/// Stops the service when it is running
pub struct StopService;

#[async_trait]
impl Step for StopService {
    fn id(&self) -> StepId {
        StepId::StopService
    }

    async fn run(&self, cx: &InstallContext) -> StepOutcome {
        let unit = cx.tool.daemon.service_unit.as_str();
        if !cx.service_active().await {
            return Ok(StepSuccess::already(format!("{unit} not running")));
        }
        cx.run_checked(systemctl("stop", unit), "systemctl stop")
            .await?;
        Ok(StepSuccess::done(format!("stopped {unit}")))
    }
}
