//! Core platform abstractions and context management

use nodectl_errors::Error;
use nodectl_events::{
    AppEvent, EventEmitter, EventSender, FailureContext, PlatformEvent, ProcessCommandDescriptor,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::implementations::linux::LinuxProcessOperations;
use crate::log::CommandLog;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Context for platform operations, providing event emission and the command log
#[derive(Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
    command_log: Option<Arc<CommandLog>>,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    #[must_use]
    pub fn new(event_sender: Option<EventSender>, command_log: Option<Arc<CommandLog>>) -> Self {
        Self {
            event_sender,
            command_log,
        }
    }

    /// Path of the per-run command log, if one is attached
    #[must_use]
    pub fn log_path(&self) -> Option<PathBuf> {
        self.command_log.as_ref().map(|log| log.path().to_path_buf())
    }

    #[must_use]
    pub fn command_log(&self) -> Option<&CommandLog> {
        self.command_log.as_deref()
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Main platform abstraction providing access to process operations
#[derive(Clone)]
pub struct Platform {
    process_ops: Arc<dyn ProcessOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementation
    #[must_use]
    pub fn new(process_ops: Arc<dyn ProcessOperations>) -> Self {
        Self { process_ops }
    }

    /// The real host
    #[must_use]
    pub fn current() -> Self {
        Self::new(Arc::new(LinuxProcessOperations::new()))
    }

    /// Access process operations
    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Create a new command builder
    #[must_use]
    pub fn command(&self, program: &str) -> PlatformCommand {
        PlatformCommand::new(program)
    }

    /// Execute a command, emitting events and appending to the command log
    ///
    /// # Errors
    ///
    /// Returns an error only when the process cannot be spawned.
    pub async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        let descriptor = ProcessCommandDescriptor {
            program: cmd.program().to_string(),
            args: cmd.get_args().to_vec(),
            cwd: cmd.get_current_dir().cloned(),
        };
        ctx.emit(AppEvent::Platform(PlatformEvent::ProcessStarted {
            command: descriptor.clone(),
        }));

        let result = self.process_ops.execute_command(&cmd).await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(output) => {
                if let Some(log) = ctx.command_log() {
                    if let Err(err) = log.record(&cmd, output).await {
                        tracing::warn!(error = %err, "command log write failed");
                    }
                }
                ctx.emit(AppEvent::Platform(PlatformEvent::ProcessCompleted {
                    command: descriptor,
                    exit_code: output.exit_code,
                    duration_ms,
                }));
            }
            Err(err) => {
                if let Some(log) = ctx.command_log() {
                    let _ = log.note(&format!("$ {} failed to start: {err}", cmd)).await;
                }
                ctx.emit(AppEvent::Platform(PlatformEvent::ProcessFailed {
                    command: descriptor,
                    failure: FailureContext::from_error(err),
                    duration_ms,
                }));
            }
        }

        result
    }

    /// Whether an executable is reachable on `PATH`
    pub async fn has_program(&self, program: &str) -> bool {
        self.process_ops.which(program).await.is_ok()
    }

    /// Convenience: run and report only whether the command exited zero
    pub async fn succeeds(&self, ctx: &PlatformContext, cmd: PlatformCommand) -> bool {
        self.execute_command(ctx, cmd)
            .await
            .is_ok_and(|output| output.success())
    }

    /// Change owner of a path through `chown`
    ///
    /// # Errors
    ///
    /// Returns an error if `chown` cannot be spawned; a non-zero exit is
    /// returned in the output.
    pub async fn chown(
        &self,
        ctx: &PlatformContext,
        owner: &str,
        path: &Path,
        recursive: bool,
    ) -> Result<CommandOutput, Error> {
        let mut cmd = self.command("chown");
        if recursive {
            cmd = cmd.arg("-R");
        }
        let cmd = cmd
            .arg(format!("{owner}:{owner}"))
            .arg(path.display().to_string());
        self.execute_command(ctx, cmd).await
    }
}
