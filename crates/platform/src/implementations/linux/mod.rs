//! Linux process operations implementation

use async_trait::async_trait;
use nodectl_errors::{Error, PlatformError};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Runs commands on the real host with `tokio::process`
#[derive(Debug, Default)]
pub struct LinuxProcessOperations;

impl LinuxProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessOperations for LinuxProcessOperations {
    async fn execute_command(&self, cmd: &PlatformCommand) -> Result<CommandOutput, Error> {
        let mut command = Command::new(cmd.program());
        command
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }

        for (key, value) in cmd.get_env_vars() {
            command.env(key, value);
        }

        let output = command.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlatformError::CommandNotFound {
                    command: cmd.program().to_string(),
                }
            } else {
                PlatformError::ProcessExecutionFailed {
                    command: cmd.program().to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn which(&self, program: &str) -> Result<PathBuf, Error> {
        which::which(program).map_err(|_| {
            PlatformError::CommandNotFound {
                command: program.to_string(),
            }
            .into()
        })
    }
}
