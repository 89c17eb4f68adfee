//! Per-run command log
//!
//! Captured output of every command a run executes is appended here so a
//! failing step can point the operator at the full text.

use chrono::Utc;
use nodectl_errors::{Error, PlatformError};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::process::{CommandOutput, PlatformCommand};

#[derive(Debug)]
pub struct CommandLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl CommandLog {
    /// Create `run-<timestamp>.log` inside `dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub async fn create(dir: &Path) -> Result<Self, Error> {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| log_error(dir, &e))?;
        let path = dir.join(format!("run-{}.log", Utc::now().format("%Y%m%d-%H%M%S")));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| log_error(&path, &e))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a command and its captured output
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    pub async fn record(&self, cmd: &PlatformCommand, output: &CommandOutput) -> Result<(), Error> {
        let mut entry = format!(
            "=== {} $ {} ({})\n",
            Utc::now().to_rfc3339(),
            cmd.command_line(),
            output.status_description()
        );
        for (label, text) in [("stdout", &output.stdout), ("stderr", &output.stderr)] {
            if !text.is_empty() {
                entry.push_str(&format!("--- {label}\n{text}"));
                if !text.ends_with('\n') {
                    entry.push('\n');
                }
            }
        }
        self.append(&entry).await
    }

    /// Append a free-form note
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    pub async fn note(&self, message: &str) -> Result<(), Error> {
        self.append(&format!("=== {} {message}\n", Utc::now().to_rfc3339()))
            .await
    }

    async fn append(&self, text: &str) -> Result<(), Error> {
        let mut file = self.file.lock().await;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| log_error(&self.path, &e))?;
        file.flush().await.map_err(|e| log_error(&self.path, &e))
    }
}

fn log_error(path: &Path, err: &std::io::Error) -> Error {
    PlatformError::FilesystemOperationFailed {
        operation: format!("write command log {}", path.display()),
        message: err.to_string(),
    }
    .into()
}
