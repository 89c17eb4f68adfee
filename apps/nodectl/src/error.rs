//! CLI error handling

use std::fmt;

use nodectl_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Tool configuration could not be loaded
    Config(nodectl_errors::Error),
    /// Anything raised while surveying or running a mode
    Ops(nodectl_errors::Error),
    /// Terminal I/O failed
    Io(std::io::Error),
}

impl CliError {
    /// A declined confirmation is a clean exit
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Ops(e) => e.exit_code(),
            CliError::Config(_) | CliError::Io(_) => 1,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, CliError::Ops(e) if e.is_cancellation())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e.user_message()),
            CliError::Ops(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<nodectl_errors::Error> for CliError {
    fn from(e: nodectl_errors::Error) -> Self {
        CliError::Ops(e)
    }
}

impl From<nodectl_errors::ProbeError> for CliError {
    fn from(e: nodectl_errors::ProbeError) -> Self {
        CliError::Ops(e.into())
    }
}

impl From<nodectl_errors::ConfigureError> for CliError {
    fn from(e: nodectl_errors::ConfigureError) -> Self {
        CliError::Ops(e.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
