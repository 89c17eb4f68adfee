//! CLI error handling

use std::fmt;

use nodectl_errors::UserFacingError;

#[derive(Debug)]
pub enum CliError {
    Ops(nodectl_errors::Error),
    Prompt(String),
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Ops(e) => {
                write!(f, "{}", e.user_message())?;
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::Prompt(msg) => write!(f, "Failed to get confirmation: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

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

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Prompt(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
