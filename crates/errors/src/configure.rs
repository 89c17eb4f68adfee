//! Interactive configurator error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ConfigureError {
    #[error("{gate} check failed and continuation was declined")]
    ResourceGateDeclined { gate: String },

    #[error("prompt failed: {message}")]
    PromptFailed { message: String },

    #[error("no answer available for prompt: {prompt}")]
    AnswersExhausted { prompt: String },

    #[error("invalid answer for {prompt}: {message}")]
    InvalidAnswer { prompt: String, message: String },
}
