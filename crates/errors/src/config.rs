//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("path for {field} must be absolute: {path}")]
    RelativePath { field: String, path: String },

    #[error("wallet directory {wallet_dir} is not inside data directory {data_dir}")]
    WalletOutsideDataDir { wallet_dir: String, data_dir: String },

    #[error("pool-backend role requires loopback RPC binding, got {address}")]
    PoolBindNotLoopback { address: String },

    #[error("pool wallet settings are only valid for the pool-backend role")]
    PoolWalletWithoutPoolRole,

    #[error("failed to write config to {path}: {error}")]
    WriteError { path: String, error: String },

    #[error("failed to serialize config: {error}")]
    SerializeError { error: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Create /etc/nodectl/config.toml or unset NODECTL_CONFIG to use defaults.")
            }
            Self::MissingField { .. } => {
                Some("Add the missing configuration field noted in the error message.")
            }
            Self::InvalidValue { .. } | Self::Invalid { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and retry the command.")
            }
            Self::RelativePath { .. } | Self::WalletOutsideDataDir { .. } => {
                Some("Use absolute paths and keep the wallet directory under the data directory.")
            }
            Self::WriteError { .. } => Some("Ensure the config path is writable and retry."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NotFound { .. } => "config.not_found",
            Self::ParseError { .. } => "config.parse",
            Self::WriteError { .. } => "config.write",
            _ => "config.invalid",
        })
    }
}
