//! Daemon JSON-RPC error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RpcError {
    #[error("daemon RPC unreachable at {endpoint}: {message}")]
    Unreachable { endpoint: String, message: String },

    #[error("daemon rejected RPC credentials")]
    Unauthorized,

    #[error("RPC method {method} failed with code {code}: {message}")]
    Remote {
        method: String,
        code: i64,
        message: String,
    },

    #[error("malformed RPC response for {method}: {message}")]
    MalformedResponse { method: String, message: String },

    #[error("daemon not ready after {attempts} attempts")]
    NotReady { attempts: u32 },
}
