//! Daemon JSON-RPC client
//!
//! Only the handful of calls nodectl needs are exposed, through the
//! [`NodeRpc`] trait so wallet provisioning and wallet management can be
//! tested against an in-memory daemon.

use async_trait::async_trait;
use nodectl_errors::RpcError;
use nodectl_types::{NodeConfig, Secret};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Error code the daemon returns while it is still loading
pub const RPC_IN_WARMUP: i64 = -28;
/// Error code for "wallet already exists"
pub const RPC_WALLET_ERROR: i64 = -4;
/// Error code for "wallet does not exist or is not loaded"
pub const RPC_WALLET_NOT_FOUND: i64 = -18;
/// Error code for "wallet already loaded"
pub const RPC_WALLET_ALREADY_LOADED: i64 = -35;

/// Where and how to reach the daemon's RPC interface
#[derive(Debug, Clone)]
pub struct RpcEndpoint {
    pub url: String,
    pub user: String,
    pub password: Secret,
}

impl RpcEndpoint {
    #[must_use]
    pub fn new(url: impl Into<String>, user: impl Into<String>, password: Secret) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password,
        }
    }

    /// Local endpoint for a configured node
    #[must_use]
    pub fn for_config(config: &NodeConfig) -> Self {
        Self::new(
            config.local_rpc_url(),
            config.auth.rpc_user.clone(),
            config.auth.rpc_password.clone(),
        )
    }

    fn wallet_url(&self, wallet: &str) -> String {
        format!("{}/wallet/{wallet}", self.url.trim_end_matches('/'))
    }
}

/// Subset of `getblockchaininfo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainInfo {
    pub chain: String,
    pub blocks: u64,
    pub headers: u64,
    #[serde(rename = "verificationprogress")]
    pub verification_progress: f64,
    #[serde(rename = "initialblockdownload", default)]
    pub initial_block_download: bool,
    #[serde(default)]
    pub pruned: bool,
}

/// RPC calls nodectl issues against the daemon
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn get_blockchain_info(&self) -> Result<BlockchainInfo, RpcError>;

    /// Create a wallet; an existing wallet of the same name is loaded instead.
    /// Either way the daemon loads it again on every start.
    async fn create_wallet(&self, name: &str) -> Result<(), RpcError>;

    /// Load a wallet from disk and mark it for loading on start
    async fn load_wallet(&self, name: &str) -> Result<(), RpcError>;

    async fn get_new_address(&self, wallet: &str) -> Result<String, RpcError>;

    async fn get_balance(&self, wallet: &str) -> Result<f64, RpcError>;

    /// Ask the daemon to shut down
    async fn stop(&self) -> Result<(), RpcError>;
}

/// Produces [`NodeRpc`] handles for an endpoint
pub trait RpcConnector: Send + Sync {
    fn connect(&self, endpoint: &RpcEndpoint) -> Arc<dyn NodeRpc>;
}

/// JSON-RPC 1.0 over HTTP with basic auth
pub struct RpcClient {
    client: Client,
    endpoint: RpcEndpoint,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcClient {
    #[must_use]
    pub fn new(endpoint: RpcEndpoint) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(&self, url: &str, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "1.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::debug!(method, url, "rpc call");

        let response = self
            .client
            .post(url)
            .basic_auth(&self.endpoint.user, Some(self.endpoint.password.expose()))
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Unreachable {
                endpoint: self.endpoint.url.clone(),
                message: e.to_string(),
            })?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(RpcError::Unauthorized);
        }

        // Errors arrive with 404/500 status and a JSON body
        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::MalformedResponse {
                method: method.to_string(),
                message: e.to_string(),
            })?;

        if let Some(error) = parsed.error {
            return Err(RpcError::Remote {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }
        Ok(parsed.result.unwrap_or(Value::Null))
    }

    async fn node_call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.call(&self.endpoint.url, method, params).await
    }

    async fn wallet_call(&self, wallet: &str, method: &str, params: Value) -> Result<Value, RpcError> {
        self.call(&self.endpoint.wallet_url(wallet), method, params)
            .await
    }
}

fn decode<T: serde::de::DeserializeOwned>(method: &str, value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|e| RpcError::MalformedResponse {
        method: method.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl NodeRpc for RpcClient {
    async fn get_blockchain_info(&self) -> Result<BlockchainInfo, RpcError> {
        let value = self.node_call("getblockchaininfo", json!([])).await?;
        decode("getblockchaininfo", value)
    }

    async fn create_wallet(&self, name: &str) -> Result<(), RpcError> {
        let params = json!({"wallet_name": name, "load_on_startup": true});
        match self.node_call("createwallet", params).await {
            Ok(_) => Ok(()),
            Err(RpcError::Remote { code, .. }) if code == RPC_WALLET_ERROR => {
                self.load_wallet(name).await
            }
            Err(err) => Err(err),
        }
    }

    async fn load_wallet(&self, name: &str) -> Result<(), RpcError> {
        let params = json!({"filename": name, "load_on_startup": true});
        match self.node_call("loadwallet", params).await {
            Ok(_) => Ok(()),
            Err(RpcError::Remote { code, .. }) if code == RPC_WALLET_ALREADY_LOADED => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn get_new_address(&self, wallet: &str) -> Result<String, RpcError> {
        let value = self.wallet_call(wallet, "getnewaddress", json!([])).await?;
        decode("getnewaddress", value)
    }

    async fn get_balance(&self, wallet: &str) -> Result<f64, RpcError> {
        let value = self.wallet_call(wallet, "getbalance", json!([])).await?;
        decode("getbalance", value)
    }

    async fn stop(&self) -> Result<(), RpcError> {
        self.node_call("stop", json!([])).await.map(|_| ())
    }
}

/// Connects real [`RpcClient`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpRpcConnector;

impl RpcConnector for HttpRpcConnector {
    fn connect(&self, endpoint: &RpcEndpoint) -> Arc<dyn NodeRpc> {
        Arc::new(RpcClient::new(endpoint.clone()))
    }
}
