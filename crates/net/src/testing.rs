//! In-memory daemon for tests
//!
//! [`FakeNode`] answers the [`NodeRpc`] calls from shared state and doubles
//! as an [`RpcConnector`] handing out clones of itself, so code that
//! connects by endpoint talks to the same fake.

use async_trait::async_trait;
use nodectl_errors::RpcError;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::rpc::{
    BlockchainInfo, NodeRpc, RpcConnector, RpcEndpoint, RPC_IN_WARMUP, RPC_WALLET_NOT_FOUND,
};

#[derive(Default)]
struct NodeState {
    wallets: BTreeMap<String, Vec<String>>,
    loaded: BTreeSet<String>,
    load_on_startup: BTreeSet<String>,
    balances: BTreeMap<String, f64>,
    warmup_polls: u32,
    unauthorized: bool,
    stopped: bool,
    endpoints: Vec<String>,
    blocks: u64,
    headers: u64,
}

#[derive(Default, Clone)]
pub struct FakeNode {
    state: Arc<Mutex<NodeState>>,
    polls: Arc<AtomicU32>,
}

impl FakeNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `getblockchaininfo` with a warm-up error this many times
    #[must_use]
    pub fn warming_up(self, polls: u32) -> Self {
        self.state().warmup_polls = polls;
        self
    }

    /// Reject every call with bad credentials
    #[must_use]
    pub fn unauthorized(self) -> Self {
        self.state().unauthorized = true;
        self
    }

    #[must_use]
    pub fn with_wallet(self, name: &str, balance: f64) -> Self {
        {
            let mut state = self.state();
            state.wallets.entry(name.to_string()).or_default();
            state.loaded.insert(name.to_string());
            state.load_on_startup.insert(name.to_string());
            state.balances.insert(name.to_string(), balance);
        }
        self
    }

    /// A wallet on disk that the running daemon has not loaded
    #[must_use]
    pub fn with_unloaded_wallet(self, name: &str, balance: f64) -> Self {
        {
            let mut state = self.state();
            state.wallets.entry(name.to_string()).or_default();
            state.balances.insert(name.to_string(), balance);
        }
        self
    }

    #[must_use]
    pub fn with_height(self, blocks: u64, headers: u64) -> Self {
        {
            let mut state = self.state();
            state.blocks = blocks;
            state.headers = headers;
        }
        self
    }

    #[must_use]
    pub fn wallets(&self) -> Vec<String> {
        self.state().wallets.keys().cloned().collect()
    }

    /// Wallets the daemon currently has loaded
    #[must_use]
    pub fn loaded_wallets(&self) -> Vec<String> {
        self.state().loaded.iter().cloned().collect()
    }

    #[must_use]
    pub fn addresses(&self, wallet: &str) -> Vec<String> {
        self.state().wallets.get(wallet).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn stopped(&self) -> bool {
        self.state().stopped
    }

    /// URLs passed to [`RpcConnector::connect`]
    #[must_use]
    pub fn endpoints(&self) -> Vec<String> {
        self.state().endpoints.clone()
    }

    #[must_use]
    pub fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    fn state(&self) -> MutexGuard<'_, NodeState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn authorized(&self) -> Result<MutexGuard<'_, NodeState>, RpcError> {
        let state = self.state();
        if state.unauthorized {
            Err(RpcError::Unauthorized)
        } else {
            Ok(state)
        }
    }
}

fn no_wallet(wallet: &str) -> RpcError {
    RpcError::Remote {
        method: "wallet".to_string(),
        code: RPC_WALLET_NOT_FOUND,
        message: format!("Requested wallet does not exist or is not loaded: {wallet}"),
    }
}

#[async_trait]
impl NodeRpc for FakeNode {
    async fn get_blockchain_info(&self) -> Result<BlockchainInfo, RpcError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.authorized()?;
        if state.warmup_polls > 0 {
            state.warmup_polls -= 1;
            return Err(RpcError::Remote {
                method: "getblockchaininfo".to_string(),
                code: RPC_IN_WARMUP,
                message: "Loading block index...".to_string(),
            });
        }
        #[allow(clippy::cast_precision_loss)]
        let progress = if state.headers == 0 {
            0.0
        } else {
            state.blocks as f64 / state.headers as f64
        };
        Ok(BlockchainInfo {
            chain: "main".to_string(),
            blocks: state.blocks,
            headers: state.headers,
            verification_progress: progress,
            initial_block_download: state.blocks < state.headers,
            pruned: false,
        })
    }

    async fn create_wallet(&self, name: &str) -> Result<(), RpcError> {
        let mut state = self.authorized()?;
        state.wallets.entry(name.to_string()).or_default();
        state.loaded.insert(name.to_string());
        state.load_on_startup.insert(name.to_string());
        Ok(())
    }

    async fn load_wallet(&self, name: &str) -> Result<(), RpcError> {
        let mut state = self.authorized()?;
        if !state.wallets.contains_key(name) {
            return Err(no_wallet(name));
        }
        state.loaded.insert(name.to_string());
        state.load_on_startup.insert(name.to_string());
        Ok(())
    }

    async fn get_new_address(&self, wallet: &str) -> Result<String, RpcError> {
        let mut state = self.authorized()?;
        if !state.loaded.contains(wallet) {
            return Err(no_wallet(wallet));
        }
        let addresses = state.wallets.get_mut(wallet).ok_or_else(|| no_wallet(wallet))?;
        let address = format!("ltc1qfake{}{}", wallet.len(), addresses.len());
        addresses.push(address.clone());
        Ok(address)
    }

    async fn get_balance(&self, wallet: &str) -> Result<f64, RpcError> {
        let state = self.authorized()?;
        if !state.loaded.contains(wallet) {
            return Err(no_wallet(wallet));
        }
        Ok(state.balances.get(wallet).copied().unwrap_or_default())
    }

    /// The next start brings back only the wallets marked for startup
    async fn stop(&self) -> Result<(), RpcError> {
        let mut state = self.authorized()?;
        state.stopped = true;
        state.loaded = state.load_on_startup.clone();
        Ok(())
    }
}

impl RpcConnector for FakeNode {
    fn connect(&self, endpoint: &RpcEndpoint) -> Arc<dyn NodeRpc> {
        self.state().endpoints.push(endpoint.url.clone());
        Arc::new(self.clone())
    }
}
