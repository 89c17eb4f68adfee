#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for nodectl
//!
//! Two unrelated clients live here: a retrying HTTP client used for the
//! upstream release lookup, and the JSON-RPC client that talks to the
//! installed daemon.

mod client;
mod release;
pub mod rpc;
#[cfg(feature = "testing")]
pub mod testing;

pub use client::{NetClient, NetConfig};
pub use release::{fetch_latest_tag, parse_release_tag, tag_from_release_body};
pub use rpc::{
    BlockchainInfo, HttpRpcConnector, NodeRpc, RpcClient, RpcConnector, RpcEndpoint,
};
