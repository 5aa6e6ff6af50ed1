//! RPC data types: configuration, the JSON-RPC envelope and result shapes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Satoshis per coin.
pub const COIN: f64 = 100_000_000.0;

/// Configuration for an [`RpcClient`](crate::RpcClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Endpoint URL (e.g. `http://127.0.0.1:7313`).
    pub url: String,
    /// Basic-auth user.
    pub user: String,
    /// Basic-auth password.
    pub password: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl RpcConfig {
    /// The request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:7313".to_string(),
            user: String::new(),
            password: String::new(),
            timeout_secs: 30,
        }
    }
}

/// A JSON-RPC request.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    /// Protocol version tag.
    pub jsonrpc: &'static str,
    /// Request id, echoed by the node.
    pub id: u64,
    /// Method name.
    pub method: &'a str,
    /// Positional parameters.
    pub params: serde_json::Value,
}

/// The node's error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// JSON-RPC error code.
    pub code: i64,
    /// Error message.
    pub message: String,
}

/// A JSON-RPC response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    /// The result, absent or null on error.
    pub result: Option<T>,
    /// The error, absent or null on success.
    #[serde(default)]
    pub error: Option<RemoteError>,
    /// Echoed request id.
    #[serde(default)]
    pub id: serde_json::Value,
}

/// An entry of `listunspent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnspentOutput {
    /// Funding transaction id.
    pub txid: String,
    /// Output index.
    pub vout: u32,
    /// Address the output pays to.
    #[serde(default)]
    pub address: Option<String>,
    /// Locking script hex.
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: String,
    /// Value in coins.
    pub amount: f64,
    /// Number of confirmations.
    #[serde(default)]
    pub confirmations: u64,
    /// Whether the node's wallet can spend it.
    #[serde(default)]
    pub spendable: bool,
}

impl UnspentOutput {
    /// Value in satoshis.
    pub fn satoshis(&self) -> u64 {
        (self.amount * COIN).round() as u64
    }
}

/// Result of `getmempoolentry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MempoolEntry {
    /// Number of in-mempool ancestors, this transaction included.
    #[serde(rename = "ancestorcount")]
    pub ancestor_count: u64,
    /// Size of in-mempool ancestors, this transaction included.
    #[serde(rename = "ancestorsize")]
    pub ancestor_size: u64,
    /// Number of in-mempool descendants, this transaction included.
    #[serde(rename = "descendantcount", default)]
    pub descendant_count: u64,
    /// Serialized size.
    #[serde(default)]
    pub size: u64,
    /// Unconfirmed parents.
    #[serde(default)]
    pub depends: Vec<String>,
}

/// Result of verbose `getrawtransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransactionInfo {
    /// Transaction id.
    pub txid: String,
    /// Serialized transaction hex.
    #[serde(default)]
    pub hex: String,
    /// Confirmations; absent or zero while unconfirmed.
    #[serde(default)]
    pub confirmations: u64,
    /// Containing block, once mined.
    #[serde(default)]
    pub blockhash: Option<String>,
}

/// An entry of `getpeerinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    /// Node-local peer id.
    pub id: u64,
    /// `host:port` of the peer.
    pub addr: String,
    /// Whether the peer connected to the node.
    #[serde(default)]
    pub inbound: bool,
    /// Peer's user agent.
    #[serde(default)]
    pub subver: String,
}
