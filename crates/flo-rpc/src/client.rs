//! JSON-RPC HTTP client for the node daemon.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::RpcError;
use crate::types::{
    MempoolEntry, PeerInfo, RawTransactionInfo, RpcConfig, RpcRequest, RpcResponse, UnspentOutput,
};

/// The node calls the wallet makes.
pub trait NodeRpc {
    /// Add a key to the node's wallet.
    fn import_private_key(
        &self,
        wif: &str,
        label: &str,
        rescan: bool,
    ) -> impl Future<Output = Result<(), RpcError>> + Send;

    /// Unspent outputs paying to any of `addresses`.
    fn list_unspent(
        &self,
        min_conf: u32,
        max_conf: u32,
        addresses: &[String],
    ) -> impl Future<Output = Result<Vec<UnspentOutput>, RpcError>> + Send;

    /// The mempool entry for `txid`, or `None` when it is not in the mempool.
    fn get_mempool_entry(
        &self,
        txid: &str,
    ) -> impl Future<Output = Result<Option<MempoolEntry>, RpcError>> + Send;

    /// Serialized transaction hex.
    fn get_raw_transaction(
        &self,
        txid: &str,
    ) -> impl Future<Output = Result<String, RpcError>> + Send;

    /// Decoded transaction with confirmation data.
    fn get_raw_transaction_verbose(
        &self,
        txid: &str,
    ) -> impl Future<Output = Result<RawTransactionInfo, RpcError>> + Send;

    /// The node's connected peers.
    fn get_peer_info(&self) -> impl Future<Output = Result<Vec<PeerInfo>, RpcError>> + Send;

    /// Broadcast a transaction, returning its txid.
    fn send_raw_transaction(
        &self,
        hex: &str,
    ) -> impl Future<Output = Result<String, RpcError>> + Send;
}

/// HTTP client for the node's JSON-RPC interface.
#[derive(Debug, Clone)]
pub struct RpcClient {
    /// Client configuration.
    config: RpcConfig,
    /// Underlying HTTP client.
    client: reqwest::Client,
    /// Next request id.
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Create a client with the given configuration.
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, client, next_id: Arc::new(AtomicU64::new(1)) })
    }

    /// The client's configuration.
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Call `method` with positional `params` and decode the result.
    ///
    /// # Returns
    /// The decoded result, `RpcError::Remote` for a node error object, or
    /// `RpcError::EmptyResult` when the result is missing or null.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest { jsonrpc: "1.0", id, method, params };
        debug!(method, id, "rpc call");

        let resp = self
            .client
            .post(&self.config.url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&request)
            .send()
            .await?;

        // Remote errors arrive with HTTP 500 and a JSON body.
        let status = resp.status();
        let body = resp.bytes().await?;
        let response: RpcResponse<T> = match serde_json::from_slice(&body) {
            Ok(r) => r,
            Err(_) if !status.is_success() => return Err(RpcError::Status(status.as_u16())),
            Err(e) => return Err(e.into()),
        };

        if let Some(err) = response.error {
            debug!(method, code = err.code, message = %err.message, "rpc error");
            return Err(RpcError::Remote { code: err.code, message: err.message });
        }
        response.result.ok_or_else(|| RpcError::EmptyResult(method.to_string()))
    }

    /// Call a method whose result is `null` on success.
    async fn call_unit(&self, method: &str, params: Value) -> Result<(), RpcError> {
        match self.call::<Value>(method, params).await {
            Ok(_) | Err(RpcError::EmptyResult(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl NodeRpc for RpcClient {
    async fn import_private_key(&self, wif: &str, label: &str, rescan: bool) -> Result<(), RpcError> {
        self.call_unit("importprivkey", json!([wif, label, rescan])).await
    }

    async fn list_unspent(
        &self,
        min_conf: u32,
        max_conf: u32,
        addresses: &[String],
    ) -> Result<Vec<UnspentOutput>, RpcError> {
        self.call("listunspent", json!([min_conf, max_conf, addresses])).await
    }

    async fn get_mempool_entry(&self, txid: &str) -> Result<Option<MempoolEntry>, RpcError> {
        match self.call("getmempoolentry", json!([txid])).await {
            Ok(entry) => Ok(Some(entry)),
            Err(e) if e.is_not_in_mempool() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_raw_transaction(&self, txid: &str) -> Result<String, RpcError> {
        self.call("getrawtransaction", json!([txid, 0])).await
    }

    async fn get_raw_transaction_verbose(&self, txid: &str) -> Result<RawTransactionInfo, RpcError> {
        self.call("getrawtransaction", json!([txid, 1])).await
    }

    async fn get_peer_info(&self) -> Result<Vec<PeerInfo>, RpcError> {
        self.call("getpeerinfo", json!([])).await
    }

    async fn send_raw_transaction(&self, hex: &str) -> Result<String, RpcError> {
        self.call("sendrawtransaction", json!([hex])).await
    }
}
