//! Wallet configuration.
//!
//! Every struct implements `Default` and deserializes with missing fields
//! filled from it, so callers can load a partial JSON or TOML document.

use std::time::Duration;

use flo_p2p::PeerConfig;
use flo_rpc::RpcConfig;
use flo_script::Network;
use serde::{Deserialize, Serialize};

/// Mempool chain ceilings and throttle timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainLimits {
    /// Most unconfirmed ancestors before sends are throttled.
    pub max_ancestor_count: u64,
    /// Most unconfirmed ancestor bytes before sends are throttled.
    pub max_ancestor_size: u64,
    /// Milliseconds between mempool polls while throttled.
    pub poll_interval_ms: u64,
    /// Seconds without progress before peers are asked to relay the chain.
    pub repair_after_secs: u64,
}

impl ChainLimits {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn repair_after(&self) -> Duration {
        Duration::from_secs(self.repair_after_secs)
    }
}

impl Default for ChainLimits {
    fn default() -> Self {
        Self {
            max_ancestor_count: 1250,
            max_ancestor_size: 1_750_000,
            poll_interval_ms: 1000,
            repair_after_secs: 60,
        }
    }
}

/// Configuration for a [`Wallet`](crate::Wallet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// WIF-encoded private key.
    pub wif: String,
    pub network: Network,
    /// Label the key is imported under on the node.
    pub label: String,
    pub rpc: RpcConfig,
    pub peer: PeerConfig,
    pub limits: ChainLimits,
    /// Fee rate in satoshis per 1000 bytes.
    pub fee_per_kb: u64,
    /// Fee floor in satoshis.
    pub min_fee: u64,
}

impl WalletConfig {
    /// Fee for a transaction of `size` bytes.
    pub fn fee_for(&self, size: usize) -> u64 {
        let rated = (size as u64).saturating_mul(self.fee_per_kb) / 1000;
        rated.max(self.min_fee)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            wif: String::new(),
            network: Network::Mainnet,
            label: "flo-sdk".to_string(),
            rpc: RpcConfig::default(),
            peer: PeerConfig::default(),
            limits: ChainLimits::default(),
            fee_per_kb: 100_000,
            min_fee: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_for() {
        let config = WalletConfig::default();
        assert_eq!(config.fee_for(250), 25_000);
        assert_eq!(config.fee_for(50), 10_000);
        assert_eq!(config.fee_for(1234), 123_400);
    }

    #[test]
    fn test_partial_document() {
        let config: WalletConfig = serde_json::from_value(serde_json::json!({
            "wif": "cVt4o7BGAig1UXywgGSmARhxMdzP5qvQsxKkSsc1XEkw3tDTQFpy",
            "network": "regtest",
            "limits": { "max_ancestor_count": 25 }
        }))
        .unwrap();
        assert_eq!(config.network, Network::Regtest);
        assert_eq!(config.limits.max_ancestor_count, 25);
        assert_eq!(config.limits.max_ancestor_size, 1_750_000);
        assert_eq!(config.limits.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.rpc.url, "http://127.0.0.1:7313");
        assert_eq!(config.peer.grace_period(), Duration::from_secs(5));
    }
}
