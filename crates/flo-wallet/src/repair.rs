//! Rebroadcasting a stalled chain directly to the node's peers.

use std::future::Future;

use flo_p2p::{P2pError, PeerAnnouncer, PeerConfig};
use flo_rpc::NodeRpc;
use flo_script::Network;
use flo_transaction::Transaction;
use futures::future::join_all;
use tracing::{info, warn};

use crate::WalletError;

/// Pushes pending transactions back into the network.
pub trait Repairer {
    /// Relay `pending` (raw hex, oldest first).
    ///
    /// # Returns
    /// How many peers accepted the announcement.
    fn repair(&self, pending: &[String]) -> impl Future<Output = Result<usize, WalletError>> + Send;
}

/// Announces the chain to every peer the node reports, serving `getdata`
/// for a grace period on each connection.
#[derive(Debug, Clone)]
pub struct PeerRepair<R> {
    rpc: R,
    network: Network,
    config: PeerConfig,
}

impl<R: NodeRpc + Sync> PeerRepair<R> {
    pub fn new(rpc: R, network: Network, config: PeerConfig) -> Self {
        PeerRepair { rpc, network, config }
    }

    async fn repair_peer(&self, addr: &str, txs: &[Transaction]) -> Result<usize, P2pError> {
        let mut peer = PeerAnnouncer::new(addr, self.network, self.config.clone());
        peer.connect().await?;
        let result = match peer.announce(txs).await {
            Ok(()) => peer.serve_for(self.config.grace_period()).await,
            Err(e) => Err(e),
        };
        peer.destroy().await;
        result
    }
}

impl<R: NodeRpc + Sync> Repairer for PeerRepair<R> {
    async fn repair(&self, pending: &[String]) -> Result<usize, WalletError> {
        if pending.is_empty() {
            return Ok(0);
        }
        let txs = pending
            .iter()
            .map(|hex| Transaction::from_hex(hex))
            .collect::<Result<Vec<_>, _>>()?;
        let peers = self.rpc.get_peer_info().await?;

        let results = join_all(peers.iter().map(|p| self.repair_peer(&p.addr, &txs))).await;

        let mut reached = 0;
        for (peer, result) in peers.iter().zip(results) {
            match result {
                Ok(served) => {
                    reached += 1;
                    info!(peer = %peer.addr, served, "repair announced chain");
                }
                Err(e) => warn!(peer = %peer.addr, error = %e, "repair skipped peer"),
            }
        }
        info!(peers = peers.len(), reached, pending = pending.len(), "repair finished");
        Ok(reached)
    }
}
