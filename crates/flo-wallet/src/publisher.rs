//! Publishing payloads as one transaction or as a signed multipart chain.

use std::fmt;
use std::future::Future;

use flo_multipart::{MessageSigner, Splitter};
use flo_transaction::MAX_FLO_DATA_LEN;
use tracing::{debug, info};

use crate::WalletError;

/// Broadcasts one `floData` transaction.
pub trait DataSender {
    /// Send a transaction carrying `data`, returning its txid.
    fn send_data(&self, data: &[u8]) -> impl Future<Output = Result<String, WalletError>> + Send;
}

/// The step of a publish that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Sign,
    Validate,
    Broadcast,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PublishStage::Sign => "sign",
            PublishStage::Validate => "validate",
            PublishStage::Broadcast => "broadcast",
        })
    }
}

/// A failed publish, with the txids that made it on chain before the
/// failure so the caller can resume.
#[derive(Debug, thiserror::Error)]
#[error("publish failed at {stage} after {} transactions: {source}", .txids.len())]
pub struct PublishError {
    pub stage: PublishStage,
    pub txids: Vec<String>,
    pub source: WalletError,
}

impl PublishError {
    fn new(stage: PublishStage, txids: &[String], source: impl Into<WalletError>) -> Self {
        PublishError { stage, txids: txids.to_vec(), source: source.into() }
    }
}

/// Drives a publish through a sender and a signer.
pub struct Publisher<'a, D, S> {
    sender: &'a D,
    signer: &'a S,
}

impl<'a, D, S> Publisher<'a, D, S>
where
    D: DataSender + Sync,
    S: MessageSigner + Sync,
{
    pub fn new(sender: &'a D, signer: &'a S) -> Self {
        Publisher { sender, signer }
    }

    /// Publish `payload`.
    ///
    /// Up to 1040 bytes go out as one transaction. Larger payloads are
    /// split and sent in part order, every later part referencing the
    /// first part's txid.
    ///
    /// # Returns
    /// The txids in part order.
    pub async fn publish(&self, payload: &str) -> Result<Vec<String>, PublishError> {
        if payload.len() <= MAX_FLO_DATA_LEN {
            let txid = self
                .sender
                .send_data(payload.as_bytes())
                .await
                .map_err(|e| PublishError::new(PublishStage::Broadcast, &[], e))?;
            info!(txid = %txid, bytes = payload.len(), "published");
            return Ok(vec![txid]);
        }

        let splitter = Splitter::split(payload, &self.signer.address())
            .map_err(|e| PublishError::new(PublishStage::Validate, &[], e))?;
        self.publish_chunks(splitter).await
    }

    /// Publish a prepared split.
    ///
    /// Chunks whose chain metadata already carries a txid count as sent and
    /// are skipped, so a failed publish can be resumed with the same
    /// chunks.
    pub async fn publish_chunks(&self, splitter: Splitter) -> Result<Vec<String>, PublishError> {
        let total = splitter.len();
        let mut txids: Vec<String> = Vec::with_capacity(total);

        for mut chunk in splitter.into_chunks() {
            if let Some(meta) = chunk.chain_meta().filter(|m| !m.txid.is_empty()) {
                debug!(part = ?chunk.part(), txid = %meta.txid, "chunk already published");
                txids.push(meta.txid.clone());
                continue;
            }

            if let Some(first) = txids.first() {
                chunk.set_reference(first.as_str());
            }
            if chunk.signature().is_none() {
                chunk
                    .sign_with(self.signer)
                    .await
                    .map_err(|e| PublishError::new(PublishStage::Sign, &txids, e))?;
            }
            chunk
                .validate()
                .map_err(|e| PublishError::new(PublishStage::Validate, &txids, e))?;

            let txid = self
                .sender
                .send_data(chunk.to_string().as_bytes())
                .await
                .map_err(|e| PublishError::new(PublishStage::Broadcast, &txids, e))?;
            info!(part = ?chunk.part(), max = ?chunk.max(), txid = %txid, "published chunk");
            txids.push(txid);
        }
        Ok(txids)
    }
}
