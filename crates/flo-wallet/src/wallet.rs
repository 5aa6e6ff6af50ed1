//! Single-key publishing wallet.

use flo_multipart::{MessageSigner, MultipartError};
use flo_primitives::ec::PrivateKey;
use flo_rpc::{NodeRpc, RpcError};
use flo_script::Address;
use flo_transaction::{SignatureHashKind, Transaction, TransactionBuilder};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chain::{ChainState, MempoolChainManager};
use crate::clock::Clock;
use crate::coin::{CoinSelector, LargestFirst, Utxo};
use crate::config::WalletConfig;
use crate::publisher::{DataSender, PublishError, Publisher};
use crate::repair::Repairer;
use crate::WalletError;

/// Smallest change output the wallet will create.
pub const DUST_LIMIT: u64 = 546;

struct WalletState<C> {
    chain: MempoolChainManager<C>,
    utxo: Option<Utxo>,
}

/// Publishes data from one key by rolling a single change output through
/// a chain of transactions.
///
/// Sends are serialized internally, so one wallet may be shared between
/// tasks.
pub struct Wallet<R, C, P> {
    config: WalletConfig,
    key: PrivateKey,
    address: Address,
    rpc: R,
    repairer: P,
    selector: Box<dyn CoinSelector + Send + Sync>,
    chain_state: watch::Receiver<ChainState>,
    state: Mutex<WalletState<C>>,
}

impl<R, C, P> Wallet<R, C, P>
where
    R: NodeRpc + Sync,
    C: Clock,
    P: Repairer + Sync,
{
    /// Create a wallet for the WIF in `config`.
    ///
    /// # Returns
    /// `Key` if the WIF is malformed or belongs to another network.
    pub fn new(config: WalletConfig, rpc: R, clock: C, repairer: P) -> Result<Self, WalletError> {
        let key = PrivateKey::from_wif(&config.wif, config.network.wif_prefix())?;
        let address = Address::from_public_key(&key.pub_key(), config.network);
        let chain = MempoolChainManager::new(config.limits.clone(), clock);
        let chain_state = chain.subscribe();
        Ok(Wallet {
            config,
            key,
            address,
            rpc,
            repairer,
            selector: Box::new(LargestFirst),
            chain_state,
            state: Mutex::new(WalletState { chain, utxo: None }),
        })
    }

    /// Use `selector` instead of [`LargestFirst`] when initializing.
    pub fn with_coin_selector(mut self, selector: impl CoinSelector + Send + Sync + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Abort throttled sends once `token` fires.
    pub fn with_cancellation(self, token: CancellationToken) -> Self {
        let Wallet { config, key, address, rpc, repairer, selector, chain_state, state } = self;
        let WalletState { chain, utxo } = state.into_inner();
        Wallet {
            config,
            key,
            address,
            rpc,
            repairer,
            selector,
            chain_state,
            state: Mutex::new(WalletState { chain: chain.with_cancellation(token), utxo }),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    /// Watch the chain manager's state. Readable while a send is throttled.
    pub fn chain_state(&self) -> watch::Receiver<ChainState> {
        self.chain_state.clone()
    }

    /// The output the next send will spend.
    pub async fn current_utxo(&self) -> Option<Utxo> {
        self.state.lock().await.utxo.clone()
    }

    /// Unconfirmed ancestor count and size of the wallet's chain.
    pub async fn chain_usage(&self) -> (u64, u64) {
        let state = self.state.lock().await;
        (state.chain.ancestor_count(), state.chain.ancestor_size())
    }

    /// Import the key, pick the output to spend and rebuild the pending
    /// chain from the mempool.
    ///
    /// # Returns
    /// `NoSpendableOutput` if the node knows no output for the address.
    pub async fn initialize(&self) -> Result<(), WalletError> {
        match self.rpc.import_private_key(&self.config.wif, &self.config.label, false).await {
            Ok(()) => {}
            Err(e) if is_already_imported(&e) => debug!(address = %self.address, "key already imported"),
            Err(e) => return Err(e.into()),
        }

        let unspent = self.rpc.list_unspent(0, 9_999_999, &[self.address.to_string()]).await?;
        let own_script = self.address.locking_script();
        let candidates: Vec<Utxo> = unspent
            .iter()
            .filter_map(|out| match Utxo::try_from(out) {
                Ok(utxo) if utxo.locking_script == own_script => Some(utxo),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable output");
                    None
                }
            })
            .collect();

        let utxo = self
            .selector
            .select(&candidates)
            .ok_or_else(|| WalletError::NoSpendableOutput(self.address.to_string()))?;

        let mut state = self.state.lock().await;
        state.chain.reconstruct(&self.rpc, &utxo.txid).await?;
        info!(
            address = %self.address,
            txid = %utxo.txid,
            vout = utxo.vout,
            satoshis = utxo.satoshis,
            pending = state.chain.pending_len(),
            "wallet initialized"
        );
        state.utxo = Some(utxo);
        Ok(())
    }

    /// Send one transaction carrying `flo_data`, paying change back to the
    /// wallet.
    ///
    /// # Returns
    /// The txid, or the first error. The rolling output only moves once the
    /// node has accepted the transaction.
    pub async fn send_data_tx(&self, flo_data: &[u8]) -> Result<String, WalletError> {
        let mut state = self.state.lock().await;
        let utxo = state
            .utxo
            .clone()
            .ok_or_else(|| WalletError::NoSpendableOutput("wallet is not initialized".to_string()))?;

        state.chain.ensure_capacity(&self.rpc, &utxo.txid, &self.repairer).await?;

        let sent = self.build_and_send(&utxo, flo_data).await;
        match sent {
            Ok((txid, hex, change)) => {
                state.chain.record_send(&hex);
                state.utxo = Some(Utxo {
                    txid: txid.clone(),
                    vout: 0,
                    satoshis: change,
                    locking_script: self.address.locking_script(),
                    confirmations: 0,
                });
                Ok(txid)
            }
            Err(e) => {
                state.chain.abandon_send();
                Err(e)
            }
        }
    }

    /// Build, sign and broadcast; returns (txid, raw hex, change).
    async fn build_and_send(
        &self,
        utxo: &Utxo,
        flo_data: &[u8],
    ) -> Result<(String, String, u64), WalletError> {
        let size = self.builder(utxo, flo_data, utxo.satoshis)?.estimate_size(SignatureHashKind::Legacy);
        let fee = self.config.fee_for(size);
        let change = utxo
            .satoshis
            .checked_sub(fee)
            .filter(|c| *c >= DUST_LIMIT)
            .ok_or(WalletError::InsufficientFunds {
                needed: fee + DUST_LIMIT,
                available: utxo.satoshis,
            })?;

        let tx: Transaction = self.builder(utxo, flo_data, change)?.sign(&self.key, SignatureHashKind::Legacy)?;
        let hex = tx.to_hex();
        let txid = tx.tx_id_hex();

        let accepted = self.rpc.send_raw_transaction(&hex).await?;
        if accepted != txid {
            warn!(local = %txid, node = %accepted, "node reported a different txid");
        }
        debug!(txid = %txid, size = hex.len() / 2, fee, change, "sent data transaction");
        Ok((txid, hex, change))
    }

    fn builder(&self, utxo: &Utxo, flo_data: &[u8], value: u64) -> Result<TransactionBuilder, WalletError> {
        let mut builder = TransactionBuilder::new(self.config.network);
        builder
            .add_input(&utxo.txid, utxo.vout, utxo.locking_script.clone(), utxo.satoshis)?
            .add_output(self.address.locking_script(), value)
            .set_flo_data(flo_data)?;
        Ok(builder)
    }

    /// Publish `payload`, splitting it across transactions when needed.
    pub async fn publish(&self, payload: &str) -> Result<Vec<String>, PublishError> {
        Publisher::new(self, self).publish(payload).await
    }
}

impl<R, C, P> DataSender for Wallet<R, C, P>
where
    R: NodeRpc + Sync,
    C: Clock,
    P: Repairer + Sync,
{
    async fn send_data(&self, data: &[u8]) -> Result<String, WalletError> {
        self.send_data_tx(data).await
    }
}

impl<R, C, P> MessageSigner for Wallet<R, C, P>
where
    R: NodeRpc + Sync,
    C: Clock,
    P: Repairer + Sync,
{
    fn address(&self) -> String {
        self.address.to_string()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, MultipartError> {
        flo_message::sign(message, &self.key).map_err(|e| MultipartError::Signing(e.to_string()))
    }
}

fn is_already_imported(e: &RpcError) -> bool {
    matches!(e, RpcError::Remote { message, .. } if message.to_lowercase().contains("already"))
}
