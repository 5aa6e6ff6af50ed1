//! Builder for signed data-carrying transactions.
//!
//! Collects inputs (with the outputs they spend), outputs and `floData`,
//! then signs every input with one key in a single pass.

use flo_primitives::chainhash::Hash;
use flo_primitives::ec::PrivateKey;
use flo_script::{Address, Network, Script};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::template::{p2pkh, p2wpkh, UnlockingData, UnlockingScriptTemplate};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Which signature hash, and therefore which spend type, `sign` produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureHashKind {
    /// P2PKH scriptSig over the legacy hash.
    Legacy,
    /// P2WPKH witness over the BIP-143 hash.
    WitnessV0,
}

/// Incrementally assembles a transaction and signs it.
///
/// Setters return `&mut Self` so calls can be chained; the fallible ones
/// wrap it in a `Result`.
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    network: Network,
    tx: Transaction,
    sources: Vec<TransactionOutput>,
    flo_data_set: bool,
}

impl TransactionBuilder {
    /// Start an empty version 2 transaction for `network`.
    pub fn new(network: Network) -> Self {
        TransactionBuilder {
            network,
            tx: Transaction::new(),
            sources: Vec::new(),
            flo_data_set: false,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn version(&mut self, version: i32) -> &mut Self {
        self.tx.version = version;
        self
    }

    pub fn lock_time(&mut self, lock_time: u32) -> &mut Self {
        self.tx.lock_time = lock_time;
        self
    }

    /// Spend output `vout` of `prev_txid_hex`.
    ///
    /// # Arguments
    /// * `prev_txid_hex` - Txid in display (byte-reversed) hex.
    /// * `vout` - Output index in the previous transaction.
    /// * `prev_locking_script` - Script of the output being spent.
    /// * `value` - Value of the output being spent, in satoshis.
    pub fn add_input(
        &mut self,
        prev_txid_hex: &str,
        vout: u32,
        prev_locking_script: Script,
        value: u64,
    ) -> Result<&mut Self, TransactionError> {
        let txid = Hash::from_hex(prev_txid_hex)?;
        self.tx.add_input(TransactionInput::new(*txid.as_bytes(), vout));
        self.sources.push(TransactionOutput::new(value, prev_locking_script));
        Ok(self)
    }

    pub fn add_output(&mut self, locking_script: Script, value: u64) -> &mut Self {
        self.tx.add_output(TransactionOutput::new(value, locking_script));
        self
    }

    /// Pay `value` to a P2PKH address on the builder's network.
    pub fn add_output_to_address(
        &mut self,
        address: &Address,
        value: u64,
    ) -> Result<&mut Self, TransactionError> {
        if address.network().pub_key_hash_version() != self.network.pub_key_hash_version() {
            return Err(TransactionError::Validation(format!(
                "address {} is not valid on {:?}",
                address, self.network
            )));
        }
        Ok(self.add_output(p2pkh::lock(address), value))
    }

    /// Attach `floData` (at most 1040 bytes). Allowed once
    /// per builder.
    pub fn set_flo_data(&mut self, data: impl Into<Vec<u8>>) -> Result<&mut Self, TransactionError> {
        if self.flo_data_set {
            return Err(TransactionError::Validation("flo data already set".to_string()));
        }
        self.tx.set_flo_data(data.into())?;
        self.flo_data_set = true;
        Ok(self)
    }

    /// The transaction as assembled so far, with empty unlocking data.
    pub fn build_unsigned(&self) -> Transaction {
        self.tx.clone()
    }

    /// Size in bytes of the signed transaction, using worst-case signature
    /// lengths.
    pub fn estimate_size(&self, kind: SignatureHashKind) -> usize {
        let placeholder = match kind {
            SignatureHashKind::Legacy => p2pkh::placeholder(),
            SignatureHashKind::WitnessV0 => p2wpkh::placeholder(),
        };
        let mut tx = self.tx.clone();
        for input in tx.inputs.iter_mut() {
            input.unlocking_script = placeholder.script.clone();
            input.witness = placeholder.witness.clone();
        }
        tx.size()
    }

    /// Sign every input with `key` and return the finished transaction.
    pub fn sign(
        self,
        key: &PrivateKey,
        kind: SignatureHashKind,
    ) -> Result<Transaction, TransactionError> {
        if self.tx.inputs.is_empty() {
            return Err(TransactionError::Signing("transaction has no inputs".to_string()));
        }
        match kind {
            SignatureHashKind::Legacy => self.sign_with(&p2pkh::unlock(key.clone(), None)),
            SignatureHashKind::WitnessV0 => self.sign_with(&p2wpkh::unlock(key.clone(), None)),
        }
    }

    fn sign_with(self, template: &impl UnlockingScriptTemplate) -> Result<Transaction, TransactionError> {
        let TransactionBuilder { mut tx, sources, .. } = self;
        for (index, source) in sources.iter().enumerate() {
            let UnlockingData { script, witness } = template.sign(&tx, index, source)?;
            tx.inputs[index].unlocking_script = script;
            tx.inputs[index].witness = witness;
        }
        Ok(tx)
    }
}
