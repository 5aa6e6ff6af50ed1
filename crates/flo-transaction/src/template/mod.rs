//! Script templates for the spend types the builder signs.
//!
//! Provides the `UnlockingScriptTemplate` trait with a legacy P2PKH and a
//! native witness v0 P2WPKH implementation.

pub mod p2pkh;
pub mod p2wpkh;

use flo_script::Script;

use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::TransactionError;

/// What an input needs to satisfy its source output: a scriptSig, a
/// witness stack, or both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnlockingData {
    pub script: Script,
    pub witness: Vec<Vec<u8>>,
}

/// Trait for script templates that produce input unlocking data.
///
/// `sign` receives the full transaction, the input index and the output
/// being spent, computes the appropriate signature hash, signs it and
/// returns the unlocking data.
pub trait UnlockingScriptTemplate {
    /// Produce the unlocking data for the given input.
    ///
    /// # Arguments
    /// * `tx` - The transaction being signed.
    /// * `input_index` - The index of the input to sign.
    /// * `source` - The output being spent (its script and value).
    fn sign(
        &self,
        tx: &Transaction,
        input_index: usize,
        source: &TransactionOutput,
    ) -> Result<UnlockingData, TransactionError>;

    /// Unlocking data of the same size as a real signature would produce.
    ///
    /// Used for fee calculation before the actual signature is computed.
    fn placeholder(&self) -> UnlockingData;
}

/// DER signature followed by the sighash type byte.
pub(crate) fn signature_with_type(der: Vec<u8>, sighash_type: u32) -> Vec<u8> {
    let mut sig = der;
    sig.push(sighash_type as u8);
    sig
}

/// Longest low-S DER signature plus the type byte.
pub(crate) const MAX_SIG_LEN: usize = 72;
