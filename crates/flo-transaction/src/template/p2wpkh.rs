//! Native witness v0 Pay-to-Witness-Public-Key-Hash (P2WPKH) template.
//!
//! The scriptSig stays empty; the witness is `[sig, pubkey]` and the
//! BIP-143 scriptCode is the P2PKH script of the key hash.

use flo_primitives::ec::PrivateKey;
use flo_script::Script;

use crate::output::TransactionOutput;
use crate::sighash::{hash_for_witness_v0, SIGHASH_ALL};
use crate::template::{signature_with_type, UnlockingData, UnlockingScriptTemplate, MAX_SIG_LEN};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Create a P2WPKH locking script (`OP_0 <20-byte hash>`) for a key.
pub fn lock(private_key: &PrivateKey) -> Script {
    Script::p2wpkh(&private_key.pub_key().hash160())
}

/// Create a P2WPKH unlocker. The sighash flag defaults to `SIGHASH_ALL`.
pub fn unlock(private_key: PrivateKey, sighash_flag: Option<u32>) -> P2WPKH {
    P2WPKH {
        private_key,
        sighash_flag: sighash_flag.unwrap_or(SIGHASH_ALL),
    }
}

pub struct P2WPKH {
    private_key: PrivateKey,
    sighash_flag: u32,
}

impl UnlockingScriptTemplate for P2WPKH {
    fn sign(
        &self,
        tx: &Transaction,
        input_index: usize,
        source: &TransactionOutput,
    ) -> Result<UnlockingData, TransactionError> {
        let pub_key = self.private_key.pub_key();
        let script_code = Script::p2pkh(&pub_key.hash160());

        let sig_hash = hash_for_witness_v0(
            tx,
            input_index,
            &script_code,
            source.satoshis,
            self.sighash_flag,
            true,
        )?;
        let signature = self.private_key.sign(&sig_hash)?;

        Ok(UnlockingData {
            script: Script::new(),
            witness: vec![
                signature_with_type(signature.to_der(), self.sighash_flag),
                pub_key.to_compressed().to_vec(),
            ],
        })
    }

    fn placeholder(&self) -> UnlockingData {
        placeholder()
    }
}

/// Empty scriptSig and a two-item witness of worst-case lengths.
pub fn placeholder() -> UnlockingData {
    UnlockingData {
        script: Script::new(),
        witness: vec![vec![0u8; MAX_SIG_LEN], vec![0u8; 33]],
    }
}
