//! Pay-to-Public-Key-Hash (P2PKH) script template.
//!
//! Creates standard P2PKH locking scripts (`OP_DUP OP_HASH160 <hash>
//! OP_EQUALVERIFY OP_CHECKSIG`) and unlocking scripts (`<sig> <pubkey>`)
//! over the legacy signature hash.

use flo_primitives::ec::PrivateKey;
use flo_script::{Address, Script};

use crate::output::TransactionOutput;
use crate::sighash::{hash_for_signature, SIGHASH_ALL};
use crate::template::{signature_with_type, UnlockingData, UnlockingScriptTemplate, MAX_SIG_LEN};
use crate::transaction::Transaction;
use crate::TransactionError;

/// Create a P2PKH locking script paying to `address`.
pub fn lock(address: &Address) -> Script {
    Script::p2pkh(address.public_key_hash())
}

/// Create a P2PKH unlocker for signing transaction inputs.
///
/// # Arguments
/// * `private_key` - The private key used to sign.
/// * `sighash_flag` - Optional sighash flag. Defaults to `SIGHASH_ALL`.
pub fn unlock(private_key: PrivateKey, sighash_flag: Option<u32>) -> P2PKH {
    P2PKH {
        private_key,
        sighash_flag: sighash_flag.unwrap_or(SIGHASH_ALL),
    }
}

/// P2PKH signing template holding a private key and sighash flag.
pub struct P2PKH {
    private_key: PrivateKey,
    sighash_flag: u32,
}

impl UnlockingScriptTemplate for P2PKH {
    /// Sign the input over the legacy hash, `floData` included, and build
    /// `<DER_sig || sighash_byte> <compressed_pubkey>`.
    fn sign(
        &self,
        tx: &Transaction,
        input_index: usize,
        source: &TransactionOutput,
    ) -> Result<UnlockingData, TransactionError> {
        if input_index >= tx.inputs.len() {
            return Err(TransactionError::Signing(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                tx.inputs.len()
            )));
        }

        let sig_hash =
            hash_for_signature(tx, input_index, &source.locking_script, self.sighash_flag, true)?;
        let signature = self.private_key.sign(&sig_hash)?;

        let mut script = Script::new();
        script.append_push_data(&signature_with_type(signature.to_der(), self.sighash_flag))?;
        script.append_push_data(&self.private_key.pub_key().to_compressed())?;

        Ok(UnlockingData { script, witness: Vec::new() })
    }

    fn placeholder(&self) -> UnlockingData {
        placeholder()
    }
}

/// A 107-byte scriptSig: two push opcodes, a 72-byte signature and a
/// 33-byte compressed key.
pub fn placeholder() -> UnlockingData {
    let mut bytes = Vec::with_capacity(2 + MAX_SIG_LEN + 33);
    bytes.push(MAX_SIG_LEN as u8);
    bytes.extend_from_slice(&[0u8; MAX_SIG_LEN]);
    bytes.push(33);
    bytes.extend_from_slice(&[0u8; 33]);
    UnlockingData { script: Script::from_bytes(&bytes), witness: Vec::new() }
}
