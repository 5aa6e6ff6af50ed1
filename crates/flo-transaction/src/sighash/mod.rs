//! Signature hash computation for transaction signing.
//!
//! Two digests are supported: the legacy (pre-segwit) algorithm and the
//! BIP-143 witness v0 algorithm. Both can commit to the transaction's
//! `floData`, which FLO consensus requires for version 2 transactions.
//!
//! See <https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki>

use flo_primitives::hash::sha256d;
use flo_primitives::util::ByteWriter;
use flo_script::Script;

use crate::output::TransactionOutput;
use crate::transaction::{Transaction, FLO_DATA_MIN_VERSION};
use crate::TransactionError;

// -----------------------------------------------------------------------
// Sighash flag constants
// -----------------------------------------------------------------------

/// Sign all inputs and all outputs (the default).
pub const SIGHASH_ALL: u32 = 0x01;

/// Sign all inputs but no outputs, allowing outputs to be modified.
pub const SIGHASH_NONE: u32 = 0x02;

/// Sign all inputs and only the output with the same index as the signed input.
pub const SIGHASH_SINGLE: u32 = 0x03;

/// Combined with another flag: only sign the current input, allowing other
/// inputs to be added later.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;

/// Mask applied to extract the base sighash type (ALL, NONE, SINGLE).
pub const SIGHASH_MASK: u32 = 0x1f;

/// Returned by the legacy digest when there is nothing to sign: 31 zero
/// bytes followed by `0x01`. Consensus code has always accepted
/// signatures over this value.
pub const SIGHASH_SENTINEL: [u8; 32] = {
    let mut one = [0u8; 32];
    one[31] = 0x01;
    one
};

// -----------------------------------------------------------------------
// Legacy signature hash
// -----------------------------------------------------------------------

/// Compute the legacy signature hash for an input.
///
/// A copy of the transaction is reshaped according to `sighash_type`,
/// serialized without witness data and hashed together with the type.
///
/// # Arguments
/// * `tx`               - The transaction being signed.
/// * `input_index`      - Index of the input being signed.
/// * `prev_out_script`  - Locking script of the output being spent.
///   `OP_CODESEPARATOR`s are removed before it is committed to.
/// * `sighash_type`     - The combined sighash flags.
/// * `include_flo_data` - Commit to `floData` (version >= 2 only).
///
/// # Returns
/// The 32-byte double-SHA256 digest, or `SIGHASH_SENTINEL` when
/// `input_index` is out of range or SIGHASH_SINGLE has no matching output.
/// A malformed `prev_out_script` yields `TransactionError::Script`.
pub fn hash_for_signature(
    tx: &Transaction,
    input_index: usize,
    prev_out_script: &Script,
    sighash_type: u32,
    include_flo_data: bool,
) -> Result<[u8; 32], TransactionError> {
    if input_index >= tx.inputs.len() {
        return Ok(SIGHASH_SENTINEL);
    }

    let subscript = prev_out_script.remove_codeseparators()?;

    let mut copy = tx.clone();
    for input in copy.inputs.iter_mut() {
        input.witness.clear();
    }

    match sighash_type & SIGHASH_MASK {
        SIGHASH_NONE => {
            copy.outputs.clear();
            zero_other_sequences(&mut copy, input_index);
        }
        SIGHASH_SINGLE => {
            if input_index >= copy.outputs.len() {
                return Ok(SIGHASH_SENTINEL);
            }
            copy.outputs.truncate(input_index + 1);
            for output in copy.outputs.iter_mut().take(input_index) {
                *output = TransactionOutput::blank();
            }
            zero_other_sequences(&mut copy, input_index);
        }
        _ => {}
    }

    if sighash_type & SIGHASH_ANYONECANPAY != 0 {
        let mut target = copy.inputs.swap_remove(input_index);
        target.unlocking_script = subscript;
        copy.inputs = vec![target];
    } else {
        for input in copy.inputs.iter_mut() {
            input.unlocking_script = Script::new();
        }
        copy.inputs[input_index].unlocking_script = subscript;
    }

    let mut writer = ByteWriter::with_capacity(copy.byte_length(false, include_flo_data) + 4);
    copy.write_to(&mut writer, false, include_flo_data);
    writer.write_u32_le(sighash_type);
    Ok(sha256d(writer.as_bytes()))
}

fn zero_other_sequences(tx: &mut Transaction, input_index: usize) {
    for (i, input) in tx.inputs.iter_mut().enumerate() {
        if i != input_index {
            input.sequence_number = 0;
        }
    }
}

// -----------------------------------------------------------------------
// BIP-143 (witness v0) signature hash
// -----------------------------------------------------------------------

/// Compute the BIP-143 signature hash for a witness v0 input.
///
/// # Arguments
/// * `tx`               - The transaction being signed.
/// * `input_index`      - Index of the input being signed.
/// * `script_code`      - The scriptCode; for P2WPKH this is the P2PKH
///   script of the key hash.
/// * `value`            - Satoshi value of the output being spent.
/// * `sighash_type`     - The combined sighash flags.
/// * `include_flo_data` - Commit to `floData` (version >= 2 only).
///
/// # Returns
/// A 32-byte double-SHA256 digest, or `TransactionError::Validation` if
/// `input_index` is out of range.
pub fn hash_for_witness_v0(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    value: u64,
    sighash_type: u32,
    include_flo_data: bool,
) -> Result<[u8; 32], TransactionError> {
    let preimage =
        calc_witness_v0_preimage(tx, input_index, script_code, value, sighash_type, include_flo_data)?;
    Ok(sha256d(&preimage))
}

/// Compute the BIP-143 preimage bytes before double-hashing.
///
/// The preimage consists of:
/// 1. nVersion (4 bytes LE)
/// 2. hashPrevouts (32 bytes) - sha256d of all outpoints unless ANYONECANPAY
/// 3. hashSequence (32 bytes) - sha256d of all sequences unless ANYONECANPAY/SINGLE/NONE
/// 4. outpoint (32+4 bytes) - txid + vout of the input being signed
/// 5. scriptCode (varint + script)
/// 6. value (8 bytes LE) - satoshis of the output being spent
/// 7. nSequence (4 bytes LE) - sequence of the input being signed
/// 8. hashOutputs (32 bytes) - sha256d of all outputs or one output
/// 9. nLocktime (4 bytes LE)
/// 10. floData (varint + bytes) - only for version >= 2 when included
/// 11. sighashType (4 bytes LE)
pub fn calc_witness_v0_preimage(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    value: u64,
    sighash_type: u32,
    include_flo_data: bool,
) -> Result<Vec<u8>, TransactionError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        TransactionError::Validation(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        ))
    })?;

    let base_type = sighash_type & SIGHASH_MASK;
    let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;

    let hash_prevouts = if !anyone_can_pay {
        prevouts_hash(tx)
    } else {
        [0u8; 32]
    };

    let hash_sequence =
        if !anyone_can_pay && base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
            sequence_hash(tx)
        } else {
            [0u8; 32]
        };

    let hash_outputs = if base_type != SIGHASH_SINGLE && base_type != SIGHASH_NONE {
        outputs_hash(&tx.outputs)
    } else if base_type == SIGHASH_SINGLE && input_index < tx.outputs.len() {
        outputs_hash(&tx.outputs[input_index..=input_index])
    } else {
        [0u8; 32]
    };

    let mut writer = ByteWriter::with_capacity(160 + script_code.len() + tx.flo_data().len());
    writer.write_i32_le(tx.version);
    writer.write_bytes(&hash_prevouts);
    writer.write_bytes(&hash_sequence);
    input.write_outpoint(&mut writer);
    writer.write_var_bytes(script_code.to_bytes());
    writer.write_u64_le(value);
    writer.write_u32_le(input.sequence_number);
    writer.write_bytes(&hash_outputs);
    writer.write_u32_le(tx.lock_time);
    if include_flo_data && tx.version >= FLO_DATA_MIN_VERSION {
        writer.write_var_bytes(tx.flo_data());
    }
    writer.write_u32_le(sighash_type);

    Ok(writer.into_bytes())
}

// -----------------------------------------------------------------------
// Internal helper functions
// -----------------------------------------------------------------------

fn prevouts_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = ByteWriter::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        input.write_outpoint(&mut writer);
    }
    sha256d(writer.as_bytes())
}

fn sequence_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = ByteWriter::with_capacity(tx.inputs.len() * 4);
    for input in &tx.inputs {
        writer.write_u32_le(input.sequence_number);
    }
    sha256d(writer.as_bytes())
}

fn outputs_hash(outputs: &[TransactionOutput]) -> [u8; 32] {
    let mut writer = ByteWriter::new();
    for output in outputs {
        output.write_to(&mut writer);
    }
    sha256d(writer.as_bytes())
}
