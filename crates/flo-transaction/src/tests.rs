//! Tests for the flo-transaction crate.
//!
//! Covers the `floData` wire format, witness encoding, both signature
//! hashes and the builder.

use flo_primitives::ec::{PrivateKey, Signature};
use flo_primitives::hash::sha256d;
use flo_script::opcodes::OP_CODESEPARATOR;
use flo_script::{Address, Network, Script};

use crate::builder::{SignatureHashKind, TransactionBuilder};
use crate::input::{TransactionInput, DEFAULT_SEQUENCE_NUMBER};
use crate::output::TransactionOutput;
use crate::sighash::{
    self, calc_witness_v0_preimage, hash_for_signature, hash_for_witness_v0, SIGHASH_ALL,
    SIGHASH_ANYONECANPAY, SIGHASH_NONE, SIGHASH_SENTINEL, SIGHASH_SINGLE,
};
use crate::transaction::{Transaction, MAX_FLO_DATA_LEN};
use crate::TransactionError;

// -----------------------------------------------------------------------
// Test vectors
// -----------------------------------------------------------------------

/// A version 1 P2PKH spend; no `floData` on the wire.
const SOURCE_RAW_TX: &str = "010000000138c7c61c14ffb063c3bb2664041a3e29ea6ea0412a0c18ff725ba4e9e12afae2030000006a47304402203e9ab8e4c14addf3b4741540b556cfb0e0efb67dc1a7b5ce84c3ac56b3fd447802203c9f49f7bd893ebd7060176dfc36bcaff9d2c443d9a0dd6cd2d59b372c024d20412102798913bc057b344de675dac34faafe3dc2f312c758cd9068209f810877306d66ffffffff02dc050000000000002076a914eb0bd5edba389198e73f8efabddfc61666969ff788ac6a0568656c6c6faa0d0000000000001976a914eb0bd5edba389198e73f8efabddfc61666969ff788ac00000000";

/// A version 2 transaction serialized without the `floData` length byte.
const MULTI_INPUT_TX_HEX: &str = "0200000003a9bc457fdc6a54d99300fb137b23714d860c350a9d19ff0f571e694a419ff3a0010000006b48304502210086c83beb2b2663e4709a583d261d75be538aedcafa7766bd983e5c8db2f8b2fc02201a88b178624ab0ad1748b37c875f885930166237c88f5af78ee4e61d337f935f412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff0092bb9a47e27bf64fc98f557c530c04d9ac25e2f2a8b600e92a0b1ae7c89c20010000006b483045022100f06b3db1c0a11af348401f9cebe10ae2659d6e766a9dcd9e3a04690ba10a160f02203f7fbd7dfcfc70863aface1a306fcc91bbadf6bc884c21a55ef0d32bd6b088c8412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff9d0d4554fa692420a0830ca614b6c60f1bf8eaaa21afca4aa8c99fb052d9f398000000006b483045022100d920f2290548e92a6235f8b2513b7f693a64a0d3fa699f81a034f4b4608ff82f0220767d7d98025aff3c7bd5f2a66aab6a824f5990392e6489aae1e1ae3472d8dffb412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff02807c814a000000001976a9143a6bf34ebfcf30e8541bbb33a7882845e5a29cb488ac76b0e60e000000001976a914bd492b67f90cb85918494767ebb23102c4f06b7088ac67000000";

/// Unsigned transaction from the BIP-143 native P2WPKH example.
const BIP143_UNSIGNED_TX: &str = "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f0000000000eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a0100000000ffffffff02202cb206000000001976a9148280b37df378db99f66f85c95a783a76ac7a6d5988ac9093510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2f0167faee04388ac11000000";

const PREV_TXID: &str = "a0f39f416a691e570fff199d0a350c864d71237b13fb0093d9546adc7f45bca9";

fn test_key() -> PrivateKey {
    PrivateKey::from_hex("e5d2f6f6b3b2c0d6e0c6d8a5e7a1c7f9b3d2a1e0f9c8b7a6e5d4c3b2a1f0e9d8").unwrap()
}

/// One input with a 107-byte scriptSig and one P2PKH output.
fn known_shape_tx() -> Transaction {
    let mut tx = Transaction::new();
    let mut input = TransactionInput::new([0x11; 32], 0);
    input.unlocking_script = Script::from_bytes(&[0x42; 107]);
    tx.add_input(input);
    tx.add_output(TransactionOutput::new(9_999_853_750_000, Script::p2pkh(&[0x22; 20])));
    tx
}

fn two_in_one_out() -> Transaction {
    let mut tx = Transaction::new();
    tx.add_input(TransactionInput::new([0x01; 32], 0));
    tx.add_input(TransactionInput::new([0x02; 32], 1));
    tx.add_output(TransactionOutput::new(5_000, Script::p2pkh(&[0x33; 20])));
    tx.set_flo_data(b"hello flo".to_vec()).unwrap();
    tx
}

// -----------------------------------------------------------------------
// Wire format
// -----------------------------------------------------------------------

#[test]
fn test_known_shape_byte_length() {
    let tx = known_shape_tx();
    assert_eq!(tx.size(), 193);
    assert_eq!(tx.to_bytes().len(), 193);
    assert!(tx.to_hex().ends_with("00"));
    assert_eq!(tx.inputs[0].sequence_number, DEFAULT_SEQUENCE_NUMBER);
}

#[test]
fn test_empty_flo_data_adds_one_byte() {
    let tx = known_shape_tx();
    assert_eq!(tx.byte_length(true, true), tx.byte_length(true, false) + 1);
}

#[test]
fn test_flo_data_length_counted() {
    let mut tx = known_shape_tx();
    tx.set_flo_data(vec![0xab; 300]).unwrap();
    assert_eq!(tx.size(), 192 + 3 + 300);
    assert_eq!(tx.to_bytes().len(), tx.size());
}

#[test]
fn test_flo_data_cap() {
    let mut tx = Transaction::new();
    assert!(tx.set_flo_data(vec![0u8; MAX_FLO_DATA_LEN]).is_ok());
    let err = tx.set_flo_data(vec![0u8; MAX_FLO_DATA_LEN + 1]).unwrap_err();
    assert!(matches!(err, TransactionError::Validation(_)));
    assert_eq!(tx.flo_data().len(), MAX_FLO_DATA_LEN);
}

#[test]
fn test_flo_data_roundtrip() {
    let mut tx = known_shape_tx();
    tx.set_flo_data(b"text:hello world".to_vec()).unwrap();
    let decoded = Transaction::from_hex(&tx.to_hex()).unwrap();
    assert_eq!(decoded, tx);
    assert_eq!(decoded.flo_data(), b"text:hello world");
}

#[test]
fn test_version_one_has_no_flo_data() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).unwrap();
    assert_eq!(tx.version, 1);
    assert_eq!(tx.inputs.len(), 1);
    assert_eq!(tx.outputs.len(), 2);
    assert!(tx.flo_data().is_empty());
    assert_eq!(tx.to_hex(), SOURCE_RAW_TX);
    assert_eq!(tx.byte_length(true, true), tx.byte_length(true, false));
}

#[test]
fn test_version_two_requires_flo_data() {
    let err = Transaction::from_hex(MULTI_INPUT_TX_HEX).unwrap_err();
    assert!(matches!(err, TransactionError::Parse(_)));

    let with_len = format!("{}00", MULTI_INPUT_TX_HEX);
    let tx = Transaction::from_hex(&with_len).unwrap();
    assert_eq!(tx.inputs.len(), 3);
    assert_eq!(tx.outputs.len(), 2);
    assert_eq!(tx.lock_time, 103);
    assert_eq!(tx.to_hex(), with_len);
}

#[test]
fn test_negative_version_has_no_flo_data() {
    let mut tx = known_shape_tx();
    tx.version = -1;
    let bytes = tx.to_bytes();
    assert_eq!(bytes.len(), 192);
    assert_eq!(&bytes[..4], &[0xff, 0xff, 0xff, 0xff]);
    assert_eq!(tx.byte_length(true, true), tx.byte_length(true, false));

    let decoded = Transaction::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.version, -1);
    assert!(decoded.flo_data().is_empty());
    assert_eq!(decoded.tx_id(), tx.tx_id());

    // A floData length byte is trailing garbage for this version.
    let mut padded = bytes.clone();
    padded.push(0x00);
    assert!(matches!(Transaction::from_bytes(&padded), Err(TransactionError::Parse(_))));
}

#[test]
fn test_negative_version_skips_flo_data_in_preimage() {
    let mut tx = two_in_one_out();
    tx.version = i32::MIN;
    let script_code = Script::p2pkh(&[0x44; 20]);
    let with = calc_witness_v0_preimage(&tx, 0, &script_code, 10_000, SIGHASH_ALL, true).unwrap();
    let without = calc_witness_v0_preimage(&tx, 0, &script_code, 10_000, SIGHASH_ALL, false).unwrap();
    assert_eq!(with, without);
    assert_eq!(&with[..4], &[0x00, 0x00, 0x00, 0x80]);
}

#[test]
fn test_trailing_bytes() {
    let extended = format!("{}deadbeef", SOURCE_RAW_TX);
    let err = Transaction::from_hex(&extended).unwrap_err();
    assert!(matches!(err, TransactionError::Parse(_)));

    let tx = Transaction::from_hex_lenient(&extended).unwrap();
    assert_eq!(tx.to_hex(), SOURCE_RAW_TX);
}

#[test]
fn test_truncated_and_invalid_input() {
    assert!(matches!(Transaction::from_bytes(&[]), Err(TransactionError::Parse(_))));
    assert!(matches!(Transaction::from_hex("zz"), Err(TransactionError::Parse(_))));
    let truncated = &SOURCE_RAW_TX[..SOURCE_RAW_TX.len() - 10];
    assert!(matches!(Transaction::from_hex(truncated), Err(TransactionError::Parse(_))));
}

#[test]
fn test_decoded_flo_data_over_cap() {
    let tx = known_shape_tx();
    let mut bytes = tx.serialize(false, false);
    bytes.extend_from_slice(&[0xfd, 0x11, 0x04]);
    bytes.extend_from_slice(&[0u8; MAX_FLO_DATA_LEN + 1]);
    let err = Transaction::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, TransactionError::Validation(_)));
}

#[test]
fn test_superfluous_witness() {
    let mut tx = Transaction::new();
    tx.version = 1;
    tx.add_input(TransactionInput::new([0x05; 32], 0));
    tx.add_output(TransactionOutput::new(1, Script::p2pkh(&[0x06; 20])));
    let plain = tx.to_bytes();

    // version | 00 01 | body | one empty witness stack | locktime
    let mut bytes = plain[..4].to_vec();
    bytes.extend_from_slice(&[0x00, 0x01]);
    bytes.extend_from_slice(&plain[4..plain.len() - 4]);
    bytes.push(0x00);
    bytes.extend_from_slice(&plain[plain.len() - 4..]);

    let err = Transaction::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, TransactionError::Integrity(_)));
}

#[test]
fn test_witness_roundtrip_and_ids() {
    let mut tx = two_in_one_out();
    tx.inputs[1].witness = vec![vec![0x30; 71], vec![0x02; 33]];

    let bytes = tx.to_bytes();
    assert_eq!(&bytes[4..6], &[0x00, 0x01]);
    assert_eq!(bytes.len(), tx.size());

    let decoded = Transaction::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, tx);
    assert!(decoded.inputs[0].witness.is_empty());

    assert_eq!(tx.tx_id().as_bytes(), &sha256d(&tx.serialize(false, true)));
    assert_ne!(tx.tx_id(), tx.witness_id());

    let mut stripped = tx.clone();
    stripped.inputs[1].witness.clear();
    assert_eq!(stripped.tx_id(), tx.tx_id());
}

#[test]
fn test_txid_commits_to_flo_data() {
    let mut tx = known_shape_tx();
    let before = tx.tx_id_hex();
    tx.set_flo_data(b"x".to_vec()).unwrap();
    assert_ne!(tx.tx_id_hex(), before);
    assert_eq!(tx.tx_id_hex().len(), 64);
}

// -----------------------------------------------------------------------
// Legacy signature hash
// -----------------------------------------------------------------------

#[test]
fn test_legacy_sentinel_out_of_range() {
    let tx = two_in_one_out();
    let script = Script::p2pkh(&[0x33; 20]);
    let hash = hash_for_signature(&tx, 2, &script, SIGHASH_ALL, true).unwrap();
    assert_eq!(hash, SIGHASH_SENTINEL);
    assert_eq!(hex::encode(hash), format!("{}01", "00".repeat(31)));
}

#[test]
fn test_legacy_sentinel_single_without_output() {
    let tx = two_in_one_out();
    let script = Script::p2pkh(&[0x33; 20]);
    let hash = hash_for_signature(&tx, 1, &script, SIGHASH_SINGLE, true).unwrap();
    assert_eq!(hash, SIGHASH_SENTINEL);
    let hash = hash_for_signature(&tx, 0, &script, SIGHASH_SINGLE, true).unwrap();
    assert_ne!(hash, SIGHASH_SENTINEL);
}

#[test]
fn test_legacy_deterministic_and_type_sensitive() {
    let tx = two_in_one_out();
    let script = Script::p2pkh(&[0x33; 20]);
    let all = hash_for_signature(&tx, 0, &script, SIGHASH_ALL, true).unwrap();
    assert_eq!(all, hash_for_signature(&tx, 0, &script, SIGHASH_ALL, true).unwrap());

    let none = hash_for_signature(&tx, 0, &script, SIGHASH_NONE, true).unwrap();
    let acp = hash_for_signature(&tx, 0, &script, SIGHASH_ALL | SIGHASH_ANYONECANPAY, true).unwrap();
    assert_ne!(all, none);
    assert_ne!(all, acp);
    assert_ne!(none, acp);
}

#[test]
fn test_legacy_flo_data_inclusion() {
    let tx = two_in_one_out();
    let mut other = tx.clone();
    other.set_flo_data(b"different".to_vec()).unwrap();
    let script = Script::p2pkh(&[0x33; 20]);

    let a = hash_for_signature(&tx, 0, &script, SIGHASH_ALL, true).unwrap();
    let b = hash_for_signature(&other, 0, &script, SIGHASH_ALL, true).unwrap();
    assert_ne!(a, b);

    let a = hash_for_signature(&tx, 0, &script, SIGHASH_ALL, false).unwrap();
    let b = hash_for_signature(&other, 0, &script, SIGHASH_ALL, false).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_legacy_ignores_existing_scripts_and_witness() {
    let tx = two_in_one_out();
    let mut signed = tx.clone();
    signed.inputs[0].unlocking_script = Script::from_bytes(&[0x51; 10]);
    signed.inputs[1].witness = vec![vec![1, 2, 3]];
    let script = Script::p2pkh(&[0x33; 20]);
    assert_eq!(
        hash_for_signature(&tx, 0, &script, SIGHASH_ALL, true).unwrap(),
        hash_for_signature(&signed, 0, &script, SIGHASH_ALL, true).unwrap(),
    );
}

#[test]
fn test_legacy_strips_codeseparator() {
    let tx = two_in_one_out();
    let plain = Script::p2pkh(&[0x33; 20]);
    let mut with_sep = vec![OP_CODESEPARATOR];
    with_sep.extend_from_slice(plain.to_bytes());
    let with_sep = Script::from_bytes(&with_sep);
    assert_eq!(
        hash_for_signature(&tx, 0, &plain, SIGHASH_ALL, true).unwrap(),
        hash_for_signature(&tx, 0, &with_sep, SIGHASH_ALL, true).unwrap(),
    );
}

#[test]
fn test_legacy_none_ignores_outputs() {
    let tx = two_in_one_out();
    let mut changed = tx.clone();
    changed.outputs[0].satoshis = 1;
    let script = Script::p2pkh(&[0x33; 20]);
    assert_eq!(
        hash_for_signature(&tx, 0, &script, SIGHASH_NONE, true).unwrap(),
        hash_for_signature(&changed, 0, &script, SIGHASH_NONE, true).unwrap(),
    );
    assert_ne!(
        hash_for_signature(&tx, 0, &script, SIGHASH_ALL, true).unwrap(),
        hash_for_signature(&changed, 0, &script, SIGHASH_ALL, true).unwrap(),
    );
}

// -----------------------------------------------------------------------
// Witness v0 signature hash
// -----------------------------------------------------------------------

#[test]
fn test_witness_v0_bip143_preimage() {
    let tx = Transaction::from_hex(BIP143_UNSIGNED_TX).unwrap();
    let script_code = Script::from_hex("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac").unwrap();
    let preimage =
        calc_witness_v0_preimage(&tx, 1, &script_code, 600_000_000, SIGHASH_ALL, true).unwrap();

    assert_eq!(preimage.len(), 182);
    assert_eq!(&preimage[..4], &[1, 0, 0, 0]);
    assert_eq!(
        hex::encode(&preimage[4..36]),
        "96b827c8483d4e9b96712b6713a7b68d6e8003a781feba36c31143470b4efd37"
    );
    assert_eq!(
        hex::encode(&preimage[36..68]),
        "52b0a642eea2fb7ae638c36f6252b6750293dbe574a806984b8e4d8548339a3b"
    );
    assert_eq!(
        hex::encode(&preimage[68..104]),
        "ef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a01000000"
    );
    assert_eq!(&preimage[preimage.len() - 8..], &[0x11, 0, 0, 0, 1, 0, 0, 0]);

    let hash = hash_for_witness_v0(&tx, 1, &script_code, 600_000_000, SIGHASH_ALL, true).unwrap();
    assert_eq!(hash, sha256d(&preimage));

    // Version 1 carries no floData, so the flag changes nothing.
    let without = hash_for_witness_v0(&tx, 1, &script_code, 600_000_000, SIGHASH_ALL, false).unwrap();
    assert_eq!(hash, without);
}

#[test]
fn test_witness_v0_flo_data_in_preimage() {
    let tx = two_in_one_out();
    let script_code = Script::p2pkh(&[0x44; 20]);
    let with = calc_witness_v0_preimage(&tx, 0, &script_code, 10_000, SIGHASH_ALL, true).unwrap();
    let without = calc_witness_v0_preimage(&tx, 0, &script_code, 10_000, SIGHASH_ALL, false).unwrap();
    assert_eq!(with.len(), without.len() + 1 + b"hello flo".len());

    let tail = &with[with.len() - 4 - 10..with.len() - 4];
    assert_eq!(tail[0], 9);
    assert_eq!(&tail[1..], b"hello flo");
}

#[test]
fn test_witness_v0_out_of_range_is_error() {
    let tx = two_in_one_out();
    let err = hash_for_witness_v0(&tx, 5, &Script::new(), 0, SIGHASH_ALL, true).unwrap_err();
    assert!(matches!(err, TransactionError::Validation(_)));
}

#[test]
fn test_witness_v0_zero_hashes() {
    let tx = two_in_one_out();
    let script_code = Script::p2pkh(&[0x44; 20]);
    let acp = calc_witness_v0_preimage(
        &tx,
        0,
        &script_code,
        1,
        SIGHASH_ALL | SIGHASH_ANYONECANPAY,
        true,
    )
    .unwrap();
    assert_eq!(&acp[4..68], &[0u8; 64][..]);

    let none = calc_witness_v0_preimage(&tx, 0, &script_code, 1, sighash::SIGHASH_NONE, true).unwrap();
    assert_ne!(&none[4..36], &[0u8; 32][..]);
    assert_eq!(&none[36..68], &[0u8; 32][..]);
}

// -----------------------------------------------------------------------
// Builder
// -----------------------------------------------------------------------

fn builder_for(key: &PrivateKey, script: Script) -> TransactionBuilder {
    let addr = Address::from_public_key(&key.pub_key(), Network::Mainnet);
    let mut builder = TransactionBuilder::new(Network::Mainnet);
    builder
        .add_input(PREV_TXID, 1, script, 100_000_000)
        .unwrap()
        .add_output_to_address(&addr, 99_900_000)
        .unwrap()
        .set_flo_data("text:hello")
        .unwrap();
    builder
}

#[test]
fn test_builder_flo_data_once() {
    let mut builder = TransactionBuilder::new(Network::Mainnet);
    builder.set_flo_data(vec![1u8, 2, 3]).unwrap();
    match builder.set_flo_data(vec![4u8]) {
        Err(TransactionError::Validation(msg)) => assert_eq!(msg, "flo data already set"),
        other => panic!("expected validation error, got {:?}", other.map(|_| ())),
    }
    assert_eq!(builder.build_unsigned().flo_data(), &[1, 2, 3]);
}

#[test]
fn test_builder_flo_data_too_long() {
    let mut builder = TransactionBuilder::new(Network::Mainnet);
    let err = builder.set_flo_data(vec![0u8; MAX_FLO_DATA_LEN + 1]).unwrap_err();
    assert!(matches!(err, TransactionError::Validation(_)));
    assert!(builder.set_flo_data(vec![0u8; MAX_FLO_DATA_LEN]).is_ok());
}

#[test]
fn test_builder_rejects_foreign_address() {
    let key = test_key();
    let testnet = Address::from_public_key(&key.pub_key(), Network::Testnet);
    let mut builder = TransactionBuilder::new(Network::Mainnet);
    let err = builder.add_output_to_address(&testnet, 1).unwrap_err();
    assert!(matches!(err, TransactionError::Validation(_)));

    let mut regtest = TransactionBuilder::new(Network::Regtest);
    assert!(regtest.add_output_to_address(&testnet, 1).is_ok());
}

#[test]
fn test_builder_input_txid_order() {
    let key = test_key();
    let tx = builder_for(&key, Script::new()).build_unsigned();
    assert_eq!(tx.version, 2);
    assert_eq!(tx.inputs[0].source_txid_hex(), PREV_TXID);
    assert_eq!(tx.inputs[0].source_tx_out_index, 1);
    assert_eq!(tx.inputs[0].sequence_number, DEFAULT_SEQUENCE_NUMBER);
}

#[test]
fn test_builder_sign_legacy() {
    let key = test_key();
    let prev_script = Script::p2pkh(&key.pub_key().hash160());
    let builder = builder_for(&key, prev_script.clone());
    let estimate = builder.estimate_size(SignatureHashKind::Legacy);
    let tx = builder.sign(&key, SignatureHashKind::Legacy).unwrap();

    assert!(tx.inputs[0].witness.is_empty());
    assert!(tx.size() <= estimate);
    assert_eq!(tx.flo_data(), b"text:hello");

    let chunks = tx.inputs[0].unlocking_script.chunks().unwrap();
    assert_eq!(chunks.len(), 2);
    let sig_bytes = chunks[0].data.clone().unwrap();
    let pub_bytes = chunks[1].data.clone().unwrap();
    assert_eq!(*sig_bytes.last().unwrap(), SIGHASH_ALL as u8);
    assert_eq!(pub_bytes, key.pub_key().to_compressed().to_vec());

    let hash = hash_for_signature(&tx, 0, &prev_script, SIGHASH_ALL, true).unwrap();
    let sig = Signature::from_der(&sig_bytes[..sig_bytes.len() - 1]).unwrap();
    assert!(key.pub_key().verify(&hash, &sig));

    let decoded = Transaction::from_hex(&tx.to_hex()).unwrap();
    assert_eq!(decoded, tx);
}

#[test]
fn test_builder_sign_witness_v0() {
    let key = test_key();
    let prev_script = Script::p2wpkh(&key.pub_key().hash160());
    let builder = builder_for(&key, prev_script);
    let estimate = builder.estimate_size(SignatureHashKind::WitnessV0);
    let tx = builder.sign(&key, SignatureHashKind::WitnessV0).unwrap();

    assert!(tx.inputs[0].unlocking_script.is_empty());
    assert_eq!(tx.inputs[0].witness.len(), 2);
    assert!(tx.size() <= estimate);
    assert_eq!(&tx.to_bytes()[4..6], &[0x00, 0x01]);

    let script_code = Script::p2pkh(&key.pub_key().hash160());
    let hash = hash_for_witness_v0(&tx, 0, &script_code, 100_000_000, SIGHASH_ALL, true).unwrap();
    let sig_bytes = &tx.inputs[0].witness[0];
    let sig = Signature::from_der(&sig_bytes[..sig_bytes.len() - 1]).unwrap();
    assert!(key.pub_key().verify(&hash, &sig));
    assert_eq!(tx.inputs[0].witness[1], key.pub_key().to_compressed().to_vec());
}

#[test]
fn test_builder_sign_is_deterministic() {
    let key = test_key();
    let prev_script = Script::p2pkh(&key.pub_key().hash160());
    let a = builder_for(&key, prev_script.clone()).sign(&key, SignatureHashKind::Legacy).unwrap();
    let b = builder_for(&key, prev_script).sign(&key, SignatureHashKind::Legacy).unwrap();
    assert_eq!(a.to_hex(), b.to_hex());
}

#[test]
fn test_builder_sign_without_inputs() {
    let key = test_key();
    let builder = TransactionBuilder::new(Network::Mainnet);
    assert!(matches!(
        builder.sign(&key, SignatureHashKind::Legacy),
        Err(TransactionError::Signing(_))
    ));
}

#[test]
fn test_builder_bad_txid() {
    let mut builder = TransactionBuilder::new(Network::Mainnet);
    assert!(builder.add_input("abcd", 0, Script::new(), 1).is_err());
}
