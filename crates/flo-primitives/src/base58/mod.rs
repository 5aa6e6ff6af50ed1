//! Base58 and Base58Check, used for FLO addresses and WIF keys.

use crate::hash::sha256d;
use crate::PrimitivesError;

const CHECKSUM_LEN: usize = 4;

/// Encode bytes with the Bitcoin Base58 alphabet.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode `data` followed by the first four bytes of SHA-256d(data).
///
/// # Arguments
/// * `data` - Version byte(s) followed by the payload.
///
/// # Returns
/// The Base58Check string.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&payload)
}

/// Decode a Base58Check string and verify its checksum.
///
/// # Arguments
/// * `s` - The encoded string.
///
/// # Returns
/// The payload without the checksum, `ChecksumMismatch` if the checksum
/// does not match, or `InvalidBase58` for malformed input.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let mut decoded = decode(s)?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let split = decoded.len() - CHECKSUM_LEN;
    let expected = sha256d(&decoded[..split]);
    if decoded[split..] != expected[..CHECKSUM_LEN] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    decoded.truncate(split);
    Ok(decoded)
}
