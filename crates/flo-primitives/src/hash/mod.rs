//! Hash functions used by the FLO transaction codec, addresses and
//! signed messages.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute SHA-256(SHA-256(data)).
///
/// Used for transaction ids, signature hashes, P2P checksums and the
/// Base58Check checksum.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte digest in internal (non-reversed) byte order.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute SHA-256d over several slices without concatenating them first.
///
/// # Arguments
/// * `parts` - Slices hashed in order as one message.
///
/// # Returns
/// The same digest as `sha256d(&parts.concat())`.
pub fn sha256d_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let first: [u8; 32] = hasher.finalize().into();
    sha256(&first)
}

/// Compute the RIPEMD-160 digest of `data`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// Compute RIPEMD-160(SHA-256(data)), the public key hash carried in
/// P2PKH and P2WPKH scripts and in FLO addresses.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}
