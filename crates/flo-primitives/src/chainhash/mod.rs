//! 32-byte identifiers for transactions and blocks.
//!
//! Stored in internal byte order and displayed as byte-reversed hex, which
//! is how the node RPC and block explorers render txids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Size of a Hash in bytes.
pub const HASH_SIZE: usize = 32;

/// A 32-byte hash such as a txid or block hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Wrap bytes already in internal order.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create a Hash from a slice in internal order.
    ///
    /// # Arguments
    /// * `bytes` - Exactly 32 bytes.
    ///
    /// # Returns
    /// The hash, or `InvalidHash` for any other length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let arr: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| {
            PrimitivesError::InvalidHash(format!(
                "invalid hash length of {}, want {}",
                bytes.len(),
                HASH_SIZE
            ))
        })?;
        Ok(Hash(arr))
    }

    /// Parse the display form (byte-reversed hex, exactly 64 characters).
    ///
    /// # Arguments
    /// * `hex_str` - A txid as printed by the node.
    ///
    /// # Returns
    /// The hash in internal byte order.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != HASH_SIZE * 2 {
            return Err(PrimitivesError::InvalidHash(format!(
                "hash string must be {} hex characters, got {}",
                HASH_SIZE * 2,
                hex_str.len()
            )));
        }
        let mut bytes = hex::decode(hex_str)?;
        bytes.reverse();
        Self::from_bytes(&bytes)
    }

    /// Hash `data` with SHA-256d and wrap the digest.
    pub fn sha256d(data: &[u8]) -> Self {
        Hash(sha256d(data))
    }

    /// Borrow the internal bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Return the bytes in display order.
    pub fn to_reversed(&self) -> [u8; HASH_SIZE] {
        let mut out = self.0;
        out.reverse();
        out
    }

    /// True for the all-zero hash.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_reversed()))
    }
}

impl FromStr for Hash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TXID: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

    #[test]
    fn test_display_is_reversed() {
        let hash = Hash::from_hex(TXID).unwrap();
        assert_eq!(hash.as_bytes()[0], 0x3b);
        assert_eq!(hash.as_bytes()[31], 0x4a);
        assert_eq!(hash.to_string(), TXID);
    }

    #[test]
    fn test_from_hex_rejects_short_strings() {
        assert!(Hash::from_hex("abcd").is_err());
        assert!(Hash::from_hex("").is_err());
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let bad = "zz".repeat(32);
        assert!(matches!(Hash::from_hex(&bad), Err(PrimitivesError::InvalidHex(_))));
    }

    #[test]
    fn test_from_bytes_length() {
        assert!(Hash::from_bytes(&[0u8; 31]).is_err());
        assert!(Hash::from_bytes(&[0u8; 32]).unwrap().is_zero());
    }

    #[test]
    fn test_sha256d_wraps_digest() {
        let hash = Hash::sha256d(b"");
        assert_eq!(
            hex::encode(hash.as_bytes()),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }
}
