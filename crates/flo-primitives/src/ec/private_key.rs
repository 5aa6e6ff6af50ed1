//! secp256k1 private key with WIF import and export.
//!
//! The WIF version byte is network specific (FLO mainnet `0xa3`, testnet
//! `0xef`), so encoding takes the prefix explicitly and decoding reports
//! the prefix it found.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::{CompactSignature, Signature};
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// Compression flag byte appended to WIF for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// A secp256k1 private key.
///
/// The inner `SigningKey` zeroizes its scalar on drop.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a random key from the OS random number generator.
    pub fn random() -> Self {
        PrivateKey { inner: SigningKey::random(&mut OsRng) }
    }

    /// Create a private key from a raw 32-byte big-endian scalar.
    ///
    /// # Arguments
    /// * `bytes` - The scalar bytes.
    ///
    /// # Returns
    /// The key, or `InvalidPrivateKey` when the length is wrong or the scalar
    /// is zero or not below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Decode a WIF string, returning the key and the version byte it carried.
    ///
    /// Accepts both the compressed (38 byte) and uncompressed (37 byte)
    /// layouts; keys are always used with compressed public keys afterwards.
    ///
    /// # Arguments
    /// * `wif` - Base58Check-encoded WIF string.
    ///
    /// # Returns
    /// `(key, prefix)` on success, `ChecksumMismatch` for a bad checksum, or
    /// `InvalidWif` for a malformed payload.
    pub fn decode_wif(wif: &str) -> Result<(Self, u8), PrimitivesError> {
        let payload = Zeroizing::new(base58::check_decode(wif).map_err(|e| match e {
            PrimitivesError::ChecksumMismatch => e,
            other => PrimitivesError::InvalidWif(other.to_string()),
        })?);
        match payload.len() {
            34 if payload[33] == COMPRESS_MAGIC => {}
            34 => {
                return Err(PrimitivesError::InvalidWif(
                    "malformed private key: invalid compression flag".to_string(),
                ))
            }
            33 => {}
            n => {
                return Err(PrimitivesError::InvalidWif(format!(
                    "malformed private key: invalid length {}",
                    n + 4
                )))
            }
        }
        let key = Self::from_bytes(&payload[1..1 + PRIVATE_KEY_BYTES_LEN])?;
        Ok((key, payload[0]))
    }

    /// Decode a WIF string and require a specific version byte.
    ///
    /// # Arguments
    /// * `wif` - Base58Check-encoded WIF string.
    /// * `prefix` - Expected network prefix.
    pub fn from_wif(wif: &str, prefix: u8) -> Result<Self, PrimitivesError> {
        let (key, found) = Self::decode_wif(wif)?;
        if found != prefix {
            return Err(PrimitivesError::InvalidWif(format!(
                "unexpected network prefix 0x{:02x}, want 0x{:02x}",
                found, prefix
            )));
        }
        Ok(key)
    }

    /// Encode this key as a compressed-pubkey WIF string.
    ///
    /// # Arguments
    /// * `prefix` - Network version byte.
    pub fn to_wif(&self, prefix: u8) -> String {
        let mut payload = Zeroizing::new(Vec::with_capacity(2 + PRIVATE_KEY_BYTES_LEN));
        payload.push(prefix);
        payload.extend_from_slice(&self.to_bytes()[..]);
        payload.push(COMPRESS_MAGIC);
        base58::check_encode(&payload)
    }

    /// Serialize the scalar as 32 big-endian bytes.
    pub fn to_bytes(&self) -> Zeroizing<[u8; PRIVATE_KEY_BYTES_LEN]> {
        Zeroizing::new(self.inner.to_bytes().into())
    }

    /// Derive the corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte digest with an RFC6979 nonce, producing a low-S signature.
    pub fn sign(&self, hash: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    /// Sign a 32-byte digest and keep the recovery id (message signing).
    pub fn sign_compact(&self, hash: &[u8; 32]) -> Result<CompactSignature, PrimitivesError> {
        CompactSignature::sign(hash, self)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey").field("pub_key", &self.pub_key()).finish()
    }
}
