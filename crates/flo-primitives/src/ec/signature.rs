//! ECDSA signatures over secp256k1.
//!
//! `Signature` is the DER form placed in transaction unlocking scripts.
//! `CompactSignature` is the 65-byte recoverable form used by signed
//! messages: a header byte `27 + recovery_id (+4 when compressed)`
//! followed by R and S.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{self, RecoveryId, VerifyingKey};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Length of a compact recoverable signature.
pub const COMPACT_LEN: usize = 65;

const COMPACT_HEADER_BASE: u8 = 27;
const COMPACT_COMPRESSED_FLAG: u8 = 4;

/// Low-S normalize, returning whether S was flipped.
fn normalize(sig: ecdsa::Signature) -> (ecdsa::Signature, bool) {
    match sig.normalize_s() {
        Some(normalized) => (normalized, true),
        None => (sig, false),
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// An ECDSA signature with low-S normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    inner: ecdsa::Signature,
}

impl Signature {
    /// Sign a 32-byte digest with an RFC6979 deterministic nonce.
    ///
    /// # Arguments
    /// * `hash` - The digest to sign.
    /// * `priv_key` - The signing key.
    ///
    /// # Returns
    /// A low-S signature.
    pub fn sign(hash: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let (sig, _) = priv_key
            .signing_key()
            .sign_prehash_recoverable(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature { inner: normalize(sig).0 })
    }

    /// Parse a strict DER signature.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = ecdsa::Signature::from_der(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature { inner })
    }

    /// Serialize as DER with S in the lower half of the curve order.
    pub fn to_der(&self) -> Vec<u8> {
        normalize(self.inner).0.to_der().as_bytes().to_vec()
    }

    /// Verify against a 32-byte digest and a public key.
    pub fn verify(&self, hash: &[u8; 32], pub_key: &PublicKey) -> bool {
        pub_key.verifying_key().verify_prehash(hash, &self.inner).is_ok()
    }
}

// ---------------------------------------------------------------------------
// CompactSignature
// ---------------------------------------------------------------------------

/// A recoverable signature in the 65-byte compact layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompactSignature {
    inner: ecdsa::Signature,
    recovery_id: RecoveryId,
    compressed: bool,
}

impl CompactSignature {
    /// Sign a 32-byte digest, recording the recovery id for a compressed key.
    pub fn sign(hash: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let (sig, recovery_id) = priv_key
            .signing_key()
            .sign_prehash_recoverable(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let (inner, flipped) = normalize(sig);
        let recovery_id = if flipped {
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced())
        } else {
            recovery_id
        };
        Ok(CompactSignature { inner, recovery_id, compressed: true })
    }

    /// Parse the 65-byte layout.
    ///
    /// # Arguments
    /// * `bytes` - Header byte followed by 32-byte R and 32-byte S.
    ///
    /// # Returns
    /// The signature, or `InvalidSignature` for a bad length, header or scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != COMPACT_LEN {
            return Err(PrimitivesError::InvalidSignature(format!(
                "compact signature must be {} bytes, got {}",
                COMPACT_LEN,
                bytes.len()
            )));
        }
        let header = bytes[0];
        if !(COMPACT_HEADER_BASE..COMPACT_HEADER_BASE + 8).contains(&header) {
            return Err(PrimitivesError::InvalidSignature(format!(
                "invalid compact signature header {}",
                header
            )));
        }
        let offset = header - COMPACT_HEADER_BASE;
        let compressed = offset & COMPACT_COMPRESSED_FLAG != 0;
        let recovery_id = RecoveryId::from_byte(offset & 3).ok_or_else(|| {
            PrimitivesError::InvalidSignature("invalid recovery id".to_string())
        })?;
        let inner = ecdsa::Signature::from_slice(&bytes[1..])
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(CompactSignature { inner, recovery_id, compressed })
    }

    /// Serialize to the 65-byte layout.
    pub fn to_bytes(&self) -> [u8; COMPACT_LEN] {
        let mut out = [0u8; COMPACT_LEN];
        let flag = if self.compressed { COMPACT_COMPRESSED_FLAG } else { 0 };
        out[0] = COMPACT_HEADER_BASE + self.recovery_id.to_byte() + flag;
        out[1..].copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Whether the signer's key was compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Recover the public key that produced this signature over `hash`.
    pub fn recover(&self, hash: &[u8; 32]) -> Result<PublicKey, PrimitivesError> {
        let vk = VerifyingKey::recover_from_prehash(hash, &self.inner, self.recovery_id)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(PublicKey::from_k256_verifying_key(&vk))
    }

    /// The non-recoverable part, usable with `PublicKey::verify`.
    pub fn signature(&self) -> Signature {
        Signature { inner: self.inner }
    }
}
