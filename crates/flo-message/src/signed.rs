//! Signed messages in the Bitcoin `signmessage` format.
//!
//! The digest is double-SHA256 over the varint-prefixed magic prefix and
//! the varint-prefixed message. Signatures are the 65-byte recoverable
//! compact layout, base64 encoded, so a verifier only needs the address.

use base64::Engine;

use flo_primitives::ec::{CompactSignature, PrivateKey};
use flo_primitives::hash::{hash160, sha256d};
use flo_primitives::util::ByteWriter;
use flo_script::{Address, Network};

use crate::MessageError;

/// Prefix mixed into every signed-message digest.
pub const MESSAGE_PREFIX: &str = "Florincoin Signed Message:\n";

/// Digest signed for `message`.
pub fn magic_hash(message: &[u8]) -> [u8; 32] {
    let mut writer = ByteWriter::with_capacity(MESSAGE_PREFIX.len() + message.len() + 10);
    writer.write_var_bytes(MESSAGE_PREFIX.as_bytes());
    writer.write_var_bytes(message);
    sha256d(writer.as_bytes())
}

/// Sign a message, returning the base64 compact signature.
pub fn sign(message: &[u8], signer: &PrivateKey) -> Result<String, MessageError> {
    let sig = CompactSignature::sign(&magic_hash(message), signer)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(sig.to_bytes()))
}

/// Recover the address that produced `signature` over `message`.
///
/// # Arguments
/// * `message` - The signed bytes.
/// * `signature` - Base64 compact signature.
/// * `network` - Network whose address version to use.
///
/// # Returns
/// The signer's address, or an error when the signature is malformed.
pub fn recover_address(
    message: &[u8],
    signature: &str,
    network: Network,
) -> Result<Address, MessageError> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(signature.trim())
        .map_err(|e| MessageError::Encoding(e.to_string()))?;
    let sig = CompactSignature::from_bytes(&raw)?;
    let pub_key = sig.recover(&magic_hash(message))?;

    let hash = if sig.is_compressed() {
        pub_key.hash160()
    } else {
        hash160(&pub_key.to_uncompressed())
    };
    Ok(Address::from_public_key_hash(&hash, network))
}

/// Check that `signature` over `message` was made by the owner of `address`.
///
/// Returns `Ok(false)` for a well-formed signature by someone else and an
/// error only when the signature cannot be decoded or recovered.
pub fn verify(message: &[u8], signature: &str, address: &Address) -> Result<bool, MessageError> {
    let recovered = recover_address(message, signature, address.network())?;
    Ok(recovered.public_key_hash() == address.public_key_hash())
}

/// Like `verify`, but reports a mismatch as `MessageError::AddressMismatch`.
pub fn ensure_signed_by(
    message: &[u8],
    signature: &str,
    address: &Address,
) -> Result<(), MessageError> {
    let recovered = recover_address(message, signature, address.network())?;
    if recovered.public_key_hash() != address.public_key_hash() {
        return Err(MessageError::AddressMismatch {
            expected: address.to_string(),
            actual: recovered.to_string(),
        });
    }
    Ok(())
}
