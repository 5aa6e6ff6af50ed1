/// Errors from key handling, signatures, encodings and binary reads.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// Scalar is zero, out of range or not 32 bytes.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Bytes do not encode a point on secp256k1.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Malformed DER, a bad compact header or a failed recovery.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid WIF: {0}")]
    InvalidWif(String),

    /// Base58Check checksum did not match the payload.
    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Wrong length for a txid or block hash.
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    /// A read ran past the end of the buffer.
    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
