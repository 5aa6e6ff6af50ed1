/// FLO SDK - Cryptographic primitives, hashing, and binary utilities.
///
/// This crate provides the foundational building blocks shared by the
/// transaction codec, the multipart protocol and the wallet:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160)
/// - Chain hash type for transaction identification
/// - secp256k1 keys and ECDSA signatures (DER and compact/recoverable)
/// - Variable-length integer encoding with a cursor reader and a writer
/// - Base58Check encoding

pub mod hash;
pub mod chainhash;
pub mod util;
pub mod base58;
pub mod ec;

mod error;
pub use error::PrimitivesError;
