/// Elliptic curve cryptography on secp256k1.
///
/// Provides private keys with WIF import/export, public keys with
/// FLO address derivation, DER signatures for transaction inputs and
/// compact recoverable signatures for signed messages.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::{CompactSignature, Signature};
