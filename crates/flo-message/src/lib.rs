#![deny(missing_docs)]

//! FLO SDK - signed messages.
//!
//! Signs arbitrary messages with a private key and verifies them against a
//! FLO address, using recoverable compact signatures encoded as base64.

mod error;
pub mod signed;

pub use error::MessageError;
pub use signed::{ensure_signed_by, magic_hash, recover_address, sign, verify, MESSAGE_PREFIX};
