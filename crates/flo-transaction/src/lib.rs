/// FLO SDK - Transaction serialization, signature hashing and building.
///
/// Provides the Transaction type with its length-prefixed `floData` field,
/// optional segregated witness data, the legacy and witness-v0 signature
/// hashes (both able to commit to `floData`), P2PKH / P2WPKH unlocking
/// templates and a builder that produces signed data transactions.

pub mod transaction;
pub mod input;
pub mod output;
pub mod sighash;
pub mod template;
pub mod builder;

mod error;
pub use error::TransactionError;
pub use transaction::{Transaction, MAX_FLO_DATA_LEN};
pub use input::TransactionInput;
pub use output::TransactionOutput;
pub use builder::{SignatureHashKind, TransactionBuilder};

#[cfg(test)]
mod tests;
