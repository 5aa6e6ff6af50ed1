/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// A value breaks a protocol limit (floData length, input index, network).
    #[error("validation error: {0}")]
    Validation(String),
    /// Truncated or malformed bytes, or trailing data after a transaction.
    #[error("parse error: {0}")]
    Parse(String),
    /// The bytes decode but are internally inconsistent.
    #[error("data integrity error: {0}")]
    Integrity(String),
    /// An error occurred while producing an input signature.
    #[error("signing error: {0}")]
    Signing(String),
    /// An underlying script error (forwarded from `flo-script`).
    #[error("script error: {0}")]
    Script(#[from] flo_script::ScriptError),
    /// An underlying primitives error (forwarded from `flo-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] flo_primitives::PrimitivesError),
}
