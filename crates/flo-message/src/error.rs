/// Error types for message operations.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// The signature is not valid base64.
    #[error("signature is not valid base64: {0}")]
    Encoding(String),
    /// The signature decodes but is not a usable compact signature.
    #[error("{0}")]
    Primitives(#[from] flo_primitives::PrimitivesError),
    /// The address could not be parsed.
    #[error("{0}")]
    Script(#[from] flo_script::ScriptError),
    /// The recovered signer does not own the expected address.
    #[error("signature was made by {actual}, expected {expected}")]
    AddressMismatch {
        /// The address the caller expected.
        expected: String,
        /// The address recovered from the signature.
        actual: String,
    },
}
