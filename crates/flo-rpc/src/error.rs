//! Error types for node RPC calls.

/// Errors that can occur when calling the node.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize or deserialize data.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The node answered with an error object.
    #[error("node error ({code}): {message}")]
    Remote {
        /// The JSON-RPC error code.
        code: i64,
        /// The node's message.
        message: String,
    },

    /// The node answered with neither a result nor an error.
    #[error("empty result for {0}")]
    EmptyResult(String),

    /// The node answered with a non-JSON body and this HTTP status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

impl RpcError {
    /// Whether the node reported that a transaction is not in its mempool.
    pub fn is_not_in_mempool(&self) -> bool {
        match self {
            RpcError::Remote { message, .. } => {
                message.trim_end_matches('.') == "Transaction not in mempool"
            }
            _ => false,
        }
    }
}
