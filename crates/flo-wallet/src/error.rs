use flo_multipart::MultipartError;
use flo_p2p::P2pError;
use flo_rpc::RpcError;
use flo_transaction::TransactionError;

/// Error types for wallet operations.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),
    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError),
    #[error("network error: {0}")]
    Network(#[from] P2pError),
    /// The rolling output is neither confirmed nor in the mempool. Not
    /// retried.
    #[error("chain state error: {0}")]
    ChainState(String),
    #[error("insufficient funds: need {needed} satoshis, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("no spendable output: {0}")]
    NoSpendableOutput(String),
    #[error("key error: {0}")]
    Key(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),
}

impl From<flo_primitives::PrimitivesError> for WalletError {
    fn from(e: flo_primitives::PrimitivesError) -> Self {
        WalletError::Key(e.to_string())
    }
}
