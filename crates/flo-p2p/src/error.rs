/// Errors raised while talking to a peer.
#[derive(Debug, thiserror::Error)]
pub enum P2pError {
    /// The TCP connection could not be opened.
    #[error("connect to {addr} failed: {reason}")]
    Connect { addr: String, reason: String },

    /// A connect or handshake step took too long.
    #[error("timed out during {0}")]
    Timeout(&'static str),

    /// Socket failure after connecting.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer sent bytes that do not frame or decode.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The announcer has no live connection.
    #[error("not connected")]
    NotConnected,

    /// A transaction handed to the announcer did not decode.
    #[error("transaction error: {0}")]
    Transaction(#[from] flo_transaction::TransactionError),
}

impl From<flo_primitives::PrimitivesError> for P2pError {
    fn from(e: flo_primitives::PrimitivesError) -> Self {
        P2pError::Protocol(e.to_string())
    }
}
