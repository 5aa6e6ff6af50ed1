/// Error types for script operations.
///
/// Covers malformed pushes, hex decoding and address validation.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Attempted to append a push opcode as a bare opcode.
    #[error("use append_push_data for push data opcodes: {0}")]
    InvalidOpcodeType(String),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Address version byte does not belong to a known FLO network.
    #[error("unsupported address version 0x{0:02x}")]
    UnsupportedAddress(u8),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Script is not a P2PKH script.
    #[error("not a P2PKH script")]
    NotP2PKH,

    /// A push runs past the end of the script.
    #[error("push at offset {0} runs past the end of the script")]
    DataTooSmall(usize),

    /// Push data exceeds maximum allowed size.
    #[error("data too big")]
    DataTooBig,

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] flo_primitives::PrimitivesError),
}
