/// FLO SDK - Script handling and address encoding.
///
/// Provides the Script byte newtype, opcode constants, chunk parsing that
/// keeps each chunk's original encoding, the standard P2PKH / P2WPKH
/// templates, and Base58Check FLO addresses per network.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod address;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use address::{Address, Network};
pub use chunk::ScriptChunk;
