#![deny(missing_docs)]

//! FLO SDK.
//!
//! Re-exports every FLO SDK component for single-crate usage.

pub use flo_primitives as primitives;
pub use flo_script as script;
pub use flo_transaction as transaction;
pub use flo_message as message;
pub use flo_multipart as multipart;
pub use flo_rpc as rpc;
pub use flo_p2p as p2p;
pub use flo_wallet as wallet;
