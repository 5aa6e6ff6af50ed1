//! # flo-p2p
//!
//! Just enough of the peer protocol to push transactions to a node's
//! peers: frame codec, version handshake, `inv` announcements and answers
//! to `getdata` and `ping`.

pub mod message;
pub mod peer;

mod error;
pub use error::P2pError;

pub use message::{InvVector, Message, MSG_TX, MSG_WITNESS_TX};
pub use peer::{PeerAnnouncer, PeerConfig};
