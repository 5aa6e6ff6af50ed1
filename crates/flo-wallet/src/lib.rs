//! FLO SDK - publishing wallet.
//!
//! A [`Wallet`] holds one key and one rolling change output. Each data
//! transaction spends the previous one's change, so pending sends form a
//! single mempool chain; [`MempoolChainManager`] keeps that chain inside the
//! node's ancestor limits and [`PeerRepair`] rebroadcasts it when it stalls.
//! [`Publisher`] turns payloads into one transaction or a signed multipart
//! sequence.

pub mod chain;
pub mod clock;
pub mod coin;
pub mod config;
pub mod logging;
pub mod publisher;
pub mod repair;
pub mod wallet;

mod error;
pub use error::WalletError;

pub use chain::{ChainState, MempoolChainManager};
pub use clock::{Clock, TokioClock};
pub use coin::{CoinSelector, LargestFirst, Utxo};
pub use config::{ChainLimits, WalletConfig};
pub use logging::{init_logging, LogFormat};
pub use publisher::{DataSender, PublishError, PublishStage, Publisher};
pub use repair::{PeerRepair, Repairer};
pub use wallet::{Wallet, DUST_LIMIT};
