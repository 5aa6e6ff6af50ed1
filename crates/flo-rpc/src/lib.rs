#![deny(missing_docs)]

//! # flo-rpc
//!
//! JSON-RPC client for a FLO node daemon: wallet key import, unspent
//! outputs, mempool ancestry, raw transactions, peers and broadcasting.
//!
//! The [`NodeRpc`] trait is what the wallet depends on, so tests can
//! substitute an in-memory node.
//!
//! # Example
//!
//! ```no_run
//! use flo_rpc::{RpcClient, RpcConfig};
//!
//! let client = RpcClient::new(RpcConfig {
//!     url: "http://127.0.0.1:7313".to_string(),
//!     user: "flo".to_string(),
//!     password: "secret".to_string(),
//!     ..Default::default()
//! })
//! .unwrap();
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::{NodeRpc, RpcClient};
pub use error::RpcError;
pub use types::{MempoolEntry, PeerInfo, RawTransactionInfo, RpcConfig, UnspentOutput};
