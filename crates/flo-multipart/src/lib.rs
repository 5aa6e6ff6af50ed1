//! FLO SDK - multipart payloads.
//!
//! A payload too large for one transaction's `floData` is split into
//! chunks of the form `oip-mp(part,max,address,reference,signature):payload`.
//! Every chunk after the first names the first chunk's txid as its
//! reference, and each one is signed by the publishing address.

pub mod chunk;
pub mod signer;
pub mod splitter;

mod error;
pub use chunk::{ChainMeta, MultipartChunk, MULTIPART_PREFIX};
pub use error::MultipartError;
pub use signer::{KeySigner, MessageSigner};
pub use splitter::{Splitter, CHOP_LEN, MAX_PARTS};
