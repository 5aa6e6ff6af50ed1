//! Message signing seam used by multipart chunks.

use std::future::Future;

use flo_primitives::ec::PrivateKey;
use flo_script::{Address, Network};

use crate::MultipartError;

/// Something that can sign text messages for an address.
///
/// Implemented by the wallet; `KeySigner` covers the single-key case.
pub trait MessageSigner {
    /// The address signatures verify against.
    fn address(&self) -> String;

    /// Sign `message`, returning a base64 compact signature.
    fn sign_message(
        &self,
        message: &[u8],
    ) -> impl Future<Output = Result<String, MultipartError>> + Send;
}

/// Signs with one in-memory private key.
#[derive(Clone, Debug)]
pub struct KeySigner {
    key: PrivateKey,
    address: Address,
}

impl KeySigner {
    pub fn new(key: PrivateKey, network: Network) -> Self {
        let address = Address::from_public_key(&key.pub_key(), network);
        KeySigner { key, address }
    }
}

impl MessageSigner for KeySigner {
    fn address(&self) -> String {
        self.address.to_string()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<String, MultipartError> {
        flo_message::sign(message, &self.key).map_err(|e| MultipartError::Signing(e.to_string()))
    }
}
