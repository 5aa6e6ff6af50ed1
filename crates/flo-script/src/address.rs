/// FLO address handling.
///
/// A FLO address is a Base58Check pay-to-pubkey-hash address whose version
/// byte identifies the network. The same `Network` also carries the WIF
/// prefix for private keys and the P2P message magic.

use std::fmt;
use std::str::FromStr;

use flo_primitives::base58;
use flo_primitives::ec::PublicKey;

use crate::{Script, ScriptError};

/// FLO network selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// FLO mainnet (addresses start with 'F').
    #[default]
    Mainnet,
    /// FLO testnet.
    Testnet,
    /// Local regression-test network. Shares testnet address and WIF prefixes.
    Regtest,
}

impl Network {
    /// Address version byte for pay-to-pubkey-hash.
    pub fn pub_key_hash_version(&self) -> u8 {
        match self {
            Network::Mainnet => 0x23,
            Network::Testnet | Network::Regtest => 0x73,
        }
    }

    /// Version byte of WIF-encoded private keys.
    pub fn wif_prefix(&self) -> u8 {
        match self {
            Network::Mainnet => 0xa3,
            Network::Testnet | Network::Regtest => 0xef,
        }
    }

    /// P2P message start bytes as they appear on the wire.
    pub fn magic(&self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0xfd, 0xc0, 0xa5, 0xf1],
            Network::Testnet => [0xfd, 0xc0, 0x5a, 0xf2],
            Network::Regtest => [0xfa, 0xbf, 0xb5, 0xda],
        }
    }

    /// Default P2P port of a node on this network.
    pub fn default_p2p_port(&self) -> u16 {
        match self {
            Network::Mainnet => 7312,
            Network::Testnet => 17312,
            Network::Regtest => 17412,
        }
    }

    fn from_pub_key_hash_version(version: u8) -> Option<Self> {
        match version {
            0x23 => Some(Network::Mainnet),
            0x73 => Some(Network::Testnet),
            _ => None,
        }
    }
}

/// A FLO pay-to-pubkey-hash address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    address_string: String,
    public_key_hash: [u8; 20],
    network: Network,
}

impl Address {
    /// Parse a Base58Check address string.
    ///
    /// Testnet and regtest share a version byte, so such addresses parse
    /// as `Network::Testnet`.
    ///
    /// # Arguments
    /// * `addr` - The address string.
    ///
    /// # Returns
    /// The address, or an error for a bad encoding, checksum, length or
    /// unknown version byte.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let payload = base58::check_decode(addr)
            .map_err(|e| ScriptError::InvalidAddress(format!("{}: {}", addr, e)))?;
        if payload.len() != 21 {
            return Err(ScriptError::InvalidAddress(format!(
                "{}: decoded length {}, want 21",
                addr,
                payload.len()
            )));
        }
        let network = Network::from_pub_key_hash_version(payload[0])
            .ok_or(ScriptError::UnsupportedAddress(payload[0]))?;
        let mut public_key_hash = [0u8; 20];
        public_key_hash.copy_from_slice(&payload[1..]);
        Ok(Address { address_string: addr.to_string(), public_key_hash, network })
    }

    /// Build an address from a 20-byte public key hash.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        let mut payload = Vec::with_capacity(21);
        payload.push(network.pub_key_hash_version());
        payload.extend_from_slice(hash);
        Address {
            address_string: base58::check_encode(&payload),
            public_key_hash: *hash,
            network,
        }
    }

    /// Build the address of a public key (compressed form).
    pub fn from_public_key(pub_key: &PublicKey, network: Network) -> Self {
        Self::from_public_key_hash(&pub_key.hash160(), network)
    }

    pub fn public_key_hash(&self) -> &[u8; 20] {
        &self.public_key_hash
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn as_str(&self) -> &str {
        &self.address_string
    }

    /// The P2PKH locking script paying to this address.
    pub fn locking_script(&self) -> Script {
        Script::p2pkh(&self.public_key_hash)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address_string)
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flo_primitives::ec::PrivateKey;

    fn key_one() -> PrivateKey {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        PrivateKey::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_mainnet_address_roundtrip() {
        let address = Address::from_public_key(&key_one().pub_key(), Network::Mainnet);
        assert!(address.as_str().starts_with('F'));
        assert_eq!(address.as_str(), key_one().pub_key().to_address(0x23));

        let parsed: Address = address.as_str().parse().unwrap();
        assert_eq!(parsed, address);
        assert_eq!(parsed.network(), Network::Mainnet);
    }

    #[test]
    fn test_regtest_parses_as_testnet() {
        let address = Address::from_public_key(&key_one().pub_key(), Network::Regtest);
        let parsed = Address::from_string(address.as_str()).unwrap();
        assert_eq!(parsed.network(), Network::Testnet);
        assert_eq!(parsed.public_key_hash(), address.public_key_hash());
    }

    #[test]
    fn test_bitcoin_address_is_unsupported() {
        assert!(matches!(
            Address::from_string("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"),
            Err(ScriptError::UnsupportedAddress(0x00))
        ));
    }

    #[test]
    fn test_bad_checksum() {
        let address = Address::from_public_key(&key_one().pub_key(), Network::Mainnet);
        let mut s = address.as_str().to_string();
        let last = s.pop().unwrap();
        s.push(if last == 'z' { 'y' } else { 'z' });
        assert!(Address::from_string(&s).is_err());
    }

    #[test]
    fn test_locking_script() {
        let address = Address::from_public_key(&key_one().pub_key(), Network::Mainnet);
        assert_eq!(
            address.locking_script().to_hex(),
            "76a914751e76e8199196d454941c45d1b3a323f1433bd688ac"
        );
    }

    #[test]
    fn test_network_constants() {
        assert_eq!(Network::Mainnet.wif_prefix(), 0xa3);
        assert_eq!(Network::Testnet.wif_prefix(), 0xef);
        assert_eq!(Network::Mainnet.magic(), [0xfd, 0xc0, 0xa5, 0xf1]);
        assert_eq!(Network::Regtest.magic(), [0xfa, 0xbf, 0xb5, 0xda]);
    }
}
