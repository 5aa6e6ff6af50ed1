/// Script type - a sequence of opcodes and data pushes.
///
/// Used for the locking scripts of outputs, the unlocking scripts of inputs
/// and the script code committed to by signature hashes.

use std::fmt;

use crate::chunk::{decode_script, push_data_prefix, ScriptChunk};
use crate::opcodes::*;
use crate::ScriptError;

/// A script, represented as a byte vector newtype.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create an empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        Ok(Script(hex::decode(hex_str)?))
    }

    /// Create a script from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Create a script from space-separated ASM.
    ///
    /// Known opcode names are emitted directly; any other token is treated
    /// as hex data and pushed minimally.
    ///
    /// # Arguments
    /// * `asm` - ASM text such as `OP_DUP OP_HASH160 <hex> OP_EQUALVERIFY OP_CHECKSIG`.
    ///
    /// # Returns
    /// The script, or an error if a data token is not valid hex.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        for token in asm.split_whitespace() {
            match string_to_opcode(token) {
                Some(op) if !(OP_DATA_1..=OP_PUSHDATA4).contains(&op) => {
                    script.0.push(op);
                }
                _ => script.append_push_data(&hex::decode(token)?)?,
            }
        }
        Ok(script)
    }

    /// Pay-to-pubkey-hash locking script:
    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn p2pkh(pub_key_hash: &[u8; 20]) -> Self {
        let mut bytes = Vec::with_capacity(25);
        bytes.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
        bytes.extend_from_slice(pub_key_hash);
        bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Script(bytes)
    }

    /// Version-0 witness pay-to-pubkey-hash locking script: `OP_0 <20 bytes>`.
    pub fn p2wpkh(pub_key_hash: &[u8; 20]) -> Self {
        let mut bytes = Vec::with_capacity(22);
        bytes.extend_from_slice(&[OP_0, OP_DATA_20]);
        bytes.extend_from_slice(pub_key_hash);
        Script(bytes)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Lowercase hex of the script bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Space-separated ASM, or an empty string when the script is malformed.
    pub fn to_asm(&self) -> String {
        match self.chunks() {
            Ok(chunks) => chunks
                .iter()
                .map(ScriptChunk::to_asm_string)
                .collect::<Vec<_>>()
                .join(" "),
            Err(_) => String::new(),
        }
    }

    /// Borrow the underlying bytes.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// True for the exact 25-byte P2PKH template.
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// True for the exact 22-byte P2WPKH template.
    pub fn is_p2wpkh(&self) -> bool {
        self.0.len() == 22 && self.0[0] == OP_0 && self.0[1] == OP_DATA_20
    }

    /// Extract the 20-byte hash from a P2PKH or P2WPKH script.
    pub fn public_key_hash(&self) -> Result<[u8; 20], ScriptError> {
        let range = if self.is_p2pkh() {
            3..23
        } else if self.is_p2wpkh() {
            2..22
        } else {
            return Err(ScriptError::NotP2PKH);
        };
        let mut out = [0u8; 20];
        out.copy_from_slice(&self.0[range]);
        Ok(out)
    }

    /// Parse the script into chunks.
    pub fn chunks(&self) -> Result<Vec<ScriptChunk>, ScriptError> {
        decode_script(&self.0)
    }

    /// Copy of this script with every OP_CODESEPARATOR chunk removed.
    ///
    /// Only bare opcodes are dropped; a 0xab byte inside pushed data is
    /// left alone, and every kept chunk is copied byte for byte.
    ///
    /// # Returns
    /// The stripped script, or an error if a push is truncated.
    pub fn remove_codeseparators(&self) -> Result<Script, ScriptError> {
        let chunks = self.chunks()?;
        let mut out = Vec::with_capacity(self.0.len());
        for chunk in chunks.iter().filter(|c| !(c.data.is_none() && c.op == OP_CODESEPARATOR)) {
            out.extend_from_slice(&self.0[chunk.span.clone()]);
        }
        Ok(Script(out))
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Append `data` with the minimal push prefix.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Append bare opcodes. Push opcodes are rejected.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) -> Result<(), ScriptError> {
        if let Some(op) = opcodes.iter().find(|op| (OP_DATA_1..=OP_PUSHDATA4).contains(*op)) {
            return Err(ScriptError::InvalidOpcodeType(opcode_to_string(*op)));
        }
        self.0.extend_from_slice(opcodes);
        Ok(())
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
