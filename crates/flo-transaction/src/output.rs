//! Transaction output with satoshi value and locking script.

use flo_primitives::util::{var_slice_len, ByteReader, ByteWriter};
use flo_script::Script;

use crate::TransactionError;

/// A single output in a FLO transaction.
///
/// # Wire format
///
/// | Field            | Size           |
/// |------------------|----------------|
/// | satoshis         | 8 bytes (LE)   |
/// | script length    | VarInt         |
/// | locking_script   | variable       |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Value in satoshis.
    pub satoshis: u64,

    /// The locking script (scriptPubKey).
    pub locking_script: Script,
}

impl TransactionOutput {
    pub fn new(satoshis: u64, locking_script: Script) -> Self {
        TransactionOutput { satoshis, locking_script }
    }

    /// The placeholder output used when signature hashing blanks an output:
    /// value `0xffffffffffffffff` and an empty script.
    pub fn blank() -> Self {
        TransactionOutput { satoshis: u64::MAX, locking_script: Script::new() }
    }

    /// Deserialize an output.
    ///
    /// # Returns
    /// The output, or `TransactionError::Parse` on truncated data.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let satoshis = reader.read_u64_le().map_err(|e| {
            TransactionError::Parse(format!("reading satoshis: {}", e))
        })?;
        let script = reader.read_var_bytes().map_err(|e| {
            TransactionError::Parse(format!("reading locking script: {}", e))
        })?;
        Ok(TransactionOutput { satoshis, locking_script: Script::from_bytes(script) })
    }

    /// Serialize this output.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_u64_le(self.satoshis);
        writer.write_var_bytes(self.locking_script.to_bytes());
    }

    /// Serialized bytes, as committed to by the witness-v0 hashOutputs.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(self.byte_length());
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Encoded length of this output.
    pub fn byte_length(&self) -> usize {
        8 + var_slice_len(self.locking_script.len())
    }
}
