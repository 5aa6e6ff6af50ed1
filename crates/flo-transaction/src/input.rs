//! Transaction input referencing a previous output.
//!
//! Carries the outpoint, unlocking script, sequence number and an optional
//! witness stack. The witness is serialized separately from the input body,
//! after all outputs, and only when some input of the transaction has one.

use flo_primitives::util::{ByteReader, ByteWriter, VarInt};
use flo_script::Script;

use crate::TransactionError;

/// Default sequence number indicating a finalized input.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single input in a FLO transaction.
///
/// # Wire format
///
/// | Field              | Size             |
/// |--------------------|------------------|
/// | source_txid        | 32 bytes         |
/// | source_tx_out_index| 4 bytes (LE)     |
/// | script length      | VarInt           |
/// | unlocking_script   | variable         |
/// | sequence_number    | 4 bytes (LE)     |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// Txid of the output being spent, in internal byte order.
    pub source_txid: [u8; 32],

    /// Index of the output within the source transaction.
    pub source_tx_out_index: u32,

    /// The unlocking script (scriptSig). Empty until signed, and empty for
    /// witness spends.
    pub unlocking_script: Script,

    /// Sequence number. Defaults to `0xFFFFFFFF`.
    pub sequence_number: u32,

    /// Witness stack items; empty for legacy spends.
    pub witness: Vec<Vec<u8>>,
}

impl TransactionInput {
    /// Create an input spending `source_txid:vout` with an empty script.
    pub fn new(source_txid: [u8; 32], source_tx_out_index: u32) -> Self {
        TransactionInput {
            source_txid,
            source_tx_out_index,
            unlocking_script: Script::new(),
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            witness: Vec::new(),
        }
    }

    /// Whether this input carries any witness items.
    pub fn has_witness(&self) -> bool {
        !self.witness.is_empty()
    }

    /// Deserialize the input body (not the witness).
    ///
    /// # Arguments
    /// * `reader` - The reader positioned at the start of an encoded input.
    ///
    /// # Returns
    /// The input, or `TransactionError::Parse` on truncated data.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let source_txid = reader.read_array::<32>().map_err(|e| {
            TransactionError::Parse(format!("reading source txid: {}", e))
        })?;
        let source_tx_out_index = reader.read_u32_le().map_err(|e| {
            TransactionError::Parse(format!("reading output index: {}", e))
        })?;
        let script = reader.read_var_bytes().map_err(|e| {
            TransactionError::Parse(format!("reading unlocking script: {}", e))
        })?;
        let sequence_number = reader.read_u32_le().map_err(|e| {
            TransactionError::Parse(format!("reading sequence number: {}", e))
        })?;

        Ok(TransactionInput {
            source_txid,
            source_tx_out_index,
            unlocking_script: Script::from_bytes(script),
            sequence_number,
            witness: Vec::new(),
        })
    }

    /// Read this input's witness stack.
    pub fn read_witness(&mut self, reader: &mut ByteReader) -> Result<(), TransactionError> {
        let count = reader.read_varint().map_err(|e| {
            TransactionError::Parse(format!("reading witness item count: {}", e))
        })?;
        let count = count.value() as usize;
        let mut items = Vec::with_capacity(count.min(reader.remaining()));
        for _ in 0..count {
            let item = reader.read_var_bytes().map_err(|e| {
                TransactionError::Parse(format!("reading witness item: {}", e))
            })?;
            items.push(item.to_vec());
        }
        self.witness = items;
        Ok(())
    }

    /// Serialize the input body.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        self.write_outpoint(writer);
        writer.write_var_bytes(self.unlocking_script.to_bytes());
        writer.write_u32_le(self.sequence_number);
    }

    /// Serialize only the outpoint (txid and output index).
    pub fn write_outpoint(&self, writer: &mut ByteWriter) {
        writer.write_bytes(&self.source_txid);
        writer.write_u32_le(self.source_tx_out_index);
    }

    /// Serialize the witness stack.
    pub fn write_witness(&self, writer: &mut ByteWriter) {
        writer.write_varint(VarInt::from(self.witness.len()));
        for item in &self.witness {
            writer.write_var_bytes(item);
        }
    }

    /// Encoded length of the input body.
    pub fn byte_length(&self) -> usize {
        32 + 4 + flo_primitives::util::var_slice_len(self.unlocking_script.len()) + 4
    }

    /// Encoded length of the witness stack.
    pub fn witness_length(&self) -> usize {
        VarInt::from(self.witness.len()).length()
            + self
                .witness
                .iter()
                .map(|w| flo_primitives::util::var_slice_len(w.len()))
                .sum::<usize>()
    }

    /// Source txid in display (byte-reversed hex) form.
    pub fn source_txid_hex(&self) -> String {
        let mut id = self.source_txid;
        id.reverse();
        hex::encode(id)
    }
}
