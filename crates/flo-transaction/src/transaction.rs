//! Core transaction type for the FLO blockchain.
//!
//! A FLO transaction is a Bitcoin-style transaction whose serialization,
//! for version 2 and above, ends with a length-prefixed `floData` byte
//! string of at most 1040 bytes. The txid commits to `floData`.

use flo_primitives::chainhash::Hash;
use flo_primitives::util::{var_slice_len, ByteReader, ByteWriter, VarInt};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::TransactionError;

/// Maximum length of the `floData` field in bytes.
pub const MAX_FLO_DATA_LEN: usize = 1040;

/// First version whose serialization carries `floData`.
pub const FLO_DATA_MIN_VERSION: i32 = 2;

const WITNESS_MARKER: u8 = 0x00;
const WITNESS_FLAG: u8 = 0x01;

/// A FLO transaction.
///
/// # Wire format
///
/// | Field          | Size                                  |
/// |----------------|---------------------------------------|
/// | version        | 4 bytes (signed LE)                   |
/// | marker, flag   | `00 01`, only when any input has a witness |
/// | input count    | VarInt                                |
/// | inputs         | variable                              |
/// | output count   | VarInt                                |
/// | outputs        | variable                              |
/// | witnesses      | one stack per input, only with the flag |
/// | lock_time      | 4 bytes (LE)                          |
/// | floData        | VarInt + bytes, only when version >= 2 |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction format version.
    pub version: i32,

    /// Ordered list of transaction inputs.
    pub inputs: Vec<TransactionInput>,

    /// Ordered list of transaction outputs.
    pub outputs: Vec<TransactionOutput>,

    /// Lock time.
    pub lock_time: u32,

    flo_data: Vec<u8>,
}

impl Transaction {
    /// Create an empty version 2 transaction with no `floData`.
    pub fn new() -> Self {
        Transaction {
            version: FLO_DATA_MIN_VERSION,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
            flo_data: Vec::new(),
        }
    }

    // -----------------------------------------------------------------
    // floData
    // -----------------------------------------------------------------

    /// The `floData` bytes.
    pub fn flo_data(&self) -> &[u8] {
        &self.flo_data
    }

    /// Replace the `floData` bytes.
    ///
    /// The field is only serialized for version 2 and above.
    ///
    /// # Arguments
    /// * `data` - At most `MAX_FLO_DATA_LEN` bytes.
    ///
    /// # Returns
    /// `TransactionError::Validation` if `data` is too long; the previous
    /// value is kept in that case.
    pub fn set_flo_data(&mut self, data: Vec<u8>) -> Result<(), TransactionError> {
        check_flo_data_len(data.len())?;
        self.flo_data = data;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    /// Parse a transaction from hex, rejecting trailing bytes.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        Self::from_bytes(&decode_hex(hex_str)?)
    }

    /// Parse a transaction from hex, ignoring anything after it.
    pub fn from_hex_lenient(hex_str: &str) -> Result<Self, TransactionError> {
        Self::from_bytes_lenient(&decode_hex(hex_str)?)
    }

    /// Parse a transaction from raw bytes.
    ///
    /// # Arguments
    /// * `bytes` - Exactly one serialized transaction.
    ///
    /// # Returns
    /// The transaction, `Parse` on malformed or trailing data, `Integrity`
    /// when the witness flag is set without witness data, or `Validation`
    /// when `floData` exceeds the cap.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::Parse(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Parse a transaction from the front of `bytes`, ignoring the rest.
    pub fn from_bytes_lenient(bytes: &[u8]) -> Result<Self, TransactionError> {
        Self::read_from(&mut ByteReader::new(bytes))
    }

    /// Deserialize a transaction from a reader.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader.read_i32_le().map_err(|e| {
            TransactionError::Parse(format!("reading version: {}", e))
        })?;

        let has_witness = reader.peek(2) == Some(&[WITNESS_MARKER, WITNESS_FLAG][..]);
        if has_witness {
            reader.read_bytes(2).map_err(|e| {
                TransactionError::Parse(format!("reading witness marker: {}", e))
            })?;
        }

        let input_count = read_count(reader, "input count")?;
        let mut inputs = Vec::with_capacity(input_count.min(reader.remaining()));
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = read_count(reader, "output count")?;
        let mut outputs = Vec::with_capacity(output_count.min(reader.remaining()));
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        if has_witness {
            for input in inputs.iter_mut() {
                input.read_witness(reader)?;
            }
            if !inputs.iter().any(TransactionInput::has_witness) {
                return Err(TransactionError::Integrity(
                    "superfluous witness data".to_string(),
                ));
            }
        }

        let lock_time = reader.read_u32_le().map_err(|e| {
            TransactionError::Parse(format!("reading lock time: {}", e))
        })?;

        let flo_data = if version >= FLO_DATA_MIN_VERSION {
            let data = reader.read_var_bytes().map_err(|e| {
                TransactionError::Parse(format!("reading floData: {}", e))
            })?;
            check_flo_data_len(data.len())?;
            data.to_vec()
        } else {
            Vec::new()
        };

        Ok(Transaction { version, inputs, outputs, lock_time, flo_data })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    /// Whether any input carries witness data.
    pub fn has_witnesses(&self) -> bool {
        self.inputs.iter().any(TransactionInput::has_witness)
    }

    /// Write the serialization into `writer`.
    ///
    /// # Arguments
    /// * `writer` - Destination.
    /// * `with_witness` - Emit the marker, flag and witness stacks when any
    ///   input has a witness.
    /// * `include_flo_data` - Emit `floData` (version >= 2 only). Excluding
    ///   it yields the serialization seen by nodes unaware of the field.
    pub fn write_to(&self, writer: &mut ByteWriter, with_witness: bool, include_flo_data: bool) {
        let witness = with_witness && self.has_witnesses();
        writer.write_i32_le(self.version);
        if witness {
            writer.write_u8(WITNESS_MARKER);
            writer.write_u8(WITNESS_FLAG);
        }

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(writer);
        }

        if witness {
            for input in &self.inputs {
                input.write_witness(writer);
            }
        }

        writer.write_u32_le(self.lock_time);

        if include_flo_data && self.version >= FLO_DATA_MIN_VERSION {
            writer.write_var_bytes(&self.flo_data);
        }
    }

    /// Serialize with the given options.
    pub fn serialize(&self, with_witness: bool, include_flo_data: bool) -> Vec<u8> {
        let mut writer =
            ByteWriter::with_capacity(self.byte_length(with_witness, include_flo_data));
        self.write_to(&mut writer, with_witness, include_flo_data);
        writer.into_bytes()
    }

    /// Full network serialization: witnesses and `floData` included.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize(true, true)
    }

    /// Hex of the full network serialization.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Encoded length in bytes, computed without serializing.
    ///
    /// # Arguments
    /// * `with_witness` - Count the marker, flag and witness stacks.
    /// * `include_flo_data` - Count the `floData` field (version >= 2 only).
    pub fn byte_length(&self, with_witness: bool, include_flo_data: bool) -> usize {
        let witness = with_witness && self.has_witnesses();
        let mut len = 4
            + VarInt::from(self.inputs.len()).length()
            + self.inputs.iter().map(TransactionInput::byte_length).sum::<usize>()
            + VarInt::from(self.outputs.len()).length()
            + self.outputs.iter().map(TransactionOutput::byte_length).sum::<usize>()
            + 4;
        if witness {
            len += 2 + self.inputs.iter().map(TransactionInput::witness_length).sum::<usize>();
        }
        if include_flo_data && self.version >= FLO_DATA_MIN_VERSION {
            len += var_slice_len(self.flo_data.len());
        }
        len
    }

    /// Full serialized size in bytes.
    pub fn size(&self) -> usize {
        self.byte_length(true, true)
    }

    // -----------------------------------------------------------------
    // Identifiers
    // -----------------------------------------------------------------

    /// Transaction id: SHA-256d of the witness-stripped serialization,
    /// `floData` included.
    pub fn tx_id(&self) -> Hash {
        Hash::sha256d(&self.serialize(false, true))
    }

    /// Transaction id in display (byte-reversed hex) form.
    pub fn tx_id_hex(&self) -> String {
        self.tx_id().to_string()
    }

    /// Witness id: SHA-256d of the full serialization.
    pub fn witness_id(&self) -> Hash {
        Hash::sha256d(&self.to_bytes())
    }

    // -----------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------

    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    /// Sum of all output values.
    pub fn total_output_satoshis(&self) -> u64 {
        self.outputs.iter().map(|o| o.satoshis).sum()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn check_flo_data_len(len: usize) -> Result<(), TransactionError> {
    if len > MAX_FLO_DATA_LEN {
        return Err(TransactionError::Validation(format!(
            "floData is {} bytes, maximum is {}",
            len, MAX_FLO_DATA_LEN
        )));
    }
    Ok(())
}

fn decode_hex(hex_str: &str) -> Result<Vec<u8>, TransactionError> {
    hex::decode(hex_str).map_err(|e| TransactionError::Parse(format!("invalid hex: {}", e)))
}

fn read_count(reader: &mut ByteReader, what: &str) -> Result<usize, TransactionError> {
    let count = reader
        .read_varint()
        .map_err(|e| TransactionError::Parse(format!("reading {}: {}", what, e)))?;
    usize::try_from(count.value())
        .map_err(|_| TransactionError::Parse(format!("{} {} is too large", what, count.value())))
}
