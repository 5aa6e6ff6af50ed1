//! Script chunk parsing and push encoding.
//!
//! A chunk is either a bare opcode or a data push. Parsing records the byte
//! span each chunk occupied so callers can drop chunks (OP_CODESEPARATOR
//! removal during signature hashing) while every remaining chunk keeps its
//! original, possibly non-minimal, encoding.

use std::ops::Range;

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes) this is the length.
    pub op: u8,
    /// The pushed bytes, if this chunk is a push.
    pub data: Option<Vec<u8>>,
    /// Byte range of the whole chunk (opcode, length prefix and data) in
    /// the script it was parsed from.
    pub span: Range<usize>,
}

impl ScriptChunk {
    /// Render for ASM: pushes as hex, opcodes by name.
    pub fn to_asm_string(&self) -> String {
        match &self.data {
            Some(data) => hex::encode(data),
            None => opcode_to_string(self.op),
        }
    }
}

/// Decode raw script bytes into chunks.
///
/// # Arguments
/// * `bytes` - The raw script bytes.
///
/// # Returns
/// The chunks in order, or `DataTooSmall` if a push is truncated.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut chunks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let op = bytes[pos];
        let (header, len) = match op {
            OP_DATA_1..=OP_DATA_75 => (1, op as usize),
            OP_PUSHDATA1 => {
                let b = bytes.get(pos + 1).ok_or(ScriptError::DataTooSmall(start))?;
                (2, *b as usize)
            }
            OP_PUSHDATA2 => {
                let b = bytes.get(pos + 1..pos + 3).ok_or(ScriptError::DataTooSmall(start))?;
                (3, u16::from_le_bytes([b[0], b[1]]) as usize)
            }
            OP_PUSHDATA4 => {
                let b = bytes.get(pos + 1..pos + 5).ok_or(ScriptError::DataTooSmall(start))?;
                (5, u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
            }
            _ => {
                pos += 1;
                chunks.push(ScriptChunk { op, data: None, span: start..pos });
                continue;
            }
        };
        let data_start = pos + header;
        let data = bytes
            .get(data_start..data_start.saturating_add(len))
            .ok_or(ScriptError::DataTooSmall(start))?;
        pos = data_start + len;
        chunks.push(ScriptChunk { op, data: Some(data.to_vec()), span: start..pos });
    }

    Ok(chunks)
}

/// The minimal push prefix for a payload of `data_len` bytes.
///
/// # Returns
/// The prefix bytes, or `DataTooBig` beyond the OP_PUSHDATA4 range.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= OP_DATA_75 as usize {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xff {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xffff {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xffff_ffff {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}
