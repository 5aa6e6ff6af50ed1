//! One part of a multipart payload and its text encoding.

use std::fmt;
use std::str::FromStr;

use flo_script::Address;

use crate::signer::MessageSigner;
use crate::MultipartError;

/// Text that opens every encoded chunk.
pub const MULTIPART_PREFIX: &str = "oip-mp(";

const HEADER_END: &str = "):";
const HEADER_FIELDS: usize = 5;

/// Where a chunk was found on chain. Filled in by readers, never by
/// signing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainMeta {
    pub confirmed: bool,
    pub txid: String,
    pub block_hash: Option<String>,
    pub block_height: Option<u64>,
}

/// A single multipart chunk.
///
/// # Text format
///
/// `oip-mp(part,max,address,reference,signature):payload`
///
/// The reference is always empty for part 0. Everything after the first
/// `):` is payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartChunk {
    part: Option<u32>,
    max: Option<u32>,
    address: String,
    reference: String,
    signature: Option<String>,
    payload: Option<String>,
    chain_meta: Option<ChainMeta>,
}

impl MultipartChunk {
    /// An unsigned chunk with no reference.
    pub fn new(part: u32, max: u32, address: impl Into<String>, payload: impl Into<String>) -> Self {
        MultipartChunk {
            part: Some(part),
            max: Some(max),
            address: address.into(),
            payload: Some(payload.into()),
            ..Default::default()
        }
    }

    pub fn part(&self) -> Option<u32> {
        self.part
    }

    pub fn max(&self) -> Option<u32> {
        self.max
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// The first chunk's txid; always empty for part 0.
    pub fn reference(&self) -> &str {
        if self.part == Some(0) {
            ""
        } else {
            &self.reference
        }
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn chain_meta(&self) -> Option<&ChainMeta> {
        self.chain_meta.as_ref()
    }

    /// Set the reference. Clears any signature, which covered the old one.
    pub fn set_reference(&mut self, reference: impl Into<String>) {
        let reference = reference.into();
        if reference != self.reference {
            self.signature = None;
        }
        self.reference = reference;
    }

    /// Attach where this chunk was found on chain.
    pub fn with_chain_meta(mut self, meta: ChainMeta) -> Self {
        self.chain_meta = Some(meta);
        self
    }

    /// The signed text: `{part}-{max}-{address}-{reference}-{payload}`.
    pub fn preimage(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            opt_to_string(self.part),
            opt_to_string(self.max),
            self.address,
            self.reference(),
            self.payload.as_deref().unwrap_or_default()
        )
    }

    /// Sign the chunk with `signer`, storing the signer's address.
    ///
    /// # Returns
    /// `MissingField` when the part, max, payload or (for later parts)
    /// reference is absent, or the signer's error.
    pub async fn sign_with<S: MessageSigner>(&mut self, signer: &S) -> Result<(), MultipartError> {
        let part = self.part.ok_or(MultipartError::MissingField("part"))?;
        self.max.ok_or(MultipartError::MissingField("max"))?;
        if self.payload.is_none() {
            return Err(MultipartError::MissingField("payload"));
        }
        if part > 0 && self.reference.is_empty() {
            return Err(MultipartError::MissingField("reference"));
        }

        self.address = signer.address();
        let signature = signer.sign_message(self.preimage().as_bytes()).await?;
        self.signature = Some(signature);
        Ok(())
    }

    /// Check the chunk, returning the first rule it breaks.
    pub fn validate(&self) -> Result<(), MultipartError> {
        let part = self.part.ok_or(MultipartError::MissingField("part"))?;
        let max = self.max.ok_or(MultipartError::MissingField("max"))?;
        if part > max {
            return Err(MultipartError::InvalidChunk(format!("part {} exceeds max {}", part, max)));
        }
        if max < 1 {
            return Err(MultipartError::InvalidChunk("max must be at least 1".to_string()));
        }
        if self.address.is_empty() {
            return Err(MultipartError::InvalidChunk("address is empty".to_string()));
        }
        if part > 0 && self.reference.is_empty() {
            return Err(MultipartError::InvalidChunk(format!("part {} has no reference", part)));
        }
        let signature = self.signature.as_deref().ok_or(MultipartError::MissingField("signature"))?;

        let address = Address::from_string(&self.address)
            .map_err(|e| MultipartError::InvalidChunk(format!("bad address: {}", e)))?;
        let verified = flo_message::verify(self.preimage().as_bytes(), signature, &address)
            .map_err(|e| MultipartError::InvalidChunk(format!("bad signature: {}", e)))?;
        if !verified {
            return Err(MultipartError::InvalidChunk(
                "signature does not match address".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl fmt::Display for MultipartChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{},{},{},{},{}{}{}",
            MULTIPART_PREFIX,
            opt_to_string(self.part),
            opt_to_string(self.max),
            self.address,
            self.reference(),
            self.signature.as_deref().unwrap_or_default(),
            HEADER_END,
            self.payload.as_deref().unwrap_or_default()
        )
    }
}

impl FromStr for MultipartChunk {
    type Err = MultipartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(MULTIPART_PREFIX)
            .ok_or_else(|| MultipartError::Parse("missing oip-mp prefix".to_string()))?;
        let (header, payload) = rest
            .split_once(HEADER_END)
            .ok_or_else(|| MultipartError::Parse("unterminated header".to_string()))?;

        let fields: Vec<&str> = header.split(',').collect();
        if fields.len() != HEADER_FIELDS {
            return Err(MultipartError::Parse(format!(
                "header has {} fields, expected {}",
                fields.len(),
                HEADER_FIELDS
            )));
        }

        let part = parse_index(fields[0], "part")?;
        let max = parse_index(fields[1], "max")?;
        let signature = match fields[4] {
            "" => None,
            sig => Some(sig.to_string()),
        };

        Ok(MultipartChunk {
            part: Some(part),
            max: Some(max),
            address: fields[2].to_string(),
            reference: fields[3].to_string(),
            signature,
            payload: Some(payload.to_string()),
            chain_meta: None,
        })
    }
}

fn parse_index(field: &str, name: &str) -> Result<u32, MultipartError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MultipartError::Parse(format!("{} is not a number: {:?}", name, field)));
    }
    field
        .parse()
        .map_err(|_| MultipartError::Parse(format!("{} is out of range: {}", name, field)))
}

fn opt_to_string(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
