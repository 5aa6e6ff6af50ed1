//! Splitting payloads into chunks and reassembling them.

use flo_transaction::MAX_FLO_DATA_LEN;

use crate::chunk::MultipartChunk;
use crate::MultipartError;

/// Most parts a payload may be split into; part indices stay at four
/// digits.
pub const MAX_PARTS: usize = 10_000;

/// Largest payload slice per chunk, so that a fully populated chunk still
/// fits `floData`.
///
/// 1040 minus `oip-mp(`, four commas and `):` (13), a four-digit part and
/// max (8), a 34-character address, a 64-character reference and an
/// 88-character base64 signature.
pub const CHOP_LEN: usize = MAX_FLO_DATA_LEN - 13 - 8 - 34 - 64 - 88;

/// An ordered, complete set of chunks for one payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Splitter {
    chunks: Vec<MultipartChunk>,
}

impl Splitter {
    /// Split `payload` into unsigned chunks for `address`.
    ///
    /// Slices end on character boundaries and hold at most `CHOP_LEN`
    /// bytes.
    ///
    /// # Returns
    /// `NotMultipart` when the payload fits one `floData`, or
    /// `PayloadTooLarge` when it needs more than `MAX_PARTS` chunks.
    pub fn split(payload: &str, address: &str) -> Result<Self, MultipartError> {
        if payload.len() <= MAX_FLO_DATA_LEN {
            return Err(MultipartError::NotMultipart(payload.len()));
        }

        let slices = chop(payload, CHOP_LEN);
        if slices.len() > MAX_PARTS {
            return Err(MultipartError::PayloadTooLarge { parts: slices.len(), max: MAX_PARTS });
        }

        let max = (slices.len() - 1) as u32;
        let chunks = slices
            .into_iter()
            .enumerate()
            .map(|(i, slice)| MultipartChunk::new(i as u32, max, address, slice))
            .collect();
        Ok(Splitter { chunks })
    }

    /// Collect chunks read back from the chain, in any order.
    ///
    /// # Returns
    /// The set sorted by part, or `InvalidChunk` unless the chunks share
    /// one max and address and cover every part exactly once.
    pub fn from_chunks(mut chunks: Vec<MultipartChunk>) -> Result<Self, MultipartError> {
        let first = chunks
            .first()
            .ok_or_else(|| MultipartError::InvalidChunk("no chunks".to_string()))?;
        let max = first.max().ok_or(MultipartError::MissingField("max"))?;
        let address = first.address().to_string();

        if max as usize + 1 != chunks.len() {
            return Err(MultipartError::InvalidChunk(format!(
                "max {} does not match {} chunks",
                max,
                chunks.len()
            )));
        }

        let mut seen = vec![false; chunks.len()];
        for chunk in &chunks {
            if chunk.max() != Some(max) {
                return Err(MultipartError::InvalidChunk("chunks disagree on max".to_string()));
            }
            if chunk.address() != address {
                return Err(MultipartError::InvalidChunk(
                    "chunks disagree on address".to_string(),
                ));
            }
            let part = chunk.part().ok_or(MultipartError::MissingField("part"))? as usize;
            match seen.get_mut(part) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(MultipartError::InvalidChunk(format!("duplicate part {}", part)))
                }
                None => {
                    return Err(MultipartError::InvalidChunk(format!(
                        "part {} exceeds max {}",
                        part, max
                    )))
                }
            }
        }

        chunks.sort_by_key(|c| c.part());
        Ok(Splitter { chunks })
    }

    /// The payload, rebuilt from the chunks in part order.
    pub fn assemble(&self) -> String {
        self.chunks.iter().filter_map(MultipartChunk::payload).collect()
    }

    /// Point every chunk after the first at `txid`.
    pub fn set_reference(&mut self, txid: &str) {
        for chunk in self.chunks.iter_mut().skip(1) {
            chunk.set_reference(txid);
        }
    }

    pub fn chunks(&self) -> &[MultipartChunk] {
        &self.chunks
    }

    pub fn chunks_mut(&mut self) -> &mut [MultipartChunk] {
        &mut self.chunks
    }

    pub fn into_chunks(self) -> Vec<MultipartChunk> {
        self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Split `s` into slices of at most `max_len` bytes without breaking a
/// character.
fn chop(s: &str, max_len: usize) -> Vec<&str> {
    let mut slices = Vec::with_capacity(s.len() / max_len + 1);
    let mut rest = s;
    while !rest.is_empty() {
        let mut end = rest.len().min(max_len);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (head, tail) = rest.split_at(end);
        slices.push(head);
        rest = tail;
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{KeySigner, MessageSigner};
    use flo_primitives::ec::PrivateKey;
    use flo_script::Network;

    const ADDR: &str = "FExampleAddress";

    #[test]
    fn test_chop_len() {
        assert_eq!(CHOP_LEN, 833);
    }

    #[test]
    fn test_split_3000_chars() {
        let payload = "a".repeat(3000);
        let splitter = Splitter::split(&payload, ADDR).unwrap();
        assert_eq!(splitter.len(), 4);
        for (i, chunk) in splitter.chunks().iter().enumerate() {
            assert_eq!(chunk.part(), Some(i as u32));
            assert_eq!(chunk.max(), Some(3));
            assert_eq!(chunk.address(), ADDR);
        }
        assert_eq!(splitter.chunks()[3].payload().map(str::len), Some(3000 - 3 * 833));
        assert_eq!(splitter.assemble(), payload);
    }

    #[test]
    fn test_split_respects_char_boundaries() {
        let payload = "é".repeat(1000);
        let splitter = Splitter::split(&payload, ADDR).unwrap();
        for chunk in splitter.chunks() {
            let len = chunk.payload().map(str::len).unwrap_or(0);
            assert!(len <= CHOP_LEN);
            assert_eq!(len % 2, 0);
        }
        assert_eq!(splitter.assemble(), payload);
    }

    #[test]
    fn test_small_payload_is_not_multipart() {
        let payload = "x".repeat(MAX_FLO_DATA_LEN);
        assert!(matches!(
            Splitter::split(&payload, ADDR),
            Err(MultipartError::NotMultipart(1040))
        ));
        assert!(Splitter::split(&"x".repeat(MAX_FLO_DATA_LEN + 1), ADDR).is_ok());
    }

    #[test]
    fn test_payload_too_large() {
        let payload = "x".repeat(CHOP_LEN * MAX_PARTS + 1);
        assert!(matches!(
            Splitter::split(&payload, ADDR),
            Err(MultipartError::PayloadTooLarge { parts: 10_001, max: MAX_PARTS })
        ));
    }

    #[test]
    fn test_set_reference() {
        let mut splitter = Splitter::split(&"z".repeat(2000), ADDR).unwrap();
        splitter.set_reference("ab".repeat(32).as_str());
        assert_eq!(splitter.chunks()[0].reference(), "");
        for chunk in &splitter.chunks()[1..] {
            assert_eq!(chunk.reference(), "ab".repeat(32));
        }
    }

    #[test]
    fn test_from_chunks_sorts() {
        let splitter = Splitter::split(&"q".repeat(2500), ADDR).unwrap();
        let mut chunks = splitter.clone().into_chunks();
        chunks.reverse();
        let rebuilt = Splitter::from_chunks(chunks).unwrap();
        assert_eq!(rebuilt, splitter);
    }

    #[test]
    fn test_from_chunks_rejects_bad_sets() {
        let chunks = Splitter::split(&"q".repeat(2500), ADDR).unwrap().into_chunks();

        assert!(Splitter::from_chunks(Vec::new()).is_err());
        assert!(Splitter::from_chunks(chunks[..2].to_vec()).is_err());

        let mut dup = chunks.clone();
        dup[2] = dup[1].clone();
        assert!(matches!(Splitter::from_chunks(dup), Err(MultipartError::InvalidChunk(_))));

        let mut other_addr = chunks.clone();
        other_addr[1] = MultipartChunk::new(1, 2, "FOther", "q");
        assert!(matches!(
            Splitter::from_chunks(other_addr),
            Err(MultipartError::InvalidChunk(_))
        ));

        let mut other_max = chunks;
        other_max[2] = MultipartChunk::new(2, 5, ADDR, "q");
        assert!(Splitter::from_chunks(other_max).is_err());
    }

    #[tokio::test]
    async fn test_signed_chunks_fit_flo_data() {
        let signer = KeySigner::new(PrivateKey::from_bytes(&[9u8; 32]).unwrap(), Network::Mainnet);
        let payload = "w".repeat(CHOP_LEN * 3);
        let mut splitter = Splitter::split(&payload, &signer.address()).unwrap();
        splitter.set_reference("cd".repeat(32).as_str());
        for chunk in splitter.chunks_mut() {
            chunk.sign_with(&signer).await.unwrap();
            assert!(chunk.is_valid());
            assert!(chunk.to_string().len() <= MAX_FLO_DATA_LEN);
        }
    }
}
