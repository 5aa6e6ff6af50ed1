/// Error types for multipart operations.
#[derive(Debug, thiserror::Error)]
pub enum MultipartError {
    /// A field needed for signing or encoding is absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),
    /// The chunk, or a set of chunks, breaks a structural rule.
    #[error("invalid chunk: {0}")]
    InvalidChunk(String),
    /// The text is not a multipart chunk.
    #[error("parse error: {0}")]
    Parse(String),
    /// The payload needs more chunks than the protocol can number.
    #[error("payload needs {parts} parts, maximum is {max}")]
    PayloadTooLarge { parts: usize, max: usize },
    /// The payload fits a single transaction and must not be split.
    #[error("payload of {0} bytes fits one transaction")]
    NotMultipart(usize),
    /// The message signer failed.
    #[error("signing error: {0}")]
    Signing(String),
}
