use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message too large: {size} > {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Whether the stream is still usable after this error.
    ///
    /// A bad body leaves framing intact; an oversized length or an IO failure
    /// does not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtocolError::Malformed(_) | ProtocolError::UnknownType(_))
    }
}
