/// Errors from protocol encoding and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// A pkt-line frame could not be decoded.
    #[error("malformed pkt-line: {0}")]
    BadPktLine(String),

    /// A pkt-line payload exceeds the frame size bound.
    #[error("pkt-line payload too large: {0} bytes")]
    Oversized(usize),

    /// A protocol line does not have the expected shape.
    #[error("malformed {kind} line: {line:?}")]
    BadLine { kind: &'static str, line: String },

    /// The request names a service this server does not speak.
    #[error("unsupported service: {0:?}")]
    UnsupportedService(String),
}

/// Result alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
