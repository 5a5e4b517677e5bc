/// Category of a transport error. Lets the engine decide whether the
/// records are still buffered (config) or the batch is gone (io, format).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid static configuration, raised before any I/O.
    Config,
    /// Network or protocol failure on the outbound call.
    Io,
    /// Envelope could not be encoded or the response could not be decoded.
    Format,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Config => f.write_str("config"),
            ErrorKind::Io => f.write_str("io"),
            ErrorKind::Format => f.write_str("format"),
        }
    }
}

/// Unified error type for `BatchTransport` implementations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("API key is not set, call set_api_key() before making requests")]
    MissingCredential,

    #[error("config: {0}")]
    Config(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request: {0}")]
    Request(String),

    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TransportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::MissingCredential | TransportError::Config(_) => ErrorKind::Config,
            TransportError::Status { .. } | TransportError::Request(_) => ErrorKind::Io,
            TransportError::Encode(_) => ErrorKind::Format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(TransportError::MissingCredential.kind(), ErrorKind::Config);
        assert_eq!(TransportError::Request("reset".into()).kind(), ErrorKind::Io);
        let status = TransportError::Status { status: 503, body: "down".into() };
        assert_eq!(status.kind(), ErrorKind::Io);
        assert_eq!(status.to_string(), "HTTP 503: down");
    }
}
