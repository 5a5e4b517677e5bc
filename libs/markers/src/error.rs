use marker_api::TransportError;

/// Rejection raised by the marker factory. Nothing is buffered.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("marker name missing")]
    EmptyName,

    #[error("payload is a {kind}; markers must use object-like payloads")]
    InvalidPayloadShape { kind: &'static str },

    #[error("payload serialization: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum MarkersError {
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("transport ({}): {source}", .source.kind())]
    Transport {
        #[from]
        source: TransportError,
    },
}
