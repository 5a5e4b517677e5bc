use marker_api::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error("{0}")]
    Config(String),

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
