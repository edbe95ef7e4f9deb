use thiserror::Error;

/// Errore di decodifica di un payload arrivato al relay.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("payload is not a valid envelope: {0}")]
    Json(#[from] serde_json::Error),
}
