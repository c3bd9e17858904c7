#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Malformed jobs payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Unexpected jobs payload: {0}")]
    UnexpectedPayload(String),
}
