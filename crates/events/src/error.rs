use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed runner frame: {0}")]
    MalformedFrame(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EventError>;
