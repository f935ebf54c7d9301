use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no such deployment: {0}")]
    NotFound(String),

    #[error("cross-process registry lock at {path} busy after {timeout_secs}s")]
    Busy { path: String, timeout_secs: u64 },

    #[error("changeset rejected: {0}")]
    Inconsistent(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
