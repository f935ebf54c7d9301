use thiserror::Error;

/// Errors shared by more than one crate in the workspace.
///
/// Crate-local operations get their own `thiserror` enum (see
/// `treb-registry::Error`, `treb-runner::Error`, ...); this type exists for the
/// handful of failure modes — I/O, hashing/encoding, and lookup failures — that
/// show up identically in several of them.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("ambiguous reference {query:?}: {candidate_count} candidates")]
    Ambiguous { query: String, candidate_count: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid hex in {field}: {source}")]
    InvalidHex { field: &'static str, #[source] source: hex::FromHexError },
}

pub type Result<T> = std::result::Result<T, CommonError>;
