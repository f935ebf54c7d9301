use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no deployment matches {0:?}")]
    NotFound(String),

    #[error("{query:?} is ambiguous: {candidates} deployments match")]
    Ambiguous { query: String, candidates: usize },
}

pub type Result<T> = std::result::Result<T, ResolveError>;
