use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("compile failed for project at {root}: {source}")]
    Build { root: PathBuf, #[source] source: eyre::Report },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("no contract named {0:?} in this project")]
    NotFound(String),

    #[error("{name:?} is ambiguous: {candidates} contracts share that name")]
    Ambiguous { name: String, candidates: usize },
}

pub type Result<T> = std::result::Result<T, IndexError>;
