use thiserror::Error;

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("no ABI registered for {0} and no resolver could supply one")]
    Unresolved(String),

    #[error("failed to decode calldata against {context}: {source}")]
    Decode { context: String, #[source] source: alloy_dyn_abi::Error },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AbiError>;
