use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("missing required parameter {0:?}")]
    MissingParameter(String),

    #[error("invalid value for parameter {name:?}: {reason}")]
    InvalidParameter { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ParamError>;
