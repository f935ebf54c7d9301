use thiserror::Error;

#[derive(Debug, Error)]
pub enum SenderError {
    #[error("sender {0:?} is not declared in this project's accounts")]
    Dangling(String),

    #[error("cycle detected in sender references: {0}")]
    Cycle(String),

    #[error("invalid private key for sender {name:?}: {source}")]
    InvalidKey { name: String, #[source] source: k256::ecdsa::Error },

    #[error("invalid private key hex for sender {name:?}: {source}")]
    InvalidKeyHex { name: String, #[source] source: treb_common::CommonError },

    #[error("sender {0:?} has type multisig but no `signer` configured")]
    MissingSigner(String),

    #[error("sender {0:?} declares private_key type but no private_key value")]
    MissingPrivateKey(String),
}

pub type Result<T> = std::result::Result<T, SenderError>;
