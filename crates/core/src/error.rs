use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("network {0:?} is not configured")]
    UnknownNetwork(String),

    #[error("network {0:?} has no chain id configured")]
    UnknownChainId(String),

    #[error(transparent)]
    Config(#[from] treb_config::ConfigError),

    #[error(transparent)]
    Index(#[from] treb_indexer::IndexError),

    #[error(transparent)]
    Param(#[from] treb_params::ParamError),

    #[error(transparent)]
    Sender(#[from] treb_senders::SenderError),

    #[error(transparent)]
    Runner(#[from] treb_runner::RunnerError),

    #[error(transparent)]
    Registry(#[from] treb_registry::RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
