use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("namespace {0:?} is not defined in treb.toml")]
    UnknownNamespace(String),

    #[error("account {0:?} referenced by a namespace sender is not defined in [accounts]")]
    UnknownAccount(String),

    #[error("network {0:?} has no [rpc_endpoints] entry")]
    UnknownNetwork(String),

    #[error("failed to load configuration")]
    Figment(#[from] figment::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
